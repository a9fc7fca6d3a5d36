//! The `$filter` boolean/arithmetic common-expression grammar, precedence
//! climbing from `or` (loosest) down to primaries (tightest):
//!
//! ```text
//! or  -> and (ws "or" ws and)*
//! and -> not (ws "and" ws not)*
//! not -> "not" ws not | compare
//! compare -> additive (ws (eq|ne|lt|le|gt|ge|has|in) ws rhs)?
//! additive -> mul (ws (add|sub) ws mul)*
//! mul -> unary (ws (mul|div|mod) ws unary)*
//! unary -> "-" unary | primary
//! primary -> paren | any | all | methodCall | path | literal
//! ```

use super::Parser;
use crate::ast::{ArithOp, CompareOp, Expr, LambdaPredicate, PathSegment, Spanned};
use crate::error::{ParseError, ParseResult};
use crate::lexer::{self, literals};
use crate::source::{Source, Span};

type ExprResult = ParseResult<(Spanned<Expr>, usize)>;

/// Whitelisted `$filter` method names (spec.md §4.3's closed function set).
/// `crate::functions` is the authority for dialect remapping; this list
/// only gates what is even legal to *parse* as a call.
const KNOWN_FUNCTIONS: &[&str] = &[
    "contains",
    "startswith",
    "endswith",
    "length",
    "indexof",
    "substring",
    "tolower",
    "toupper",
    "trim",
    "concat",
    "round",
    "floor",
    "ceiling",
    "year",
    "month",
    "day",
    "hour",
    "minute",
    "second",
    "fractionalseconds",
    "date",
    "time",
    "now",
    "geo.distance",
    "geo.intersects",
    "geo.length",
];

fn keyword(src: &Source<'_>, pos: usize, kw: &str) -> Option<usize> {
    let end = lexer::consume_str(src, pos, kw)?;
    match src.peek(end) {
        Some(c) if c.is_ascii_alphanumeric() || c == '_' => None,
        _ => Some(end),
    }
}

pub fn parse_or(p: &mut Parser<'_>, pos: usize) -> ExprResult {
    let (mut left, mut end) = parse_and(p, pos)?;
    loop {
        let after_ws = p.ws(end);
        let Some(op_end) = keyword(&p.src, after_ws, "or") else {
            break;
        };
        let rhs_start = p.ws(op_end);
        let (right, rhs_end) = p.guarded(|p| parse_and(p, rhs_start))?;
        let span = Span::new(pos, rhs_end);
        left = Spanned::new(Expr::Or(Box::new(left), Box::new(right)), span);
        end = rhs_end;
    }
    Ok((left, end))
}

fn parse_and(p: &mut Parser<'_>, pos: usize) -> ExprResult {
    let (mut left, mut end) = parse_not(p, pos)?;
    loop {
        let after_ws = p.ws(end);
        let Some(op_end) = keyword(&p.src, after_ws, "and") else {
            break;
        };
        let rhs_start = p.ws(op_end);
        let (right, rhs_end) = p.guarded(|p| parse_not(p, rhs_start))?;
        let span = Span::new(pos, rhs_end);
        left = Spanned::new(Expr::And(Box::new(left), Box::new(right)), span);
        end = rhs_end;
    }
    Ok((left, end))
}

fn parse_not(p: &mut Parser<'_>, pos: usize) -> ExprResult {
    if let Some(after) = keyword(&p.src, pos, "not") {
        let start = p.ws(after);
        let (inner, end) = p.guarded(|p| parse_not(p, start))?;
        return Ok((Spanned::new(Expr::Not(Box::new(inner)), Span::new(pos, end)), end));
    }
    parse_compare(p, pos)
}

fn parse_compare(p: &mut Parser<'_>, pos: usize) -> ExprResult {
    let (left, mut end) = parse_additive(p, pos)?;
    let after_ws = p.ws(end);

    let compare_ops: &[(&str, CompareOp)] = &[
        ("eq", CompareOp::Eq),
        ("ne", CompareOp::Ne),
        ("ge", CompareOp::Ge),
        ("gt", CompareOp::Gt),
        ("le", CompareOp::Le),
        ("lt", CompareOp::Lt),
    ];
    for (kw, op) in compare_ops {
        if let Some(op_end) = keyword(&p.src, after_ws, kw) {
            let rhs_start = p.ws(op_end);
            let (right, rhs_end) = p.guarded(|p| parse_additive(p, rhs_start))?;
            end = rhs_end;
            return Ok((
                Spanned::new(Expr::Compare(*op, Box::new(left), Box::new(right)), Span::new(pos, end)),
                end,
            ));
        }
    }
    if let Some(op_end) = keyword(&p.src, after_ws, "has") {
        let rhs_start = p.ws(op_end);
        let (right, rhs_end) = p.guarded(|p| parse_additive(p, rhs_start))?;
        end = rhs_end;
        return Ok((
            Spanned::new(Expr::Has(Box::new(left), Box::new(right)), Span::new(pos, end)),
            end,
        ));
    }
    if let Some(op_end) = keyword(&p.src, after_ws, "in") {
        let list_start = p.ws(op_end);
        let (items, list_end) = p.guarded(|p| parse_paren_list(p, list_start))?;
        end = list_end;
        return Ok((
            Spanned::new(Expr::In(Box::new(left), items), Span::new(pos, end)),
            end,
        ));
    }
    Ok((left, end))
}

fn parse_paren_list(p: &mut Parser<'_>, pos: usize) -> ParseResult<(Vec<Spanned<Expr>>, usize)> {
    let mut i = lexer::consume_str(&p.src, pos, "(").ok_or_else(|| ParseError::new("expected '(' after 'in'").at(pos))?;
    let mut items = Vec::new();
    i = p.ws(i);
    if lexer::consume_str(&p.src, i, ")").is_some() {
        return Ok((items, i + 1));
    }
    loop {
        let (item, after) = p.guarded(|p| parse_additive(p, i))?;
        items.push(item);
        i = p.ws(after);
        if let Some(after_comma) = lexer::consume_str(&p.src, i, ",") {
            i = p.ws(after_comma);
        } else {
            break;
        }
    }
    let end = lexer::consume_str(&p.src, i, ")").ok_or_else(|| ParseError::new("expected ')' closing 'in' list").at(i))?;
    Ok((items, end))
}

fn parse_additive(p: &mut Parser<'_>, pos: usize) -> ExprResult {
    let (mut left, mut end) = parse_mul(p, pos)?;
    loop {
        let after_ws = p.ws(end);
        let op = if let Some(e) = keyword(&p.src, after_ws, "add") {
            Some((ArithOp::Add, e))
        } else if let Some(e) = keyword(&p.src, after_ws, "sub") {
            Some((ArithOp::Sub, e))
        } else {
            None
        };
        let Some((op, op_end)) = op else { break };
        let rhs_start = p.ws(op_end);
        let (right, rhs_end) = p.guarded(|p| parse_mul(p, rhs_start))?;
        left = Spanned::new(Expr::Arith(op, Box::new(left), Box::new(right)), Span::new(pos, rhs_end));
        end = rhs_end;
    }
    Ok((left, end))
}

fn parse_mul(p: &mut Parser<'_>, pos: usize) -> ExprResult {
    let (mut left, mut end) = parse_unary(p, pos)?;
    loop {
        let after_ws = p.ws(end);
        let op = if let Some(e) = keyword(&p.src, after_ws, "mul") {
            Some((ArithOp::Mul, e))
        } else if let Some(e) = keyword(&p.src, after_ws, "div") {
            Some((ArithOp::Div, e))
        } else if let Some(e) = keyword(&p.src, after_ws, "mod") {
            Some((ArithOp::Mod, e))
        } else {
            None
        };
        let Some((op, op_end)) = op else { break };
        let rhs_start = p.ws(op_end);
        let (right, rhs_end) = p.guarded(|p| parse_unary(p, rhs_start))?;
        left = Spanned::new(Expr::Arith(op, Box::new(left), Box::new(right)), Span::new(pos, rhs_end));
        end = rhs_end;
    }
    Ok((left, end))
}

fn parse_unary(p: &mut Parser<'_>, pos: usize) -> ExprResult {
    if let Some(after) = lexer::consume_str(&p.src, pos, "-") {
        if p.src.peek(after).is_some_and(|c| c.is_ascii_digit()) {
            // a leading "-123" is lexed whole as a signed numeric literal,
            // not a NegateExpression wrapping a positive one.
            return parse_primary(p, pos);
        }
        let (inner, end) = p.guarded(|p| parse_unary(p, after))?;
        return Ok((Spanned::new(Expr::Negate(Box::new(inner)), Span::new(pos, end)), end));
    }
    parse_primary(p, pos)
}

fn parse_primary(p: &mut Parser<'_>, pos: usize) -> ExprResult {
    if let Some(after) = lexer::consume_str(&p.src, pos, "(") {
        let start = p.ws(after);
        let (inner, inner_end) = p.guarded(|p| parse_or(p, start))?;
        let close = p.ws(inner_end);
        let end = lexer::consume_str(&p.src, close, ")")
            .ok_or_else(|| ParseError::new("expected ')' to close expression").at(close))?;
        return Ok((Spanned::new(Expr::Paren(Box::new(inner)), Span::new(pos, end)), end));
    }

    if let Some(end) = keyword(&p.src, pos, "$it") {
        return Ok((Spanned::new(Expr::ImplicitVariable, Span::new(pos, end)), end));
    }

    if let Some((lit, end)) = literals::try_boolean(&p.src, pos) {
        return Ok((Spanned::new(Expr::Literal(lit), Span::new(pos, end)), end));
    }
    if let Some(end) = literals::try_null(&p.src, pos) {
        return Ok((Spanned::new(Expr::Literal(crate::ast::Literal::Null), Span::new(pos, end)), end));
    }
    if let Some((lit, end)) = literals::try_string(&p.src, pos)? {
        return Ok((Spanned::new(Expr::Literal(lit), Span::new(pos, end)), end));
    }
    if let Some((lit, end)) = literals::try_geography(&p.src, pos)? {
        return Ok((Spanned::new(Expr::Literal(lit), Span::new(pos, end)), end));
    }
    if let Some((lit, end)) = literals::try_date_time_offset(&p.src, pos)? {
        return Ok((Spanned::new(Expr::Literal(lit), Span::new(pos, end)), end));
    }
    if let Some((lit, end)) = literals::try_date(&p.src, pos)? {
        return Ok((Spanned::new(Expr::Literal(lit), Span::new(pos, end)), end));
    }
    if let Some((lit, end)) = literals::try_time_of_day(&p.src, pos)? {
        return Ok((Spanned::new(Expr::Literal(lit), Span::new(pos, end)), end));
    }
    if let Some((lit, end)) = literals::try_duration(&p.src, pos)? {
        return Ok((Spanned::new(Expr::Literal(lit), Span::new(pos, end)), end));
    }
    if let Some((lit, end)) = literals::try_guid(&p.src, pos)? {
        return Ok((Spanned::new(Expr::Literal(lit), Span::new(pos, end)), end));
    }
    if let Some((lit, end)) = literals::try_number(&p.src, pos)? {
        return Ok((Spanned::new(Expr::Literal(lit), Span::new(pos, end)), end));
    }

    if let Some((name, after_name)) = qualified_name(&p.src, pos) {
        if lexer::consume_str(&p.src, after_name, "(").is_some() {
            return parse_call_or_lambda(p, pos, &name, after_name);
        }
        return parse_member_path(p, pos, &name, after_name);
    }

    Err(ParseError::new("expected an expression").at(pos))
}

/// `ident(.ident)*` — plain property names, plus the dotted names used by
/// `geo.*` functions and `Edm.*` type names in `cast`/`isof`.
fn qualified_name(src: &Source<'_>, pos: usize) -> Option<(String, usize)> {
    let (first, mut end) = lexer::identifier(src, pos)?;
    let mut name = first.to_string();
    while let Some(after_dot) = lexer::consume_str(src, end, ".") {
        let Some((seg, after_seg)) = lexer::identifier(src, after_dot) else {
            break;
        };
        name.push('.');
        name.push_str(seg);
        end = after_seg;
    }
    Some((name, end))
}

fn parse_call_or_lambda(p: &mut Parser<'_>, pos: usize, name: &str, after_name: usize) -> ExprResult {
    let open = lexer::consume_str(&p.src, after_name, "(").unwrap();
    if name == "any" || name == "all" {
        let (pred, end) = parse_lambda_body(p, open)?;
        if name == "all" && pred.is_none() {
            return Err(ParseError::new("'all' requires a lambda predicate").at(pos));
        }
        let node = if name == "any" {
            Expr::Any(Vec::new(), pred)
        } else {
            Expr::All(Vec::new(), pred.unwrap())
        };
        return Ok((Spanned::new(node, Span::new(pos, end)), end));
    }
    if !KNOWN_FUNCTIONS.contains(&name) {
        return Err(ParseError::unknown_function(name).at(pos));
    }
    let mut i = p.ws(open);
    let mut args = Vec::new();
    if lexer::consume_str(&p.src, i, ")").is_none() {
        loop {
            let (arg, after) = p.guarded(|p| parse_or(p, i))?;
            args.push(arg);
            i = p.ws(after);
            if let Some(after_comma) = lexer::consume_str(&p.src, i, ",") {
                i = p.ws(after_comma);
            } else {
                break;
            }
        }
    }
    let end = lexer::consume_str(&p.src, i, ")")
        .ok_or_else(|| ParseError::new(format!("expected ')' closing call to {name}")).at(i))?;
    Ok((
        Spanned::new(Expr::MethodCall(name.to_string(), args), Span::new(pos, end)),
        end,
    ))
}

/// Parses the `(var : predicate)` or `()` body of a lambda call, given the
/// position of the opening `(`. Returns `None` only for the empty-predicate
/// `any()` form.
fn parse_lambda_body(p: &mut Parser<'_>, open: usize) -> ParseResult<(Option<LambdaPredicate>, usize)> {
    let mut i = p.ws(open);
    if let Some(close) = lexer::consume_str(&p.src, i, ")") {
        return Ok((None, close));
    }
    let (var, after_var) = lexer::identifier(&p.src, i)
        .ok_or_else(|| ParseError::new("expected lambda variable name").at(i))?;
    i = p.ws(after_var);
    i = lexer::consume_str(&p.src, i, ":")
        .ok_or_else(|| ParseError::new("expected ':' after lambda variable").at(i))?;
    i = p.ws(i);
    let (predicate, after_pred) = p.guarded(|p| parse_or(p, i))?;
    i = p.ws(after_pred);
    let end = lexer::consume_str(&p.src, i, ")").ok_or_else(|| ParseError::new("expected ')' closing lambda").at(i))?;
    Ok((
        Some(LambdaPredicate {
            variable: var.to_string(),
            predicate: Box::new(predicate),
        }),
        end,
    ))
}

/// `FirstMemberExpression` — a chain of `ODataIdentifier`/navigation hops,
/// the `cast(...)`/`isof(...)` pseudo-calls which take a path, and
/// `collection/any(...)`/`collection/all(...)` (`CollectionPathExpression`).
fn parse_member_path(p: &mut Parser<'_>, pos: usize, first: &str, after_first: usize) -> ExprResult {
    if (first == "cast" || first == "isof") && p.src.peek(after_first) == Some('(') {
        return parse_cast_or_isof(p, pos, first, after_first);
    }

    let mut segments = vec![PathSegment::Identifier(first.to_string())];
    let mut end = after_first;
    loop {
        let Some(after_slash) = lexer::consume_str(&p.src, end, "/") else {
            break;
        };
        let (seg, after_seg) = lexer::identifier(&p.src, after_slash)
            .ok_or_else(|| ParseError::new("expected identifier after '/'").at(after_slash))?;
        if (seg == "any" || seg == "all") && p.src.peek(after_seg) == Some('(') {
            let open = lexer::consume_str(&p.src, after_seg, "(").unwrap();
            let (pred, lambda_end) = parse_lambda_body(p, open)?;
            if seg == "all" && pred.is_none() {
                return Err(ParseError::new("'all' requires a lambda predicate").at(after_slash));
            }
            let node = if seg == "any" {
                Expr::Any(segments, pred)
            } else {
                Expr::All(segments, pred.unwrap())
            };
            return Ok((Spanned::new(node, Span::new(pos, lambda_end)), lambda_end));
        }
        segments.push(PathSegment::Navigation(seg.to_string()));
        end = after_seg;
    }
    Ok((Spanned::new(Expr::Path(segments), Span::new(pos, end)), end))
}

fn parse_cast_or_isof(p: &mut Parser<'_>, pos: usize, name: &str, after_name: usize) -> ExprResult {
    let open = lexer::consume_str(&p.src, after_name, "(").unwrap();
    let mut i = p.ws(open);
    let (first_arg, after_first) = p.guarded(|p| parse_or(p, i))?;
    i = p.ws(after_first);
    let (expr, type_name, end) = if let Some(after_comma) = lexer::consume_str(&p.src, i, ",") {
        let type_start = p.ws(after_comma);
        let (type_name, after_type) = qualified_name(&p.src, type_start)
            .ok_or_else(|| ParseError::new("expected type name").at(type_start))?;
        let close = p.ws(after_type);
        let end = lexer::consume_str(&p.src, close, ")")
            .ok_or_else(|| ParseError::new(format!("expected ')' closing {name}(...)")).at(close))?;
        (first_arg, type_name, end)
    } else {
        // single-argument form: the type name is the "expression".
        let type_name = match &first_arg.node {
            Expr::Path(segs) => match segs.last() {
                Some(PathSegment::Identifier(s)) | Some(PathSegment::Navigation(s)) => s.clone(),
                None => return Err(ParseError::new("expected a type name").at(i)),
            },
            _ => return Err(ParseError::new("expected a type name").at(i)),
        };
        let end = lexer::consume_str(&p.src, i, ")")
            .ok_or_else(|| ParseError::new(format!("expected ')' closing {name}(...)")).at(i))?;
        (Spanned::new(Expr::ImplicitVariable, Span::new(pos, i)), type_name, end)
    };
    let node = if name == "cast" {
        Expr::Cast(Box::new(expr), type_name)
    } else {
        Expr::IsOf(Box::new(expr), type_name)
    };
    Ok((Spanned::new(node, Span::new(pos, end)), end))
}
