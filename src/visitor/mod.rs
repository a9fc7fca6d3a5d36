//! C6 — walks the parsed `$filter` AST and lowers it to a SQL fragment,
//! allocating parameters as it goes. Dispatch is an exhaustive `match` over
//! [`Expr`] variants (never a dynamic "visit" + type-name lookup), and every
//! recursive call shares one [`ParamAllocator`] so parameter names are
//! globally unique and monotonic regardless of which branch of the tree
//! allocated them (invariant I2).

pub mod context;

use crate::ast::{ArithOp, CompareOp, Expr, Literal, PathSegment, Spanned};
use crate::dialect::SqlDialect;
use crate::error::ParseResult;
use crate::limits::Limits;
use crate::value::ParamValue;
use context::{Context, ParamAllocator};

pub struct Visitor<'d> {
    pub dialect: &'d dyn SqlDialect,
    pub limits: Limits,
    pub alloc: ParamAllocator,
    /// When false, literals are inlined as escaped SQL text instead of
    /// being parameterized. Exists only for uniform testing against known
    /// input, never for untrusted input (spec.md §4.2).
    pub use_parameters: bool,
}

impl<'d> Visitor<'d> {
    #[must_use]
    pub fn new(dialect: &'d dyn SqlDialect, limits: Limits) -> Self {
        Self {
            dialect,
            limits,
            alloc: ParamAllocator::new(),
            use_parameters: true,
        }
    }

    #[must_use]
    pub fn with_allocator(dialect: &'d dyn SqlDialect, limits: Limits, alloc: ParamAllocator) -> Self {
        Self {
            dialect,
            limits,
            alloc,
            use_parameters: true,
        }
    }

    #[must_use]
    pub fn with_parameters_disabled(mut self) -> Self {
        self.use_parameters = false;
        self
    }

    /// Forks a child visitor for an `$expand` include: same dialect/limits,
    /// sharing the parameter-name sequence with this visitor.
    #[must_use]
    pub fn fork(&self) -> Self {
        Self {
            dialect: self.dialect,
            limits: self.limits,
            alloc: self.alloc.clone(),
            use_parameters: self.use_parameters,
        }
    }

    pub fn render(&self, ctx: &Context, expr: &Spanned<Expr>) -> ParseResult<String> {
        match &expr.node {
            Expr::And(l, r) => self.render_binary_logical(ctx, l, r, self.dialect.and_keyword()),
            Expr::Or(l, r) => self.render_binary_logical(ctx, l, r, self.dialect.or_keyword()),
            Expr::Not(inner) => {
                let inner_sql = self.render(ctx, inner)?;
                Ok(self.dialect.render_not(&inner_sql))
            }
            Expr::Compare(op, l, r) => self.render_compare(ctx, *op, l, r),
            Expr::Arith(op, l, r) => {
                let l_sql = self.render(ctx, l)?;
                let r_sql = self.render(ctx, r)?;
                Ok(format!("({l_sql} {} {r_sql})", arith_op_sql(*op)))
            }
            Expr::Negate(inner) => {
                let inner_sql = self.render(ctx, inner)?;
                Ok(format!("(-{inner_sql})"))
            }
            Expr::In(l, items) => {
                let l_sql = self.render(ctx, l)?;
                let mut rendered = Vec::with_capacity(items.len());
                for item in items {
                    if let Expr::Literal(Literal::String(s)) = &item.node {
                        let name = self.alloc.alloc("literal", ParamValue::String(s.clone()));
                        rendered.push((self.dialect.string_literal_token(&name), Some(name)));
                    } else {
                        rendered.push((self.render(ctx, item)?, None));
                    }
                }
                let (open, close) = self.dialect.in_list_brackets();
                let list = self.dialect.render_in_list(&rendered);
                Ok(format!("{l_sql} IN {open}{list}{close}"))
            }
            Expr::Has(l, r) => {
                let l_sql = self.render(ctx, l)?;
                let r_sql = self.render(ctx, r)?;
                Ok(format!("(({l_sql} & {r_sql}) = {r_sql})"))
            }
            Expr::Cast(inner, type_name) => {
                let inner_sql = self.render(ctx, inner)?;
                Ok(format!("CAST({inner_sql} AS {})", edm_to_sql_type(type_name)))
            }
            Expr::IsOf(inner, type_name) => {
                let inner_sql = self.render(ctx, inner)?;
                Ok(format!(
                    "(TRY_CAST({inner_sql} AS {}) IS NOT NULL)",
                    edm_to_sql_type(type_name)
                ))
            }
            Expr::MethodCall(name, args) => {
                let mut rendered = Vec::with_capacity(args.len());
                for arg in args {
                    rendered.push(self.render(ctx, arg)?);
                }
                Ok(self.dialect.render_function(name, &rendered))
            }
            Expr::Path(segments) => {
                let field_name = self.resolve_path(ctx, segments);
                Ok(self.render_identifier_ref(field_name))
            }
            Expr::Any(collection, predicate) => self.render_any(ctx, collection, predicate.as_ref()),
            Expr::All(collection, predicate) => self.render_all(ctx, collection, predicate),
            Expr::ImplicitVariable => Ok(ctx.target.clone()),
            Expr::Literal(lit) => {
                let value = crate::literal::to_param_value(lit)?;
                if self.use_parameters {
                    let name = self.alloc.alloc("literal", value);
                    Ok(self.dialect.param_token(&name))
                } else {
                    Ok(crate::literal::to_sql_literal(&value))
                }
            }
            Expr::Paren(inner) => {
                let inner_sql = self.render(ctx, inner)?;
                Ok(format!("({inner_sql})"))
            }
        }
    }

    fn render_binary_logical(&self, ctx: &Context, l: &Spanned<Expr>, r: &Spanned<Expr>, op: &str) -> ParseResult<String> {
        let l_sql = self.render(&ctx.fork_sibling(), l)?;
        let r_sql = self.render(&ctx.fork_sibling(), r)?;
        Ok(self.dialect.wrap_logical(format!("{l_sql} {op} {r_sql}")))
    }

    /// Equality/inequality against a bare string literal gets special
    /// per-dialect handling (SurrealDB's record-id-vs-string disjunction);
    /// `eq`/`ne` against a bare `null` literal rewrites to `IS [NOT] NULL`
    /// rather than allocating a parameter for a value that isn't one; every
    /// other comparison shape renders generically.
    fn render_compare(&self, ctx: &Context, op: CompareOp, l: &Spanned<Expr>, r: &Spanned<Expr>) -> ParseResult<String> {
        let l_sql = self.render(ctx, l)?;
        if let Expr::Literal(Literal::Null) = &r.node {
            return match op {
                CompareOp::Eq => Ok(format!("{l_sql} IS NULL")),
                CompareOp::Ne => Ok(format!("{l_sql} IS NOT NULL")),
                _ => {
                    let r_sql = self.render(ctx, r)?;
                    Ok(self.dialect.render_compare(op, &l_sql, &r_sql, None))
                }
            };
        }
        if let Expr::Literal(Literal::String(s)) = &r.node {
            if !self.use_parameters {
                let rendered = crate::literal::to_sql_literal(&ParamValue::String(s.clone()));
                return Ok(self.dialect.render_compare(op, &l_sql, &rendered, None));
            }
            let name = self.alloc.alloc("literal", ParamValue::String(s.clone()));
            let rendered = self.dialect.string_literal_token(&name);
            return Ok(self.dialect.render_compare(op, &l_sql, &rendered, Some(&name)));
        }
        let r_sql = self.render(ctx, r)?;
        Ok(self.dialect.render_compare(op, &l_sql, &r_sql, None))
    }

    /// Resolves a property path against the current lambda scope: a leading
    /// segment equal to the bound lambda variable is dropped (it refers to
    /// the current element, not a further navigation hop); an empty result
    /// means "the element itself".
    fn resolve_path(&self, ctx: &Context, segments: &[PathSegment]) -> String {
        let mut parts: Vec<&str> = segments
            .iter()
            .map(|seg| match seg {
                PathSegment::Identifier(n) | PathSegment::Navigation(n) => n.as_str(),
            })
            .collect();
        if let Some(var) = &ctx.last_identifier {
            if parts.first() == Some(&var.as_str()) {
                parts.remove(0);
            }
        }
        if parts.is_empty() {
            ctx.target.clone()
        } else {
            parts.join(".")
        }
    }

    fn render_any(&self, ctx: &Context, collection: &[PathSegment], predicate: Option<&crate::ast::LambdaPredicate>) -> ParseResult<String> {
        let collection_ref = self.collection_ref(ctx, collection);
        match predicate {
            None => Ok(format!("EXISTS (SELECT 1 FROM UNNEST({collection_ref}))")),
            Some(pred) => {
                let inner_ctx = ctx.fork_lambda(pred.variable.clone());
                let pred_sql = self.render(&inner_ctx, &pred.predicate)?;
                Ok(format!(
                    "EXISTS (SELECT 1 FROM UNNEST({collection_ref}) AS {} WHERE {pred_sql})",
                    sanitize_alias(&pred.variable)
                ))
            }
        }
    }

    fn render_all(&self, ctx: &Context, collection: &[PathSegment], predicate: &crate::ast::LambdaPredicate) -> ParseResult<String> {
        let collection_ref = self.collection_ref(ctx, collection);
        let inner_ctx = ctx.fork_lambda(predicate.variable.clone());
        let pred_sql = self.render(&inner_ctx, &predicate.predicate)?;
        Ok(format!(
            "NOT EXISTS (SELECT 1 FROM UNNEST({collection_ref}) AS {} WHERE NOT ({pred_sql}))",
            sanitize_alias(&predicate.variable)
        ))
    }

    fn collection_ref(&self, ctx: &Context, collection: &[PathSegment]) -> String {
        if collection.is_empty() {
            return ctx.target.clone();
        }
        let field_name = self.resolve_path(ctx, collection);
        self.render_identifier_ref(field_name)
    }

    /// Renders a resolved dotted property path as an identifier reference:
    /// parameterized via `type::field($fieldN)` for SurrealDB (the one
    /// dialect where invariant I1's "every identifier is a parameter" rule
    /// applies), or quoted directly per dot segment for the ANSI-family
    /// dialects, whose drivers have no way to bind a column name through a
    /// value placeholder. Shared with `crate::render`'s `$select`/`$orderby`/
    /// `$groupby` clause builders so every identifier surface follows the
    /// same rule.
    pub(crate) fn render_identifier_ref(&self, field_name: String) -> String {
        self.render_identifier_ref_with_prefix(field_name, "field")
    }

    /// As [`Self::render_identifier_ref`], but lets the caller pick the
    /// allocated parameter's name prefix (SurrealDB's `$select1` vs
    /// `$field1`) when the dialect parameterizes identifiers at all.
    pub(crate) fn render_identifier_ref_with_prefix(&self, field_name: String, prefix: &str) -> String {
        if self.dialect.identifiers_are_parameterized() {
            let name = self.alloc.alloc(prefix, ParamValue::FieldName(field_name));
            self.dialect.field_param_token(&name)
        } else {
            field_name.split('.').map(|seg| self.dialect.quote_identifier(seg)).collect::<Vec<_>>().join(".")
        }
    }
}

/// Lambda-variable aliases become raw SQL correlation names, never a
/// parameter — SQL has no syntax for a parameterized alias. The lexer's
/// `identifier` production already restricts these to `[A-Za-z_][A-Za-z0-9_]*`,
/// so no further escaping is needed.
fn sanitize_alias(name: &str) -> &str {
    name
}

fn arith_op_sql(op: ArithOp) -> &'static str {
    match op {
        ArithOp::Add => "+",
        ArithOp::Sub => "-",
        ArithOp::Mul => "*",
        ArithOp::Div => "/",
        ArithOp::Mod => "%",
    }
}

/// Maps an EDM type name (`Edm.String`, `Edm.Int32`, ...) to its SQL cast
/// target. Unrecognized/custom type names pass through unchanged so
/// `cast`/`isof` against entity types still render (even though this
/// compiler has no entity-model to validate them against).
fn edm_to_sql_type(edm_type: &str) -> &str {
    match edm_type {
        "Edm.String" => "VARCHAR",
        "Edm.Int32" => "INTEGER",
        "Edm.Int64" => "BIGINT",
        "Edm.Double" => "DOUBLE PRECISION",
        "Edm.Single" => "REAL",
        "Edm.Decimal" => "DECIMAL",
        "Edm.Boolean" => "BOOLEAN",
        "Edm.Guid" => "UUID",
        "Edm.Date" => "DATE",
        "Edm.DateTimeOffset" => "TIMESTAMP WITH TIME ZONE",
        "Edm.TimeOfDay" => "TIME",
        other => other,
    }
}
