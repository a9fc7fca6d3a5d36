//! Top-level `$`-prefixed query option parsing (spec.md §4.1 URL
//! conventions) and the nested `$expand(...)` sub-grammar.
//!
//! Like `resource_path.rs`, every production here is a byte-offset
//! recognizer: `fn(&Source, pos) -> ParseResult<(T, usize)>`, advancing
//! past the piece it recognized rather than splitting the whole input up
//! front. `scan_top_level` is the one shared primitive: it walks forward
//! tracking `(`/`)` nesting so a comma or `=` inside `Items($filter=a(b,c))`
//! is never mistaken for one of the outer grammar's own separators.

use super::Parser;
use crate::ast::{ExpandItem, ExpandOptions, OrderByItem, QueryOptions, SelectItem};
use crate::error::{ParseError, ParseResult};
use crate::lexer;
use crate::source::{Source, Span};

/// Advances to the byte offset of the first occurrence of a character in
/// `stops` that sits at paren-nesting depth 0, within `src[pos..limit]`.
/// Returns `limit` if none is found. `(` deepens the nesting and `)`
/// shallows it *after* the stop check, so a stop character immediately at
/// an unopened `(` still counts as a boundary — this lets callers use `(`
/// itself as a stop to mark "path ends, options begin".
fn scan_top_level(src: &Source<'_>, pos: usize, limit: usize, stops: &[char]) -> usize {
    let mut depth = 0i32;
    let mut i = pos;
    for c in src.slice(Span::new(pos, limit)).chars() {
        if depth == 0 && stops.contains(&c) {
            return i;
        }
        match c {
            '(' => depth += 1,
            ')' => depth -= 1,
            _ => {}
        }
        i += c.len_utf8();
    }
    i
}

/// Splits `src[pos..end]` at the first top-level `=`, trimming both sides.
fn scan_key_value<'a>(src: &Source<'a>, pos: usize, end: usize, on_missing_eq: impl FnOnce() -> ParseError) -> ParseResult<(&'a str, &'a str)> {
    let eq_pos = scan_top_level(src, pos, end, &['=']);
    if eq_pos == end {
        return Err(on_missing_eq());
    }
    Ok((src.slice(Span::new(pos, eq_pos)).trim(), src.slice(Span::new(eq_pos + 1, end)).trim()))
}

fn parse_path(segment: &str) -> ParseResult<Vec<String>> {
    let segment = segment.trim();
    if segment.is_empty() {
        return Err(ParseError::new("empty property path"));
    }
    Ok(segment.split('/').map(str::to_string).collect())
}

/// Parses one comma-delimited list, applying `item` to each top-level
/// member's trimmed text. Empty members (consecutive commas) are skipped.
fn parse_comma_list<T>(src: &Source<'_>, pos: usize, mut item: impl FnMut(&str) -> ParseResult<T>) -> ParseResult<Vec<T>> {
    let mut out = Vec::new();
    let mut i = pos;
    if i == src.len() {
        return Ok(out);
    }
    loop {
        let end = scan_top_level(src, i, src.len(), &[',']);
        let member = src.slice(Span::new(i, end)).trim();
        if !member.is_empty() {
            out.push(item(member)?);
        }
        i = end;
        match lexer::consume_str(src, i, ",") {
            Some(after_comma) => i = after_comma,
            None => break,
        }
    }
    Ok(out)
}

fn parse_select_list(value: &str) -> ParseResult<Vec<SelectItem>> {
    let src = Source::new(value);
    parse_comma_list(&src, 0, |s| {
        if s == "*" {
            Ok(SelectItem::Star)
        } else {
            parse_path(s).map(SelectItem::Path)
        }
    })
}

/// `$orderby` identifiers are the one case where a non-SurrealDB-safe
/// dialect *can* still emit a parameterized reference, but the SurrealDB
/// dialect inlines them directly as quoted SQL text
/// (`render_orderby` in `render.rs`). Every segment must therefore be a
/// valid bare `ODataIdentifier`, rejecting anything that is not, rather
/// than relying solely on the quoting layer's escaping.
fn validate_orderby_segment(segment: &str) -> ParseResult<()> {
    let src = Source::new(segment);
    match lexer::identifier(&src, 0) {
        Some((_, end)) if end == src.len() => Ok(()),
        _ => Err(ParseError::invalid_orderby_identifier(segment)),
    }
}

fn parse_orderby_list(value: &str) -> ParseResult<Vec<OrderByItem>> {
    let src = Source::new(value);
    parse_comma_list(&src, 0, |item| {
        let (path_str, desc) = if let Some(rest) = item.strip_suffix("desc") {
            (rest.trim_end(), true)
        } else if let Some(rest) = item.strip_suffix("asc") {
            (rest.trim_end(), false)
        } else {
            (item, false)
        };
        let path = parse_path(path_str)?;
        for segment in &path {
            validate_orderby_segment(segment)?;
        }
        Ok(OrderByItem { path, desc })
    })
}

fn parse_groupby_list(value: &str) -> ParseResult<Vec<Vec<String>>> {
    let inner = value.trim().strip_prefix('(').and_then(|s| s.strip_suffix(')')).unwrap_or(value);
    let src = Source::new(inner);
    parse_comma_list(&src, 0, parse_path)
}

fn parse_bound(value: &str, category: &str) -> ParseResult<u64> {
    value
        .trim()
        .parse::<u64>()
        .map_err(|_| ParseError::new(format!("invalid {category} value: {value}")))
}

fn parse_bool(value: &str) -> ParseResult<bool> {
    match value.trim() {
        "true" => Ok(true),
        "false" => Ok(false),
        other => Err(ParseError::new(format!("invalid boolean value: {other}"))),
    }
}

fn apply_expand_option(opts: &mut ExpandOptions, key: &str, value: &str) -> ParseResult<()> {
    match key {
        "$select" => opts.select = Some(parse_select_list(value)?),
        "$filter" => {
            let mut parser = Parser::new(value);
            opts.filter = Some(parser.parse_filter_complete()?);
        }
        "$orderby" => opts.orderby = Some(parse_orderby_list(value)?),
        "$top" => opts.top = Some(parse_bound(value, "$top")?),
        "$skip" => opts.skip = Some(parse_bound(value, "$skip")?),
        "$count" => opts.count = Some(parse_bool(value)?),
        "$expand" => opts.expand = Some(parse_expand_list(value)?),
        other => return Err(ParseError::unknown_option(other)),
    }
    Ok(())
}

/// Parses one `$expand` value into its items: `A,B($select=x;$top=1),C`.
pub fn parse_expand_list(value: &str) -> ParseResult<Vec<ExpandItem>> {
    let src = Source::new(value);
    let mut items = Vec::new();
    let mut pos = 0;
    if src.is_empty() {
        return Ok(items);
    }
    loop {
        let (item, end) = parse_expand_item(&src, pos)?;
        items.push(item);
        pos = end;
        match lexer::consume_str(&src, pos, ",") {
            Some(after_comma) => pos = after_comma,
            None => break,
        }
    }
    if pos != src.len() {
        return Err(ParseError::trailing_input(pos));
    }
    Ok(items)
}

fn parse_expand_item(src: &Source<'_>, pos: usize) -> ParseResult<(ExpandItem, usize)> {
    let path_end = scan_top_level(src, pos, src.len(), &[',', '(']);
    let path = parse_path(src.slice(Span::new(pos, path_end)))?;

    let Some(after_open) = lexer::consume_str(src, path_end, "(") else {
        return Ok((ExpandItem { path, options: ExpandOptions::default() }, path_end));
    };
    let (options, after_options) = parse_expand_options(src, after_open)?;
    let end = lexer::consume_str(src, after_options, ")")
        .ok_or_else(|| ParseError::new("expected ')' closing expand options").at(after_options))?;
    Ok((ExpandItem { path, options }, end))
}

/// Parses the `;`-separated clauses inside an expand item's parens, up to
/// (but not consuming) the closing `)`.
fn parse_expand_options(src: &Source<'_>, pos: usize) -> ParseResult<(ExpandOptions, usize)> {
    let mut opts = ExpandOptions::default();
    let mut i = pos;
    if src.peek(i) == Some(')') {
        return Ok((opts, i));
    }
    loop {
        let clause_end = scan_top_level(src, i, src.len(), &[';', ')']);
        let clause = src.slice(Span::new(i, clause_end)).trim();
        if !clause.is_empty() {
            let (key, value) = scan_key_value(src, i, clause_end, || ParseError::new(format!("malformed expand option clause: {clause}")).at(i))?;
            apply_expand_option(&mut opts, key, value)?;
        }
        i = clause_end;
        match lexer::consume_str(src, i, ";") {
            Some(after_semi) => i = after_semi,
            None => break,
        }
    }
    Ok((opts, i))
}

fn apply_top_level_option(out: &mut QueryOptions, key: &str, value: &str) -> ParseResult<()> {
    match key {
        "$filter" => {
            let mut parser = Parser::new(value);
            out.filter = Some(parser.parse_filter_complete()?);
        }
        "$select" => out.select = Some(parse_select_list(value)?),
        "$orderby" => out.orderby = Some(parse_orderby_list(value)?),
        "$groupby" => out.groupby = Some(parse_groupby_list(value)?),
        "$top" => out.top = Some(parse_bound(value, "$top")?),
        "$skip" => out.skip = Some(parse_bound(value, "$skip")?),
        "$count" => out.count = Some(parse_bool(value)?),
        "$expand" => out.expand = Some(parse_expand_list(value)?),
        "$format" => out.format = Some(value.to_string()),
        "$skiptoken" => out.skiptoken = Some(value.to_string()),
        "$search" => out.search = Some(value.to_string()),
        "$id" => out.id = Some(value.to_string()),
        other => return Err(ParseError::unknown_option(other)),
    }
    Ok(())
}

/// Parses a full `name=value&name=value...` query-option string. Option
/// order in the input never affects the resulting [`QueryOptions`] (P6).
pub fn parse_query_options(qs: &str) -> ParseResult<QueryOptions> {
    let src = Source::new(qs);
    let mut out = QueryOptions::default();
    let mut pos = 0;
    if src.is_empty() {
        return Ok(out);
    }
    loop {
        let (key, value, end) = parse_query_option_pair(&src, pos)?;
        if !key.is_empty() {
            apply_top_level_option(&mut out, key, value)?;
        }
        pos = end;
        match lexer::consume_str(&src, pos, "&") {
            Some(after_amp) => pos = after_amp,
            None => break,
        }
    }
    if pos != src.len() {
        return Err(ParseError::trailing_input(pos));
    }
    Ok(out)
}

/// Recognizes one `name=value` pair up to (but not consuming) the next
/// top-level `&` or the end of input. A blank segment (consecutive `&&`)
/// comes back as an empty key, which the caller skips.
fn parse_query_option_pair<'a>(src: &Source<'a>, pos: usize) -> ParseResult<(&'a str, &'a str, usize)> {
    let pair_end = scan_top_level(src, pos, src.len(), &['&']);
    let pair = src.slice(Span::new(pos, pair_end)).trim();
    if pair.is_empty() {
        return Ok(("", "", pair_end));
    }
    let (key, value) = scan_key_value(src, pos, pair_end, || ParseError::new(format!("malformed query option: {pair}")).at(pos))?;
    Ok((key, value, pair_end))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn option_order_does_not_affect_result() {
        let a = parse_query_options("$top=5&$skip=10").unwrap();
        let b = parse_query_options("$skip=10&$top=5").unwrap();
        assert_eq!(a.top, b.top);
        assert_eq!(a.skip, b.skip);
    }

    #[test]
    fn expand_with_nested_options_splits_correctly() {
        let items = parse_expand_list("Orders($select=Id,Total;$top=5),Profile").unwrap();
        assert_eq!(items.len(), 2);
        assert_eq!(items[0].path, vec!["Orders".to_string()]);
        assert_eq!(items[0].options.top, Some(5));
        assert_eq!(items[1].path, vec!["Profile".to_string()]);
    }

    #[test]
    fn unknown_option_is_rejected() {
        assert!(parse_query_options("$bogus=1").is_err());
    }

    #[test]
    fn consecutive_ampersands_are_tolerated() {
        let out = parse_query_options("$top=5&&$skip=10").unwrap();
        assert_eq!(out.top, Some(5));
        assert_eq!(out.skip, Some(10));
    }

    #[test]
    fn filter_value_with_parens_does_not_confuse_option_boundary() {
        let out = parse_query_options("$filter=startswith(Name,'A')&$top=5").unwrap();
        assert!(out.filter.is_some());
        assert_eq!(out.top, Some(5));
    }

    #[test]
    fn nested_expand_parens_do_not_split_outer_list_early() {
        let items = parse_expand_list("A($filter=X eq 1;$expand=B($filter=Y eq 2)),C").unwrap();
        assert_eq!(items.len(), 2);
        assert_eq!(items[0].path, vec!["A".to_string()]);
        assert_eq!(items[0].options.expand.as_ref().unwrap()[0].path, vec!["B".to_string()]);
        assert_eq!(items[1].path, vec!["C".to_string()]);
    }
}
