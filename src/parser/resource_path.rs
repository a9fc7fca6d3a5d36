//! `ResourcePath` — the `/Table(...)` / `/Table/key` / `/Table:key` URL
//! segment shapes (spec.md §4.1). This is parsed independently of query
//! options; `crate::api` does not require it for `$filter`-only compiles.

use crate::ast::{Literal, ResourcePath};
use crate::error::{ParseError, ParseResult};
use crate::lexer::{self, literals};
use crate::source::Source;

/// Parses `Table('key')`, `Table(key)`, `Table('a','b')`, `Table/key`,
/// `Table:key`, and the numeric range form `Table(12345..23456)`.
pub fn parse_resource_path(text: &str) -> ParseResult<ResourcePath> {
    let src = Source::new(text);
    let (table, after_table) = lexer::identifier(&src, 0).ok_or_else(|| ParseError::new("expected a table name"))?;

    if after_table == src.len() {
        return Ok(ResourcePath {
            table: table.to_string(),
            keys: Vec::new(),
        });
    }

    if let Some(after_colon) = lexer::consume_str(&src, after_table, ":") {
        let keys = vec![parse_key_literal(&src, after_colon)?];
        return Ok(ResourcePath {
            table: table.to_string(),
            keys,
        });
    }

    if let Some(after_slash) = lexer::consume_str(&src, after_table, "/") {
        let keys = vec![parse_key_literal(&src, after_slash)?];
        return Ok(ResourcePath {
            table: table.to_string(),
            keys,
        });
    }

    if let Some(after_open) = lexer::consume_str(&src, after_table, "(") {
        if let Some((lo, hi, end)) = try_range(&src, after_open)? {
            let _ = end;
            return Ok(ResourcePath {
                table: table.to_string(),
                keys: vec![lo, hi],
            });
        }
        let mut i = after_open;
        let mut keys = Vec::new();
        loop {
            let (lit, end) = parse_one_key(&src, i)?;
            keys.push(lit);
            i = end;
            if let Some(after_comma) = lexer::consume_str(&src, i, ",") {
                i = after_comma;
            } else {
                break;
            }
        }
        let end = lexer::consume_str(&src, i, ")")
            .ok_or_else(|| ParseError::new("expected ')' closing key predicate").at(i))?;
        if end != src.len() {
            return Err(ParseError::trailing_input(end));
        }
        return Ok(ResourcePath {
            table: table.to_string(),
            keys,
        });
    }

    Err(ParseError::trailing_input(after_table))
}

fn try_range(src: &Source<'_>, pos: usize) -> ParseResult<Option<(Literal, Literal, usize)>> {
    let Some((lo, after_lo)) = literals::try_number(src, pos)? else {
        return Ok(None);
    };
    let Some(after_dots) = lexer::consume_str(src, after_lo, "..") else {
        return Ok(None);
    };
    let (hi, after_hi) = literals::try_number(src, after_dots)?
        .ok_or_else(|| ParseError::new("expected upper bound of key range").at(after_dots))?;
    let end = lexer::consume_str(src, after_hi, ")")
        .ok_or_else(|| ParseError::new("expected ')' closing key range").at(after_hi))?;
    Ok(Some((lo, hi, end)))
}

fn parse_one_key(src: &Source<'_>, pos: usize) -> ParseResult<(Literal, usize)> {
    // Named key form `Id=1` inside a composite key predicate.
    if let Some((_name, after_name)) = lexer::identifier(src, pos) {
        if let Some(after_eq) = lexer::consume_str(src, after_name, "=") {
            return parse_key_literal_at(src, after_eq);
        }
    }
    parse_key_literal_at(src, pos)
}

fn parse_key_literal_at(src: &Source<'_>, pos: usize) -> ParseResult<(Literal, usize)> {
    if let Some((lit, end)) = literals::try_string(src, pos)? {
        return Ok((lit, end));
    }
    if let Some((lit, end)) = literals::try_guid(src, pos)? {
        return Ok((lit, end));
    }
    if let Some((lit, end)) = literals::try_number(src, pos)? {
        return Ok((lit, end));
    }
    Err(ParseError::new("expected a key literal").at(pos))
}

fn parse_key_literal(src: &Source<'_>, pos: usize) -> ParseResult<Literal> {
    let (lit, end) = parse_key_literal_at(src, pos)?;
    if end != src.len() {
        return Err(ParseError::trailing_input(end));
    }
    Ok(lit)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn table_with_string_key() {
        let rp = parse_resource_path("Orders('abc')").unwrap();
        assert_eq!(rp.table, "Orders");
        assert_eq!(rp.keys, vec![Literal::String("abc".to_string())]);
    }

    #[test]
    fn table_with_slash_key() {
        let rp = parse_resource_path("Orders/42").unwrap();
        assert_eq!(rp.keys, vec![Literal::Int32(42)]);
    }

    #[test]
    fn table_with_range() {
        let rp = parse_resource_path("Orders(12345..23456)").unwrap();
        assert_eq!(rp.keys, vec![Literal::Int32(12345), Literal::Int32(23456)]);
    }

    #[test]
    fn table_with_composite_keys() {
        let rp = parse_resource_path("Orders(CustomerId=1,OrderId=2)").unwrap();
        assert_eq!(rp.keys, vec![Literal::Int32(1), Literal::Int32(2)]);
    }
}
