//! C2 — character-level recognizers the parser productions are built from.
//!
//! Every function here has the shape `fn(&Source, pos) -> Option<(T, usize)>`
//! (or `ParseResult` once a literal has committed to a shape but turns out
//! malformed), advancing past the idiomatic lack of null-terminated walks
//! and instead returning the next byte offset. There is no separate
//! tokenize-then-parse pass; the parser calls straight into these.

pub mod literals;

use crate::source::Source;

/// Advances past ASCII OData whitespace (`%20`/`+` are decoded upstream of
/// this crate; only literal spaces appear here).
#[must_use]
pub fn skip_ws(src: &Source<'_>, mut pos: usize) -> usize {
    while let Some(c) = src.peek(pos) {
        if c == ' ' {
            pos += 1;
        } else {
            break;
        }
    }
    pos
}

/// Consumes a literal ASCII keyword (`"eq"`, `"and"`, `$filter`'s `$`-prefix,
/// etc.) if present at `pos`, case-sensitively.
#[must_use]
pub fn consume_str<'a>(src: &Source<'a>, pos: usize, needle: &str) -> Option<usize> {
    if src.starts_with(pos, needle) {
        Some(pos + needle.len())
    } else {
        None
    }
}

/// Consumes a keyword case-insensitively (used only for the small set of
/// OData keywords that are conventionally written lowercase but whose
/// grammar does not actually require case sensitivity at the lexer level,
/// e.g. `true`/`false`/`null`).
#[must_use]
pub fn consume_ci(src: &Source<'_>, pos: usize, needle: &str) -> Option<usize> {
    if src.starts_with_ci(pos, needle) {
        Some(pos + needle.len())
    } else {
        None
    }
}

fn is_identifier_start(c: char) -> bool {
    c.is_ascii_alphabetic() || c == '_'
}

fn is_identifier_continue(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}

/// `ODataIdentifier` — `[A-Za-z_][A-Za-z0-9_]*`.
#[must_use]
pub fn identifier<'a>(src: &Source<'a>, pos: usize) -> Option<(&'a str, usize)> {
    let mut chars = src.rest(pos).char_indices();
    let mut end = match chars.next() {
        Some((_, c)) if is_identifier_start(c) => pos + c.len_utf8(),
        _ => return None,
    };
    for (offset, c) in chars {
        if is_identifier_continue(c) {
            end = pos + offset + c.len_utf8();
        } else {
            break;
        }
    }
    Some((src.slice(crate::source::Span::new(pos, end)), end))
}

/// A bare unsigned decimal digit run, used by numeric-literal recognizers
/// and by `$top`/`$skip` bound parsing.
#[must_use]
pub fn digits<'a>(src: &Source<'a>, pos: usize) -> Option<(&'a str, usize)> {
    let mut end = pos;
    for c in src.rest(pos).chars() {
        if c.is_ascii_digit() {
            end += 1;
        } else {
            break;
        }
    }
    if end == pos {
        None
    } else {
        Some((src.slice(crate::source::Span::new(pos, end)), end))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identifier_stops_at_non_continue() {
        let src = Source::new("Name eq 'x'");
        let (name, pos) = identifier(&src, 0).unwrap();
        assert_eq!(name, "Name");
        assert_eq!(pos, 4);
    }

    #[test]
    fn identifier_rejects_leading_digit() {
        let src = Source::new("1Name");
        assert!(identifier(&src, 0).is_none());
    }

    #[test]
    fn skip_ws_advances_past_spaces_only() {
        let src = Source::new("   eq");
        assert_eq!(skip_ws(&src, 0), 3);
    }
}
