//! EDM literal shape recognizers (spec.md §4.1's primitive literal grammar).
//!
//! Each `try_*` function peeks a cheap prefix to decide whether this shape
//! even starts at `pos`; once committed, it parses to completion or raises
//! a shape-specific [`ParseError`] rather than silently falling through to
//! the next recognizer (so `$filter=Created eq 2024-13-40` fails as a
//! malformed date, not as an unrecognized token).

use crate::ast::Literal;
use crate::error::{ParseError, ParseResult};
use crate::source::{Source, Span};
use crate::value::GeoPoint;

/// `'...'` with `''` as an escaped quote.
pub fn try_string(src: &Source<'_>, pos: usize) -> ParseResult<Option<(Literal, usize)>> {
    if src.peek(pos) != Some('\'') {
        return Ok(None);
    }
    let mut i = pos + 1;
    let mut out = String::new();
    loop {
        match src.peek(i) {
            None => return Err(ParseError::new("unterminated string literal").at(pos)),
            Some('\'') => {
                if src.starts_with(i + 1, "'") {
                    out.push('\'');
                    i += 2;
                } else {
                    i += 1;
                    break;
                }
            }
            Some(c) => {
                out.push(c);
                i += c.len_utf8();
            }
        }
    }
    Ok(Some((Literal::String(out), i)))
}

/// `8-4-4-4-12` hex-digit GUID, case-insensitive.
pub fn try_guid(src: &Source<'_>, pos: usize) -> ParseResult<Option<(Literal, usize)>> {
    let groups = [8, 4, 4, 4, 12];
    let mut i = pos;
    // Only commit once the first group is plausibly hex digits followed by
    // a dash, so a bare integer literal is never mistaken for a GUID.
    let first_len = hex_run(src, i);
    if first_len != 8 || src.peek(i + 8) != Some('-') {
        return Ok(None);
    }
    for (n, &len) in groups.iter().enumerate() {
        let got = hex_run(src, i);
        if got != len {
            return Err(ParseError::invalid_guid(src.rest(pos)).at(pos));
        }
        i += len;
        if n + 1 < groups.len() {
            if src.peek(i) != Some('-') {
                return Err(ParseError::invalid_guid(src.rest(pos)).at(pos));
            }
            i += 1;
        }
    }
    let raw = src.slice(Span::new(pos, i)).to_string();
    Ok(Some((Literal::Guid(raw), i)))
}

fn hex_run(src: &Source<'_>, pos: usize) -> usize {
    let mut n = 0;
    for c in src.rest(pos).chars() {
        if c.is_ascii_hexdigit() {
            n += 1;
        } else {
            break;
        }
    }
    n
}

fn digit_run(src: &Source<'_>, pos: usize, want: usize) -> Option<usize> {
    let s = src.rest(pos);
    if s.len() >= want && s.as_bytes()[..want].iter().all(u8::is_ascii_digit) {
        Some(pos + want)
    } else {
        None
    }
}

/// `YYYY-MM-DD`.
pub fn try_date(src: &Source<'_>, pos: usize) -> ParseResult<Option<(Literal, usize)>> {
    if digit_run(src, pos, 4).is_none() {
        return Ok(None);
    }
    if src.peek(pos + 4) != Some('-') {
        return Ok(None);
    }
    let (date_str, end) = parse_date_part(src, pos).ok_or_else(|| ParseError::invalid_date(src.rest(pos)).at(pos))?;
    Ok(Some((Literal::Date(date_str), end)))
}

fn parse_date_part(src: &Source<'_>, pos: usize) -> Option<(String, usize)> {
    let y_end = digit_run(src, pos, 4)?;
    if src.peek(y_end) != Some('-') {
        return None;
    }
    let m_end = digit_run(src, y_end + 1, 2)?;
    if src.peek(m_end) != Some('-') {
        return None;
    }
    let d_end = digit_run(src, m_end + 1, 2)?;
    let s = src.slice(Span::new(pos, d_end)).to_string();
    let month: u32 = s[5..7].parse().ok()?;
    let day: u32 = s[8..10].parse().ok()?;
    if !(1..=12).contains(&month) || !(1..=31).contains(&day) {
        return None;
    }
    Some((s, d_end))
}

/// `HH:MM:SS(.fff)?`.
pub fn try_time_of_day(src: &Source<'_>, pos: usize) -> ParseResult<Option<(Literal, usize)>> {
    if digit_run(src, pos, 2).is_none() {
        return Ok(None);
    }
    if src.peek(pos + 2) != Some(':') {
        return Ok(None);
    }
    let (s, end) = parse_time_part(src, pos).ok_or_else(|| ParseError::invalid_time_of_day(src.rest(pos)).at(pos))?;
    Ok(Some((Literal::TimeOfDay(s), end)))
}

fn parse_time_part(src: &Source<'_>, pos: usize) -> Option<(String, usize)> {
    let h_end = digit_run(src, pos, 2)?;
    if src.peek(h_end) != Some(':') {
        return None;
    }
    let mi_end = digit_run(src, h_end + 1, 2)?;
    if src.peek(mi_end) != Some(':') {
        return None;
    }
    let mut end = digit_run(src, mi_end + 1, 2)?;
    if src.peek(end) == Some('.') {
        let frac_start = end + 1;
        let mut frac_end = frac_start;
        for c in src.rest(frac_start).chars() {
            if c.is_ascii_digit() {
                frac_end += 1;
            } else {
                break;
            }
        }
        if frac_end > frac_start {
            end = frac_end;
        }
    }
    let s = src.slice(Span::new(pos, end)).to_string();
    let hour: u32 = s[0..2].parse().ok()?;
    let minute: u32 = s[3..5].parse().ok()?;
    let second: u32 = s[6..8].parse().ok()?;
    if hour > 23 || minute > 59 || second > 59 {
        return None;
    }
    Some((s, end))
}

/// Full ISO-8601 date-time-offset: date `T` time `(Z|[+-]HH:MM)`.
pub fn try_date_time_offset(src: &Source<'_>, pos: usize) -> ParseResult<Option<(Literal, usize)>> {
    if digit_run(src, pos, 4).is_none() || src.peek(pos + 4) != Some('-') {
        return Ok(None);
    }
    let (date_part, after_date) =
        parse_date_part(src, pos).ok_or_else(|| ParseError::invalid_datetimeoffset(src.rest(pos)).at(pos))?;
    if !matches!(src.peek(after_date), Some('T') | Some('t')) {
        return Ok(None);
    }
    let (time_part, after_time) = parse_time_part(src, after_date + 1)
        .ok_or_else(|| ParseError::invalid_datetimeoffset(src.rest(pos)).at(pos))?;
    let (offset, end) = match src.peek(after_time) {
        Some('Z') | Some('z') => ("Z".to_string(), after_time + 1),
        Some('+') | Some('-') => {
            let h_end = digit_run(src, after_time + 1, 2)
                .ok_or_else(|| ParseError::invalid_datetimeoffset(src.rest(pos)).at(pos))?;
            if src.peek(h_end) != Some(':') {
                return Err(ParseError::invalid_datetimeoffset(src.rest(pos)).at(pos));
            }
            let m_end = digit_run(src, h_end + 1, 2)
                .ok_or_else(|| ParseError::invalid_datetimeoffset(src.rest(pos)).at(pos))?;
            (src.slice(Span::new(after_time, m_end)).to_string(), m_end)
        }
        _ => return Err(ParseError::invalid_datetimeoffset(src.rest(pos)).at(pos)),
    };
    let raw = format!("{date_part}T{time_part}{offset}");
    Ok(Some((Literal::DateTimeOffset(raw), end)))
}

/// ISO-8601 duration: `[-]P[nD][T[nH][nM][nS]]`.
pub fn try_duration(src: &Source<'_>, pos: usize) -> ParseResult<Option<(Literal, usize)>> {
    let neg = src.peek(pos) == Some('-');
    let start = if neg { pos + 1 } else { pos };
    if src.peek(start) != Some('P') {
        return Ok(None);
    }
    let mut i = start + 1;
    let mut saw_any = false;
    i = consume_designated(src, i, 'D', &mut saw_any);
    if src.peek(i) == Some('T') {
        let t_pos = i;
        i += 1;
        let before = i;
        i = consume_designated(src, i, 'H', &mut saw_any);
        i = consume_designated(src, i, 'M', &mut saw_any);
        i = consume_designated_frac(src, i, 'S', &mut saw_any);
        if i == before {
            // bare "T" with nothing after it: not part of the duration.
            i = t_pos;
        }
    }
    if !saw_any {
        return Err(ParseError::invalid_duration(src.rest(pos)).at(pos));
    }
    let raw = src.slice(Span::new(pos, i)).to_string();
    Ok(Some((Literal::Duration(raw), i)))
}

fn consume_designated(src: &Source<'_>, pos: usize, designator: char, saw_any: &mut bool) -> usize {
    let (digits, end) = match super::digits(src, pos) {
        Some(v) => v,
        None => return pos,
    };
    let _ = digits;
    if src.peek(end) == Some(designator) {
        *saw_any = true;
        end + 1
    } else {
        pos
    }
}

fn consume_designated_frac(src: &Source<'_>, pos: usize, designator: char, saw_any: &mut bool) -> usize {
    let mut end = match super::digits(src, pos) {
        Some((_, e)) => e,
        None => return pos,
    };
    if src.peek(end) == Some('.') {
        let frac_start = end + 1;
        if let Some((_, frac_end)) = super::digits(src, frac_start) {
            end = frac_end;
        }
    }
    if src.peek(end) == Some(designator) {
        *saw_any = true;
        end + 1
    } else {
        pos
    }
}

fn float_token<'a>(src: &Source<'a>, pos: usize) -> Option<(&'a str, usize)> {
    let mut i = pos;
    if src.peek(i) == Some('-') {
        i += 1;
    }
    let (_, after_int) = super::digits(src, i)?;
    i = after_int;
    if src.peek(i) == Some('.') {
        if let Some((_, after_frac)) = super::digits(src, i + 1) {
            i = after_frac;
        }
    }
    if matches!(src.peek(i), Some('e') | Some('E')) {
        let mut j = i + 1;
        if matches!(src.peek(j), Some('+') | Some('-')) {
            j += 1;
        }
        if let Some((_, after_exp)) = super::digits(src, j) {
            i = after_exp;
        }
    }
    Some((src.slice(Span::new(pos, i)), i))
}

/// Numeric literal: `Int32`, or with a type suffix `L`/`M`/`D`/`F` per
/// spec.md §3; bare floats without a suffix are `Double`.
pub fn try_number(src: &Source<'_>, pos: usize) -> ParseResult<Option<(Literal, usize)>> {
    let starts_numeric = src.peek(pos).is_some_and(|c| c.is_ascii_digit())
        || (src.peek(pos) == Some('-') && src.peek(pos + 1).is_some_and(|c| c.is_ascii_digit()));
    if !starts_numeric {
        return Ok(None);
    }
    let (text, end) = float_token(src, pos).ok_or_else(|| ParseError::new("malformed numeric literal").at(pos))?;
    let is_float = text.contains('.') || text.contains('e') || text.contains('E');
    let suffix = src.peek(end);
    let (literal, end) = match suffix {
        Some('L') | Some('l') => {
            let v: i64 = text.parse().map_err(|_| ParseError::new("invalid Int64 literal").at(pos))?;
            (Literal::Int64(v), end + 1)
        }
        Some('M') | Some('m') => (Literal::Decimal(text.to_string()), end + 1),
        Some('D') | Some('d') => {
            let v: f64 = text.parse().map_err(|_| ParseError::new("invalid Double literal").at(pos))?;
            (Literal::Double(v), end + 1)
        }
        Some('F') | Some('f') => {
            let v: f32 = text.parse().map_err(|_| ParseError::new("invalid Single literal").at(pos))?;
            (Literal::Single(v), end + 1)
        }
        _ if is_float => {
            let v: f64 = text.parse().map_err(|_| ParseError::new("invalid Double literal").at(pos))?;
            (Literal::Double(v), end)
        }
        _ => {
            let v: i32 = text
                .parse()
                .map_err(|_| ParseError::new("invalid Int32 literal").at(pos))?;
            (Literal::Int32(v), end)
        }
    };
    Ok(Some((literal, end)))
}

pub fn try_boolean(src: &Source<'_>, pos: usize) -> Option<(Literal, usize)> {
    if let Some(end) = super::consume_ci(src, pos, "true") {
        return Some((Literal::Boolean(true), end));
    }
    if let Some(end) = super::consume_ci(src, pos, "false") {
        return Some((Literal::Boolean(false), end));
    }
    None
}

pub fn try_null(src: &Source<'_>, pos: usize) -> Option<usize> {
    super::consume_ci(src, pos, "null")
}

fn parse_point_body(src: &Source<'_>, pos: usize) -> ParseResult<(GeoPoint, usize)> {
    let (x_str, after_x) = float_token(src, pos).ok_or_else(|| ParseError::invalid_geo_literal("Point").at(pos))?;
    let after_sp = super::skip_ws(src, after_x);
    let (y_str, after_y) =
        float_token(src, after_sp).ok_or_else(|| ParseError::invalid_geo_literal("Point").at(pos))?;
    let x: f64 = x_str.parse().map_err(|_| ParseError::invalid_geo_literal("Point").at(pos))?;
    let y: f64 = y_str.parse().map_err(|_| ParseError::invalid_geo_literal("Point").at(pos))?;
    Ok((GeoPoint { x, y }, after_y))
}

fn parse_point_list(src: &Source<'_>, pos: usize) -> ParseResult<(Vec<GeoPoint>, usize)> {
    let mut points = Vec::new();
    let mut i = pos;
    loop {
        let (p, after) = parse_point_body(src, i)?;
        points.push(p);
        i = super::skip_ws(src, after);
        if src.peek(i) == Some(',') {
            i = super::skip_ws(src, i + 1);
        } else {
            break;
        }
    }
    Ok((points, i))
}

/// One or more `(x y, x y, …)` rings, comma-separated — a `Polygon`'s body,
/// or one entry of a `MultiLineString`.
fn parse_ring_list(src: &Source<'_>, pos: usize) -> ParseResult<(Vec<Vec<GeoPoint>>, usize)> {
    let mut rings = Vec::new();
    let mut j = pos;
    loop {
        let ring_start = super::consume_str(src, j, "(").ok_or_else(|| ParseError::invalid_geo_literal("ring").at(pos))?;
        let (points, after_ring) = parse_point_list(src, ring_start)?;
        j = super::consume_str(src, after_ring, ")").ok_or_else(|| ParseError::invalid_geo_literal("ring").at(pos))?;
        rings.push(points);
        if src.peek(j) == Some(',') {
            j = super::skip_ws(src, j + 1);
        } else {
            break;
        }
    }
    Ok((rings, j))
}

/// One or more `(ring_list)` polygons, comma-separated — a `MultiPolygon`'s body.
fn parse_polygon_list(src: &Source<'_>, pos: usize) -> ParseResult<(Vec<Vec<Vec<GeoPoint>>>, usize)> {
    let mut polys = Vec::new();
    let mut j = pos;
    loop {
        let body_start =
            super::consume_str(src, j, "(").ok_or_else(|| ParseError::invalid_geo_literal("Polygon").at(pos))?;
        let (rings, after_rings) = parse_ring_list(src, body_start)?;
        j = super::consume_str(src, after_rings, ")").ok_or_else(|| ParseError::invalid_geo_literal("Polygon").at(pos))?;
        polys.push(rings);
        if src.peek(j) == Some(',') {
            j = super::skip_ws(src, j + 1);
        } else {
            break;
        }
    }
    Ok((polys, j))
}

/// One or more comma-separated nested shapes — a `Collection`'s body.
fn parse_shape_list(src: &Source<'_>, pos: usize) -> ParseResult<(Vec<Literal>, usize)> {
    let mut shapes = Vec::new();
    let mut i = pos;
    loop {
        let (shape, after) = parse_geography_shape(src, i)?;
        shapes.push(shape);
        i = super::skip_ws(src, after);
        if src.peek(i) == Some(',') {
            i = super::skip_ws(src, i + 1);
        } else {
            break;
        }
    }
    Ok((shapes, i))
}

/// Dispatches on the shape keyword (`Point`/`LineString`/`Polygon` and their
/// `Multi*`/`Collection` counterparts) and parses its parenthesized body,
/// stopping right after the shape's own closing paren (the caller is
/// responsible for the surrounding `geography'...'` quoting).
fn parse_geography_shape(src: &Source<'_>, pos: usize) -> ParseResult<(Literal, usize)> {
    if let Some(after) = super::consume_ci(src, pos, "multipoint(") {
        let (points, after_body) = parse_point_list(src, after)?;
        let end =
            super::consume_str(src, after_body, ")").ok_or_else(|| ParseError::invalid_geo_literal("MultiPoint").at(pos))?;
        return Ok((Literal::GeographyMultiPoint(points), end));
    }
    if let Some(after) = super::consume_ci(src, pos, "multilinestring(") {
        let (rings, after_body) = parse_ring_list(src, after)?;
        let end = super::consume_str(src, after_body, ")")
            .ok_or_else(|| ParseError::invalid_geo_literal("MultiLineString").at(pos))?;
        return Ok((Literal::GeographyMultiLineString(rings), end));
    }
    if let Some(after) = super::consume_ci(src, pos, "multipolygon(") {
        let (polys, after_body) = parse_polygon_list(src, after)?;
        let end = super::consume_str(src, after_body, ")")
            .ok_or_else(|| ParseError::invalid_geo_literal("MultiPolygon").at(pos))?;
        return Ok((Literal::GeographyMultiPolygon(polys), end));
    }
    if let Some(after) = super::consume_ci(src, pos, "collection(") {
        let (shapes, after_body) = parse_shape_list(src, after)?;
        let end =
            super::consume_str(src, after_body, ")").ok_or_else(|| ParseError::invalid_geo_literal("Collection").at(pos))?;
        return Ok((Literal::GeographyCollection(shapes), end));
    }
    if let Some(after) = super::consume_ci(src, pos, "point(") {
        let (point, after_body) = parse_point_body(src, after)?;
        let end = super::consume_str(src, after_body, ")").ok_or_else(|| ParseError::invalid_geo_literal("Point").at(pos))?;
        return Ok((Literal::GeographyPoint(point), end));
    }
    if let Some(after) = super::consume_ci(src, pos, "linestring(") {
        let (points, after_body) = parse_point_list(src, after)?;
        let end = super::consume_str(src, after_body, ")")
            .ok_or_else(|| ParseError::invalid_geo_literal("LineString").at(pos))?;
        return Ok((Literal::GeographyLineString(points), end));
    }
    if let Some(after) = super::consume_ci(src, pos, "polygon(") {
        let (rings, after_body) = parse_ring_list(src, after)?;
        let end = super::consume_str(src, after_body, ")").ok_or_else(|| ParseError::invalid_geo_literal("Polygon").at(pos))?;
        return Ok((Literal::GeographyPolygon(rings), end));
    }
    Err(ParseError::invalid_geo_literal("unrecognized geography shape").at(pos))
}

/// `geography'SRID=4326;POINT(x y)'` / `LINESTRING(...)` / `POLYGON((...))` /
/// `MULTIPOINT(...)` / `MULTILINESTRING(...)` / `MULTIPOLYGON(...)` /
/// `COLLECTION(...)`.
pub fn try_geography(src: &Source<'_>, pos: usize) -> ParseResult<Option<(Literal, usize)>> {
    let Some(mut i) = super::consume_ci(src, pos, "geography'") else {
        return Ok(None);
    };
    if let Some(srid_start) = super::consume_ci(src, i, "srid=") {
        let (_, after_digits) = super::digits(src, srid_start).ok_or_else(|| ParseError::invalid_geo_literal("SRID").at(pos))?;
        i = after_digits;
        i = super::consume_str(src, i, ";").ok_or_else(|| ParseError::invalid_geo_literal("SRID").at(pos))?;
    }
    let (literal, after_shape) = parse_geography_shape(src, i)?;
    let end = super::consume_str(src, after_shape, "'").ok_or_else(|| ParseError::invalid_geo_literal("unterminated").at(pos))?;
    Ok(Some((literal, end)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn string_handles_escaped_quote() {
        let src = Source::new("'O''Brien' rest");
        let (lit, end) = try_string(&src, 0).unwrap().unwrap();
        assert_eq!(lit, Literal::String("O'Brien".to_string()));
        assert_eq!(&src.full()[end..], " rest");
    }

    #[test]
    fn guid_parses_canonical_form() {
        let src = Source::new("12345678-1234-1234-1234-123456789012");
        let (lit, end) = try_guid(&src, 0).unwrap().unwrap();
        assert_eq!(end, src.len());
        assert!(matches!(lit, Literal::Guid(_)));
    }

    #[test]
    fn guid_rejects_short_group() {
        let src = Source::new("12345678-123-1234-1234-123456789012");
        assert!(try_guid(&src, 0).is_err());
    }

    #[test]
    fn date_rejects_invalid_month() {
        let src = Source::new("2024-13-01");
        assert!(try_date(&src, 0).is_err());
    }

    #[test]
    fn duration_parses_full_shape() {
        let src = Source::new("P3DT4H5M6S");
        let (lit, end) = try_duration(&src, 0).unwrap().unwrap();
        assert_eq!(end, src.len());
        assert_eq!(lit, Literal::Duration("P3DT4H5M6S".to_string()));
    }

    #[test]
    fn duration_requires_at_least_one_component() {
        let src = Source::new("Pxyz");
        assert!(try_duration(&src, 0).is_err());
    }

    #[test]
    fn geography_point_parses() {
        let src = Source::new("geography'SRID=4326;POINT(-122.1 47.6)'");
        let (lit, end) = try_geography(&src, 0).unwrap().unwrap();
        assert_eq!(end, src.len());
        assert!(matches!(lit, Literal::GeographyPoint(_)));
    }

    #[test]
    fn number_with_decimal_suffix() {
        let src = Source::new("12.50M");
        let (lit, end) = try_number(&src, 0).unwrap().unwrap();
        assert_eq!(end, src.len());
        assert_eq!(lit, Literal::Decimal("12.50".to_string()));
    }
}
