//! C5 — converts a parsed [`Literal`] into the typed [`ParamValue`] that
//! flows into the parameter map. This is where a GUID/date/time/duration
//! shape that passed the lexer's syntax check is actually constructed and
//! range-checked (e.g. `chrono` rejects `2024-02-30`); lexer-level shape
//! errors (missing digit groups, bad designators) were already raised in
//! `crate::lexer::literals`.

use std::str::FromStr;

use bigdecimal::BigDecimal;
use chrono::{DateTime, NaiveDate, NaiveTime};
use uuid::Uuid;

use crate::ast::Literal;
use crate::error::{ParseError, ParseResult};
use crate::value::ParamValue;

/// Converts a parsed literal node to its typed parameter value.
pub fn to_param_value(lit: &Literal) -> ParseResult<ParamValue> {
    Ok(match lit {
        Literal::Null => ParamValue::Null,
        Literal::Boolean(b) => ParamValue::Bool(*b),
        Literal::Int32(v) => ParamValue::Int(i64::from(*v)),
        Literal::Int64(v) => ParamValue::Int(*v),
        Literal::Double(v) => ParamValue::Float(*v),
        Literal::Single(v) => ParamValue::Float(f64::from(*v)),
        Literal::Decimal(raw) => {
            let d = BigDecimal::from_str(raw).map_err(|_| ParseError::new(format!("invalid decimal literal: {raw}")))?;
            ParamValue::Decimal(d)
        }
        Literal::String(s) => ParamValue::String(s.clone()),
        Literal::Guid(raw) => {
            let uuid = Uuid::parse_str(raw).map_err(|_| ParseError::invalid_guid(raw))?;
            ParamValue::Guid(uuid)
        }
        Literal::Date(raw) => {
            let date = NaiveDate::parse_from_str(raw, "%Y-%m-%d").map_err(|_| ParseError::invalid_date(raw))?;
            ParamValue::Date(date)
        }
        Literal::TimeOfDay(raw) => {
            let time = parse_time_of_day(raw)?;
            ParamValue::TimeOfDay(time)
        }
        Literal::DateTimeOffset(raw) => {
            let dt = DateTime::parse_from_rfc3339(raw).map_err(|_| ParseError::invalid_datetimeoffset(raw))?;
            ParamValue::DateTimeOffset(dt)
        }
        Literal::Duration(raw) => ParamValue::Duration(raw.clone()),
        Literal::GeographyPoint(p) => ParamValue::GeoPoint(*p),
        Literal::GeographyLineString(pts) => ParamValue::GeoLineString(pts.clone()),
        Literal::GeographyPolygon(rings) => ParamValue::GeoPolygon(rings.clone()),
        Literal::GeographyMultiPoint(pts) => ParamValue::GeoMultiPoint(pts.clone()),
        Literal::GeographyMultiLineString(lines) => ParamValue::GeoMultiLineString(lines.clone()),
        Literal::GeographyMultiPolygon(polys) => ParamValue::GeoMultiPolygon(polys.clone()),
        Literal::GeographyCollection(shapes) => {
            let converted = shapes.iter().map(to_param_value).collect::<ParseResult<Vec<_>>>()?;
            ParamValue::GeoCollection(converted)
        }
    })
}

/// Inlines a value as SQL-escaped literal text instead of a parameter
/// placeholder. Used only when a compile opts out of parameterization
/// (`CompileOptions::use_parameters = false`) for uniform testing against
/// untrusted input is never routed through this path.
pub fn to_sql_literal(value: &ParamValue) -> String {
    match value {
        ParamValue::Null => "NULL".to_string(),
        ParamValue::Bool(b) => if *b { "TRUE".to_string() } else { "FALSE".to_string() },
        ParamValue::Int(v) => v.to_string(),
        ParamValue::Float(v) => v.to_string(),
        ParamValue::Decimal(d) => d.to_string(),
        ParamValue::String(s) | ParamValue::FieldName(s) => quote_sql_string(s),
        ParamValue::Guid(u) => quote_sql_string(&u.to_string()),
        ParamValue::Date(d) => quote_sql_string(&d.to_string()),
        ParamValue::DateTimeOffset(dt) => quote_sql_string(&dt.to_rfc3339()),
        ParamValue::TimeOfDay(t) => quote_sql_string(&t.to_string()),
        ParamValue::Duration(s) => quote_sql_string(s),
        ParamValue::GeoPoint(p) => quote_sql_string(&format!("Point({} {})", p.x, p.y)),
        ParamValue::GeoLineString(pts) => quote_sql_string(&format!("LineString({})", join_points(pts))),
        ParamValue::GeoPolygon(rings) => {
            let body = rings.iter().map(|r| format!("({})", join_points(r))).collect::<Vec<_>>().join(", ");
            quote_sql_string(&format!("Polygon({body})"))
        }
        ParamValue::GeoMultiPoint(pts) => quote_sql_string(&format!("MultiPoint({})", join_points(pts))),
        ParamValue::GeoMultiLineString(lines) => {
            let body = lines.iter().map(|l| format!("({})", join_points(l))).collect::<Vec<_>>().join(", ");
            quote_sql_string(&format!("MultiLineString({body})"))
        }
        ParamValue::GeoMultiPolygon(polys) => {
            let body = polys
                .iter()
                .map(|rings| {
                    let rings_text = rings.iter().map(|r| format!("({})", join_points(r))).collect::<Vec<_>>().join(", ");
                    format!("({rings_text})")
                })
                .collect::<Vec<_>>()
                .join(", ");
            quote_sql_string(&format!("MultiPolygon({body})"))
        }
        ParamValue::GeoCollection(shapes) => {
            let body = shapes.iter().map(|s| unquote(&to_sql_literal(s))).collect::<Vec<_>>().join(", ");
            quote_sql_string(&format!("Collection({body})"))
        }
    }
}

/// Strips the single-quote SQL-string wrapping `to_sql_literal` applies to
/// every geography shape, so a `Collection` can nest its members' text.
fn unquote(s: &str) -> String {
    s.strip_prefix('\'').and_then(|s| s.strip_suffix('\'')).unwrap_or(s).replace("''", "'")
}

fn join_points(pts: &[crate::value::GeoPoint]) -> String {
    pts.iter().map(|p| format!("{} {}", p.x, p.y)).collect::<Vec<_>>().join(", ")
}

fn quote_sql_string(s: &str) -> String {
    format!("'{}'", s.replace('\'', "''"))
}

fn parse_time_of_day(raw: &str) -> ParseResult<NaiveTime> {
    if raw.contains('.') {
        NaiveTime::parse_from_str(raw, "%H:%M:%S%.f")
    } else {
        NaiveTime::parse_from_str(raw, "%H:%M:%S")
    }
    .map_err(|_| ParseError::invalid_time_of_day(raw))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_calendar_invalid_date() {
        // Lexically well-shaped (YYYY-MM-DD) but not a real date.
        let err = to_param_value(&Literal::Date("2024-02-30".to_string())).unwrap_err();
        assert_eq!(err.props.get("category").map(String::as_str), Some("invalid_date"));
    }

    #[test]
    fn converts_guid() {
        let v = to_param_value(&Literal::Guid("12345678-1234-1234-1234-123456789012".to_string())).unwrap();
        assert!(matches!(v, ParamValue::Guid(_)));
    }

    #[test]
    fn converts_decimal() {
        let v = to_param_value(&Literal::Decimal("12.50".to_string())).unwrap();
        assert!(matches!(v, ParamValue::Decimal(_)));
    }
}
