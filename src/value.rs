//! Literal value types: the EDM type tags and the typed parameter payloads
//! that flow into the parameter map instead of into SQL text.

use bigdecimal::BigDecimal;
use chrono::{DateTime, FixedOffset, NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// OData EDM primitive type tag, closed per spec.md §3.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EdmType {
    String,
    Int32,
    Int64,
    Decimal,
    Double,
    Single,
    Boolean,
    Guid,
    Date,
    DateTimeOffset,
    TimeOfDay,
    Duration,
    GeographyPoint,
    GeographyLineString,
    GeographyPolygon,
    GeographyMultiPoint,
    GeographyMultiLineString,
    GeographyMultiPolygon,
    GeographyCollection,
    Null,
}

impl EdmType {
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            EdmType::String => "Edm.String",
            EdmType::Int32 => "Edm.Int32",
            EdmType::Int64 => "Edm.Int64",
            EdmType::Decimal => "Edm.Decimal",
            EdmType::Double => "Edm.Double",
            EdmType::Single => "Edm.Single",
            EdmType::Boolean => "Edm.Boolean",
            EdmType::Guid => "Edm.Guid",
            EdmType::Date => "Edm.Date",
            EdmType::DateTimeOffset => "Edm.DateTimeOffset",
            EdmType::TimeOfDay => "Edm.TimeOfDay",
            EdmType::Duration => "Edm.Duration",
            EdmType::GeographyPoint => "Edm.GeographyPoint",
            EdmType::GeographyLineString => "Edm.GeographyLineString",
            EdmType::GeographyPolygon => "Edm.GeographyPolygon",
            EdmType::GeographyMultiPoint => "Edm.GeographyMultiPoint",
            EdmType::GeographyMultiLineString => "Edm.GeographyMultiLineString",
            EdmType::GeographyMultiPolygon => "Edm.GeographyMultiPolygon",
            EdmType::GeographyCollection => "Edm.GeographyCollection",
            EdmType::Null => "null",
        }
    }
}

/// A geography coordinate pair.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub x: f64,
    pub y: f64,
}

/// A typed literal value. Everything that would otherwise be spliced into
/// SQL text lives here instead, and is referenced from emitted SQL only by
/// a generated parameter name (invariant I1).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ParamValue {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Decimal(BigDecimal),
    String(String),
    Guid(Uuid),
    Date(NaiveDate),
    DateTimeOffset(DateTime<FixedOffset>),
    TimeOfDay(NaiveTime),
    /// ISO-8601 duration, kept as its canonical string form.
    Duration(String),
    GeoPoint(GeoPoint),
    GeoLineString(Vec<GeoPoint>),
    GeoPolygon(Vec<Vec<GeoPoint>>),
    GeoMultiPoint(Vec<GeoPoint>),
    GeoMultiLineString(Vec<Vec<GeoPoint>>),
    GeoMultiPolygon(Vec<Vec<Vec<GeoPoint>>>),
    /// `geography'Collection(...)'` — a heterogeneous bag of the other
    /// geography shapes, stored as their already-converted payloads.
    GeoCollection(Vec<ParamValue>),
    /// A raw identifier/field name, used only by the SurrealDB dialect's
    /// `type::field($fieldN)` / ORDER-BY-exempt parameterization scheme.
    FieldName(String),
}

impl ParamValue {
    /// True for values whose textual form, if it leaked into SQL, would be
    /// worth asserting absent in P1 property tests (length >= 3 strings).
    #[must_use]
    pub fn stringish(&self) -> Option<&str> {
        match self {
            ParamValue::String(s) | ParamValue::FieldName(s) => Some(s.as_str()),
            _ => None,
        }
    }
}
