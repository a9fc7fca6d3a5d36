//! A single error kind for the whole compiler.
//!
//! Every parse, validation, or lowering failure surfaces as [`ParseError`].
//! This mirrors the teacher's one-`thiserror`-enum-per-subsystem convention,
//! collapsed to the single kind the specification mandates.

use std::collections::HashMap;

/// The sole error type produced by this crate.
#[derive(Debug, Clone, thiserror::Error)]
#[error("{message}")]
pub struct ParseError {
    pub message: String,
    pub position: Option<usize>,
    pub props: HashMap<String, String>,
}

pub type ParseResult<T> = Result<T, ParseError>;

impl ParseError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            position: None,
            props: HashMap::new(),
        }
    }

    #[must_use]
    pub fn at(mut self, position: usize) -> Self {
        self.position = Some(position);
        self
    }

    #[must_use]
    pub fn with_prop(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.props.insert(key.into(), value.into());
        self
    }

    pub fn unknown_option(name: &str) -> Self {
        Self::new(format!("unknown query option: {name}")).with_prop("category", "unknown_option")
    }

    pub fn unhandled_node(kind: &str) -> Self {
        Self::new(format!("unhandled node type: {kind}")).with_prop("category", "unhandled_node")
    }

    pub fn pagination_bound(message: impl Into<String>) -> Self {
        Self::new(message.into()).with_prop("category", "pagination_bound_violated")
    }

    pub fn expansion_limit(message: impl Into<String>) -> Self {
        Self::new(message.into()).with_prop("category", "expansion_limit_violated")
    }

    pub fn parameter_budget(message: impl Into<String>) -> Self {
        Self::new(message.into()).with_prop("category", "parameter_budget_exhausted")
    }

    pub fn search_disabled() -> Self {
        Self::new("$search is disabled").with_prop("category", "search_disabled")
    }

    pub fn invalid_geo_literal(shape: &str) -> Self {
        Self::new(format!("invalid geo literal: {shape}")).with_prop("category", "invalid_geo_literal")
    }

    pub fn invalid_orderby_identifier(name: &str) -> Self {
        Self::new(format!("invalid identifier in ORDER BY: {name}"))
            .with_prop("category", "invalid_identifier_in_orderby")
    }

    pub fn unknown_function(name: &str) -> Self {
        Self::new(format!("unknown or forbidden function: {name}"))
            .with_prop("category", "unknown_function")
    }

    pub fn invalid_guid(raw: &str) -> Self {
        Self::new(format!("invalid GUID literal: {raw}")).with_prop("category", "invalid_guid")
    }

    pub fn invalid_date(raw: &str) -> Self {
        Self::new(format!("invalid date literal: {raw}")).with_prop("category", "invalid_date")
    }

    pub fn invalid_time_of_day(raw: &str) -> Self {
        Self::new(format!("invalid time-of-day literal: {raw}"))
            .with_prop("category", "invalid_time_of_day")
    }

    pub fn invalid_duration(raw: &str) -> Self {
        Self::new(format!("invalid duration literal: {raw}")).with_prop("category", "invalid_duration")
    }

    pub fn invalid_datetimeoffset(raw: &str) -> Self {
        Self::new(format!("invalid date-time-offset literal: {raw}"))
            .with_prop("category", "invalid_datetimeoffset")
    }

    pub fn recursion_limit() -> Self {
        Self::new("recursion limit exceeded while parsing")
            .with_prop("category", "recursion_limit_exceeded")
    }

    pub fn unexpected_eof() -> Self {
        Self::new("unexpected end of input").with_prop("category", "unexpected_eof")
    }

    pub fn trailing_input(position: usize) -> Self {
        Self::new("trailing input after parse")
            .with_prop("category", "trailing_input")
            .at(position)
    }
}
