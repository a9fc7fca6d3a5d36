//! Compiles OData V4 query-option strings (`$filter`, `$select`,
//! `$orderby`, `$expand`, ...) into parameterized, dialect-specific SQL.
//!
//! Every user-supplied literal or identifier is lowered to a named
//! parameter rather than spliced into the generated SQL text (invariant
//! I1); see [`api`] for the entry points and [`dialect`] for the six
//! supported SQL targets.

pub mod api;
pub mod ast;
pub mod dialect;
pub mod error;
pub mod functions;
pub mod lexer;
pub mod limits;
pub mod literal;
pub mod options;
pub mod parser;
pub mod render;
pub mod source;
pub mod value;
pub mod visitor;

pub mod prelude {
    pub use crate::api::{create_filter, create_query, parse_filter, parse_query, parse_resource_path, render_query};
    pub use crate::ast::{Expr, QueryOptions};
    pub use crate::dialect::DialectKind;
    pub use crate::error::{ParseError, ParseResult};
    pub use crate::options::CompileOptions;
    pub use crate::render::RenderedQuery;
    pub use crate::value::ParamValue;
}
