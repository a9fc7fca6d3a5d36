//! C6/C7 dialect seam — one `SqlDialect` trait with an ANSI-default method
//! body per operation, overridden only where a dialect actually differs.
//! This is the polymorphic-visitor-without-inheritance shape: dispatch is
//! a `&dyn SqlDialect` trait object, never a dynamic "visit" + type-name
//! lookup (REDESIGN FLAGS, spec.md §9).

mod ansi;
mod mssql;
mod mysql;
mod oracle;
mod postgresql;
mod surrealdb;

pub use ansi::Ansi;
pub use mssql::MsSql;
pub use mysql::MySql;
pub use oracle::Oracle;
pub use postgresql::PostgreSql;
pub use surrealdb::SurrealDb;

use crate::ast::CompareOp;
use crate::functions;

/// Which dialect a compile targets (`crate::options::CompileOptions::dialect`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum DialectKind {
    Ansi,
    MsSql,
    MySql,
    PostgreSql,
    Oracle,
    SurrealDb,
}

impl DialectKind {
    #[must_use]
    pub fn dialect(self) -> Box<dyn SqlDialect> {
        match self {
            DialectKind::Ansi => Box::new(Ansi),
            DialectKind::MsSql => Box::new(MsSql),
            DialectKind::MySql => Box::new(MySql),
            DialectKind::PostgreSql => Box::new(PostgreSql),
            DialectKind::Oracle => Box::new(Oracle),
            DialectKind::SurrealDb => Box::new(SurrealDb),
        }
    }
}

/// Per-dialect SQL rendering surface. Every method has an ANSI-following
/// default; a dialect module overrides only the methods where its SQL
/// actually diverges.
pub trait SqlDialect {
    fn kind(&self) -> DialectKind;

    /// Quotes a bare identifier for use as a table/column reference.
    fn quote_identifier(&self, name: &str) -> String {
        format!("\"{}\"", name.replace('"', "\"\""))
    }

    /// The placeholder token referencing an allocated parameter name, e.g.
    /// `$literal3`. Parameter names themselves are dialect-neutral; callers
    /// translate this token into their driver's native bind syntax.
    fn param_token(&self, name: &str) -> String {
        format!("${name}")
    }

    /// Placeholder for a parameterized *field name* reference in a WHERE
    /// clause (SurrealDB's `type::field(...)`; every other dialect just
    /// emits the bare placeholder since the field name was already quoted
    /// as an identifier at the call site).
    fn field_param_token(&self, name: &str) -> String {
        self.param_token(name)
    }

    /// Placeholder for a parameterized table name (SurrealDB's
    /// `type::table(...)`).
    fn table_param_token(&self, name: &str) -> String {
        self.param_token(name)
    }

    /// Whether property/navigation-path identifiers are parameterized at
    /// all. False for the five ANSI-family dialects — a `WHERE`/`SELECT`/
    /// `GROUP BY` identifier there is quoted SQL text spliced straight into
    /// the accumulator, never a bind value, since no driver binds a column
    /// name through a parameter placeholder. True only for SurrealDB, whose
    /// `type::field($fieldN)` scheme is the sole dialect that parameterizes
    /// identifiers at all (invariant I1 applies to it, not to the rest).
    fn identifiers_are_parameterized(&self) -> bool {
        false
    }

    /// Renders the `FROM` target: a literal quoted table name for the
    /// ANSI-family dialects, `type::table($table)` for SurrealDB. `table` is
    /// the already-allocated parameter name backing the table value (only
    /// used by dialects where [`Self::identifiers_are_parameterized`] is
    /// true); `table_name` is the raw table string for direct quoting.
    fn render_table_reference(&self, table_name: &str, table_param: &str) -> String {
        let _ = table_param;
        self.quote_identifier(table_name)
    }

    /// Placeholder for a parameterized string literal when it needs to be
    /// disambiguated from other uses of the same parameter name (SurrealDB's
    /// `type::string(...)`).
    fn string_literal_token(&self, name: &str) -> String {
        self.param_token(name)
    }

    fn compare_operator(&self, op: CompareOp) -> &'static str {
        match op {
            CompareOp::Eq => "=",
            CompareOp::Ne => "<>",
            CompareOp::Lt => "<",
            CompareOp::Le => "<=",
            CompareOp::Gt => ">",
            CompareOp::Ge => ">=",
        }
    }

    /// Renders a comparison. `string_literal_param` is `Some(name)` when the
    /// right-hand side is a bare string literal parameter (not yet wrapped
    /// by [`Self::string_literal_token`]) — SurrealDB needs the raw name to
    /// build its string-or-record-id disjunction; every other dialect
    /// ignores it and uses `right_rendered` as-is.
    fn render_compare(
        &self,
        op: CompareOp,
        left: &str,
        right_rendered: &str,
        string_literal_param: Option<&str>,
    ) -> String {
        let _ = string_literal_param;
        format!("{left} {} {right_rendered}", self.compare_operator(op))
    }

    fn and_keyword(&self) -> &'static str {
        "AND"
    }

    fn or_keyword(&self) -> &'static str {
        "OR"
    }

    /// Wraps a logical AND/OR/NOT subexpression in parentheses. ANSI-family
    /// dialects rely on operator precedence; SurrealDB's grammar requires
    /// every logical binary operand to be explicitly parenthesized.
    fn wrap_logical(&self, rendered: String) -> String {
        rendered
    }

    /// Renders a `not` expression. SurrealQL spells this `!(expr)` rather
    /// than `NOT expr`.
    fn render_not(&self, inner: &str) -> String {
        format!("NOT {inner}")
    }

    /// The open/close brackets around an `in […]` value list. SurrealQL
    /// uses square brackets; every other dialect here uses parens.
    fn in_list_brackets(&self) -> (&'static str, &'static str) {
        ("(", ")")
    }

    /// Renders the comma-joined contents of an `in (...)` list. Each item
    /// carries the parameter name it was allocated under when it is a bare
    /// string literal (`None` otherwise) so SurrealDB can append its
    /// record-coercion twin entry per item.
    fn render_in_list(&self, items: &[(String, Option<String>)]) -> String {
        items.iter().map(|(rendered, _)| rendered.clone()).collect::<Vec<_>>().join(", ")
    }

    fn render_function(&self, name: &str, args: &[String]) -> String {
        functions::render_ansi(name, args)
    }

    /// `LIMIT`/`OFFSET`-equivalent pagination clause, given the already
    /// rendered parameter tokens for top and skip (when present).
    fn render_pagination(&self, top: Option<&str>, skip: Option<&str>) -> String {
        match (top, skip) {
            (Some(t), Some(s)) => format!("LIMIT {t} OFFSET {s}"),
            (Some(t), None) => format!("LIMIT {t}"),
            (None, Some(s)) => format!("OFFSET {s}"),
            (None, None) => String::new(),
        }
    }
}
