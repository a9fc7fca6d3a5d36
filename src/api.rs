//! C9 — the three public entry points this crate exposes.

use crate::ast::{QueryOptions, ResourcePath, Spanned};
use crate::error::ParseResult;
use crate::options::CompileOptions;
use crate::parser::{self, Parser};
use crate::render::{self, RenderedQuery};

/// Parses a full OData query-option string (`$filter=...&$select=...`) and
/// renders it to SQL in one step. `table` is the physical table/entity-set
/// name; `fetch` is the list of navigation-property paths to eagerly join
/// in (spec.md §6 `renderQuery` surface).
pub fn create_query(query_string: &str, table: &str, fetch: &[String], options: &CompileOptions) -> ParseResult<RenderedQuery> {
    let parsed = parser::parse_query_options(query_string)?;
    render::render_query_with_parameters(
        &parsed,
        table,
        fetch,
        options.dialect.dialect().as_ref(),
        options.limits(),
        options.use_parameters,
    )
}

/// Parses the full option string without rendering, for callers that want
/// to inspect or further transform the AST before compiling it.
pub fn parse_query(query_string: &str) -> ParseResult<QueryOptions> {
    parser::parse_query_options(query_string)
}

/// Parses a standalone `$filter` expression (no surrounding `$filter=`) and
/// renders it to a bare WHERE-clause fragment plus its parameter map.
pub fn create_filter(
    filter_expr: &str,
    options: &CompileOptions,
) -> ParseResult<(String, indexmap::IndexMap<String, crate::value::ParamValue>)> {
    let ast = parse_filter(filter_expr)?;
    let dialect = options.dialect.dialect();
    let mut visitor = crate::visitor::Visitor::new(dialect.as_ref(), options.limits());
    if !options.use_parameters {
        visitor = visitor.with_parameters_disabled();
    }
    let ctx = crate::visitor::context::Context::root(render::TABLE_TOKEN);
    let sql = visitor.render(&ctx, &ast)?;
    Ok((sql, visitor.alloc.into_map()))
}

/// Parses a standalone `$filter` expression into its AST.
pub fn parse_filter(filter_expr: &str) -> ParseResult<Spanned<crate::ast::Expr>> {
    let mut parser = Parser::new(filter_expr);
    parser.parse_filter_complete()
}

/// Parses a `/Table(...)` resource-path segment.
pub fn parse_resource_path(path: &str) -> ParseResult<ResourcePath> {
    parser::parse_resource_path(path)
}

/// Renders an already-parsed [`QueryOptions`] tree to SQL.
pub fn render_query(parsed: &QueryOptions, table: &str, fetch: &[String], options: &CompileOptions) -> ParseResult<RenderedQuery> {
    render::render_query_with_parameters(
        parsed,
        table,
        fetch,
        options.dialect.dialect().as_ref(),
        options.limits(),
        options.use_parameters,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dialect::DialectKind;

    #[test]
    fn create_query_renders_filter_and_select() {
        let options = CompileOptions::default();
        let rendered = create_query("$filter=Name eq 'Ada'&$select=Name,Age", "People", &[], &options).unwrap();
        assert!(rendered.entries_query.contains("WHERE"));
        assert!(rendered.entries_query.contains("FROM \"People\""));
        assert_eq!(rendered.parameters.len(), 1);
    }

    #[test]
    fn create_filter_renders_bare_where_fragment() {
        let options = CompileOptions::default().with_dialect(DialectKind::SurrealDb);
        let (sql, params) = create_filter("Age gt 18", &options).unwrap();
        assert!(sql.contains("type::field"));
        assert_eq!(params.len(), 2);
    }
}
