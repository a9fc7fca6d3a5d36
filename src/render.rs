//! C7 — turns a parsed [`QueryOptions`] tree into SQL text, recursing into
//! `$expand` includes and enforcing the limits envelope (C8) along the way.

use indexmap::IndexMap;

use crate::ast::{ExpandItem, OrderByItem, QueryOptions, SelectItem};
use crate::dialect::SqlDialect;
use crate::error::ParseResult;
use crate::limits::Limits;
use crate::value::ParamValue;
use crate::visitor::context::{Context, ParamAllocator};
use crate::visitor::Visitor;

/// Placeholder root-entity self-reference for call sites that render a bare
/// `$filter` fragment with no `FROM` clause of its own (`crate::api::create_filter`)
/// and so have no real table name to resolve `$it` against.
pub const TABLE_TOKEN: &str = "$table";

#[derive(Debug, Clone)]
pub struct RenderedQuery {
    pub entries_query: String,
    pub count_query: Option<String>,
    pub parameters: IndexMap<String, ParamValue>,
    pub skip: Option<u64>,
    pub limit: Option<u64>,
    pub includes: Vec<RenderedInclude>,
}

impl RenderedQuery {
    /// Returns a copy of `parameters` with any leading `$` stripped from
    /// every key, for drivers whose bind-parameter syntax forbids it. The
    /// SQL text in `entries_query`/`count_query` is unaffected — it keeps
    /// referencing the `$`-prefixed placeholder names, since translating to
    /// driver-native bind syntax is the caller's job, not this crate's.
    ///
    /// `parameters`' own keys are already bare (`"literal1"`, not
    /// `"$literal1"`) — only [`crate::dialect::SqlDialect::param_token`]
    /// adds the `$` when generating SQL text — so this is effectively
    /// already satisfied; the method exists so callers have one stable name
    /// to call regardless of that implementation detail.
    #[must_use]
    pub fn stripped_parameters(&self) -> IndexMap<String, ParamValue> {
        self.parameters
            .iter()
            .map(|(k, v)| (k.trim_start_matches('$').to_string(), v.clone()))
            .collect()
    }
}

#[derive(Debug, Clone)]
pub struct RenderedInclude {
    pub navigation_property: String,
    pub query: RenderedQuery,
}

/// Renders a complete query from scratch: a fresh parameter sequence
/// starting at 1, shared across the top-level query and every `$expand`
/// include it contains. `table` is the physical table/entity-set name this
/// query targets; `fetch` is the list of navigation-property paths to
/// eagerly join in (SurrealDB's `FETCH` clause — spec.md §4.4; every other
/// dialect accepts and ignores it, since ANSI SQL has no equivalent single
/// clause and expects joins to be modeled through `$expand` instead).
pub fn render_query(options: &QueryOptions, table: &str, fetch: &[String], dialect: &dyn SqlDialect, limits: Limits) -> ParseResult<RenderedQuery> {
    render_query_with_parameters(options, table, fetch, dialect, limits, true)
}

/// As [`render_query`], but lets the caller opt out of parameterization
/// (`CompileOptions::use_parameters = false`), inlining literals as
/// SQL-escaped text instead. Only meant for uniform testing against known
/// input, never untrusted input.
pub fn render_query_with_parameters(
    options: &QueryOptions,
    table: &str,
    fetch: &[String],
    dialect: &dyn SqlDialect,
    limits: Limits,
    use_parameters: bool,
) -> ParseResult<RenderedQuery> {
    let alloc = ParamAllocator::new();
    render_with_allocator(options, table, fetch, dialect, limits, alloc, 0, use_parameters)
}

#[allow(clippy::too_many_arguments)]
fn render_with_allocator(
    options: &QueryOptions,
    table: &str,
    fetch: &[String],
    dialect: &dyn SqlDialect,
    limits: Limits,
    alloc: ParamAllocator,
    depth: u32,
    use_parameters: bool,
) -> ParseResult<RenderedQuery> {
    let own_start = alloc.len();
    limits.check_expand_depth(depth)?;
    if let Some(top) = options.top {
        limits.check_top(top)?;
    }
    if let Some(skip) = options.skip {
        limits.check_skip(skip)?;
    }
    if options.search.is_some() {
        limits.check_search()?;
    }

    let mut visitor = Visitor::with_allocator(dialect, limits, alloc.clone());
    if !use_parameters {
        visitor = visitor.with_parameters_disabled();
    }

    let table_ref = if dialect.identifiers_are_parameterized() {
        let name = alloc.alloc("table", ParamValue::FieldName(table.to_string()));
        dialect.render_table_reference(table, &name)
    } else {
        dialect.render_table_reference(table, "")
    };
    let ctx = Context::root(table_ref.clone());

    let mut select_clause = render_select(&visitor, options.select.as_deref());
    let where_clause = options.filter.as_ref().map(|f| visitor.render(&ctx, f)).transpose()?;
    let orderby_clause = render_orderby(&visitor, options.orderby.as_deref());
    let groupby_clause = render_groupby(&visitor, options.groupby.as_deref());

    let top_token = options
        .top
        .map(|t| dialect.param_token(&alloc.alloc("param", ParamValue::Int(t as i64))));
    let skip_token = options
        .skip
        .map(|s| dialect.param_token(&alloc.alloc("param", ParamValue::Int(s as i64))));
    let pagination = dialect.render_pagination(top_token.as_deref(), skip_token.as_deref());

    let fetch_clause = render_fetch_clause(&visitor, fetch);

    // Per-clause defaults are always filled so the composed query has a
    // stable shape regardless of which options were supplied.
    let where_text = where_clause.clone().unwrap_or_else(|| "1 = 1".to_string());
    let orderby_text = orderby_clause.clone().unwrap_or_else(|| "1".to_string());

    let mut includes = Vec::new();
    if let Some(expand) = &options.expand {
        limits.check_expand_count(expand.len())?;
        for item in expand {
            let nav_prop = item.path.last().cloned().unwrap_or_default();
            select_clause.push_str(&format!(", {}", render_expand_select_fragment(&visitor, &nav_prop, item.options.select.as_deref())));
            includes.push(render_include(item, fetch, dialect, limits, &alloc, depth + 1, use_parameters)?);
        }
    }

    let mut entries_query = format!("SELECT {select_clause} FROM {table_ref} WHERE {where_text}");
    if let Some(g) = &groupby_clause {
        entries_query.push_str(&format!(" GROUP BY {g}"));
    }
    entries_query.push_str(&format!(" ORDER BY {orderby_text}"));
    if !pagination.is_empty() {
        entries_query.push(' ');
        entries_query.push_str(&pagination);
    }
    if let Some(f) = &fetch_clause {
        entries_query.push_str(&format!(" FETCH {f}"));
    }

    let count_query = options
        .count
        .unwrap_or(false)
        .then(|| format!("SELECT COUNT(*) FROM {table_ref} WHERE {where_text}"));

    limits.check_parameter_budget(alloc.len())?;

    Ok(RenderedQuery {
        entries_query,
        count_query,
        parameters: alloc.snapshot_from(own_start),
        skip: options.skip,
        limit: options.top,
        includes,
    })
}

fn render_include(
    item: &ExpandItem,
    fetch: &[String],
    dialect: &dyn SqlDialect,
    limits: Limits,
    alloc: &ParamAllocator,
    depth: u32,
    use_parameters: bool,
) -> ParseResult<RenderedInclude> {
    let nested = QueryOptions {
        filter: item.options.filter.clone(),
        select: item.options.select.clone(),
        orderby: item.options.orderby.clone(),
        groupby: None,
        top: item.options.top,
        skip: item.options.skip,
        count: item.options.count,
        expand: item.options.expand.clone(),
        format: None,
        skiptoken: None,
        search: None,
        id: None,
    };
    // The nav-property's own related table isn't modeled (this compiler has
    // no entity model to resolve it from), so the include's FROM clause
    // targets the navigation-property name itself — callers wire the real
    // related-table name in their own layer once they resolve it.
    let related_table = item.path.last().cloned().unwrap_or_default();
    let query = render_with_allocator(&nested, &related_table, fetch, dialect, limits, alloc.clone(), depth, use_parameters)?;
    Ok(RenderedInclude {
        navigation_property: item.path.last().cloned().unwrap_or_default(),
        query,
    })
}

fn render_select(visitor: &Visitor<'_>, select: Option<&[SelectItem]>) -> String {
    let Some(items) = select else {
        return "*".to_string();
    };
    if items.is_empty() || items.iter().any(|i| matches!(i, SelectItem::Star)) {
        return "*".to_string();
    }
    items
        .iter()
        .map(|item| match item {
            SelectItem::Star => unreachable!("handled above"),
            SelectItem::Path(path) => {
                let token = visitor.render_identifier_ref_with_prefix(path.join("."), "select");
                let alias = visitor.dialect.quote_identifier(path.last().expect("select path is non-empty"));
                format!("{token} AS {alias}")
            }
        })
        .collect::<Vec<_>>()
        .join(", ")
}

/// Every dialect renders `ORDER BY` identifiers inline, quoted directly —
/// the ANSI family by the general identifier rule, SurrealDB because its
/// `ORDER BY` grammar does not accept a `type::field(...)` call (the sole
/// SurrealDB-specific exception to its own parameterization scheme).
fn render_orderby(visitor: &Visitor<'_>, orderby: Option<&[OrderByItem]>) -> Option<String> {
    let items = orderby?;
    if items.is_empty() {
        return None;
    }
    Some(
        items
            .iter()
            .map(|item| {
                let ident = item.path.iter().map(|seg| visitor.dialect.quote_identifier(seg)).collect::<Vec<_>>().join(".");
                if item.desc {
                    format!("{ident} DESC")
                } else {
                    format!("{ident} ASC")
                }
            })
            .collect::<Vec<_>>()
            .join(", "),
    )
}

fn render_groupby(visitor: &Visitor<'_>, groupby: Option<&[Vec<String>]>) -> Option<String> {
    let items = groupby?;
    if items.is_empty() {
        return None;
    }
    Some(
        items
            .iter()
            .map(|path| visitor.render_identifier_ref(path.join(".")))
            .collect::<Vec<_>>()
            .join(", "),
    )
}

/// Renders the `FETCH type::field($fetch1), ...` clause (spec.md §4.4,
/// SurrealDB template) from the `fetch` navigation-path list passed to
/// `renderQuery`. SurrealDB-only: every ANSI-family dialect has no single
/// clause for eager-loading a navigation property — the `$expand` select
/// splicing above is how those dialects join in related data — so `fetch`
/// is accepted and silently ignored there.
fn render_fetch_clause(visitor: &Visitor<'_>, fetch: &[String]) -> Option<String> {
    if fetch.is_empty() || !visitor.dialect.identifiers_are_parameterized() {
        return None;
    }
    Some(
        fetch
            .iter()
            .map(|path| visitor.render_identifier_ref_with_prefix(path.clone(), "fetch"))
            .collect::<Vec<_>>()
            .join(", "),
    )
}

/// Computes the `, <navProp>.<childSelect>` fragment spliced onto the root
/// `$select` list for one `$expand` include (spec.md §4.4 "expand lowering").
fn render_expand_select_fragment(visitor: &Visitor<'_>, nav_prop: &str, select: Option<&[SelectItem]>) -> String {
    let wildcard = || format!("{}.*", visitor.dialect.quote_identifier(nav_prop));
    let Some(items) = select else {
        return wildcard();
    };
    if items.is_empty() || items.iter().any(|i| matches!(i, SelectItem::Star)) {
        return wildcard();
    }
    items
        .iter()
        .map(|item| match item {
            SelectItem::Star => unreachable!("handled above"),
            SelectItem::Path(path) => {
                let full_path = format!("{nav_prop}.{}", path.join("."));
                let token = visitor.render_identifier_ref_with_prefix(full_path, "select");
                let alias = visitor.dialect.quote_identifier(path.last().expect("select path is non-empty"));
                format!("{token} AS {alias}")
            }
        })
        .collect::<Vec<_>>()
        .join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::{CompareOp, Expr, PathSegment, Spanned};
    use crate::dialect::Ansi;
    use crate::source::Span;

    fn spanned(node: Expr) -> Spanned<Expr> {
        Spanned::new(node, Span::new(0, 0))
    }

    #[test]
    fn select_and_filter_quote_identifiers_inline_for_ansi_family() {
        let options = QueryOptions {
            select: Some(vec![SelectItem::Path(vec!["name".into()])]),
            filter: Some(spanned(Expr::Compare(
                CompareOp::Eq,
                Box::new(spanned(Expr::Path(vec![PathSegment::Identifier("age".into())]))),
                Box::new(spanned(Expr::Literal(crate::ast::Literal::Int32(5)))),
            ))),
            ..Default::default()
        };
        let rendered = render_query(&options, "orders", &[], &Ansi, Limits::default()).unwrap();
        assert!(rendered.entries_query.contains("SELECT \"name\" AS \"name\" FROM \"orders\""));
        assert!(rendered.entries_query.contains("WHERE \"age\" = $literal1"));
        assert_eq!(rendered.parameters.len(), 1);
    }

    #[test]
    fn top_above_page_size_is_rejected() {
        let options = QueryOptions {
            top: Some(5000),
            ..Default::default()
        };
        assert!(render_query(&options, "orders", &[], &Ansi, Limits::default()).is_err());
    }

    #[test]
    fn where_and_orderby_default_when_absent() {
        let options = QueryOptions::default();
        let rendered = render_query(&options, "orders", &[], &Ansi, Limits::default()).unwrap();
        assert!(rendered.entries_query.contains("WHERE 1 = 1"));
        assert!(rendered.entries_query.contains("ORDER BY 1"));
    }

    #[test]
    fn eq_against_null_rewrites_to_is_null() {
        let options = QueryOptions {
            filter: Some(spanned(Expr::Compare(
                CompareOp::Eq,
                Box::new(spanned(Expr::Path(vec![PathSegment::Identifier("age".into())]))),
                Box::new(spanned(Expr::Literal(crate::ast::Literal::Null))),
            ))),
            ..Default::default()
        };
        let rendered = render_query(&options, "orders", &[], &Ansi, Limits::default()).unwrap();
        assert!(rendered.entries_query.contains("IS NULL"));
        assert!(!rendered.entries_query.contains("IS NOT NULL"));
    }

    #[test]
    fn ne_against_null_rewrites_to_is_not_null() {
        let options = QueryOptions {
            filter: Some(spanned(Expr::Compare(
                CompareOp::Ne,
                Box::new(spanned(Expr::Path(vec![PathSegment::Identifier("age".into())]))),
                Box::new(spanned(Expr::Literal(crate::ast::Literal::Null))),
            ))),
            ..Default::default()
        };
        let rendered = render_query(&options, "orders", &[], &Ansi, Limits::default()).unwrap();
        assert!(rendered.entries_query.contains("IS NOT NULL"));
    }

    #[test]
    fn disabling_parameters_inlines_literals() {
        let options = QueryOptions {
            filter: Some(spanned(Expr::Compare(
                CompareOp::Eq,
                Box::new(spanned(Expr::Path(vec![PathSegment::Identifier("name".into())]))),
                Box::new(spanned(Expr::Literal(crate::ast::Literal::String("O'Brien".to_string())))),
            ))),
            ..Default::default()
        };
        let rendered = render_query_with_parameters(&options, "orders", &[], &Ansi, Limits::default(), false).unwrap();
        assert!(rendered.entries_query.contains("'O''Brien'"));
        assert!(rendered.parameters.values().all(|v| !matches!(v, ParamValue::String(_))));
    }

    #[test]
    fn stripped_parameters_strips_any_leading_dollar() {
        let options = QueryOptions {
            filter: Some(spanned(Expr::Compare(
                CompareOp::Eq,
                Box::new(spanned(Expr::Path(vec![PathSegment::Identifier("age".into())]))),
                Box::new(spanned(Expr::Literal(crate::ast::Literal::Int32(5)))),
            ))),
            ..Default::default()
        };
        let rendered = render_query(&options, "orders", &[], &Ansi, Limits::default()).unwrap();
        let stripped = rendered.stripped_parameters();
        assert!(stripped.keys().all(|k| !k.starts_with('$')));
        assert_eq!(stripped.len(), rendered.parameters.len());
    }

    #[test]
    fn expand_depth_beyond_limit_is_rejected() {
        fn nest(depth: u32) -> ExpandItem {
            let mut opts = crate::ast::ExpandOptions::default();
            if depth > 0 {
                opts.expand = Some(vec![nest(depth - 1)]);
            }
            ExpandItem {
                path: vec!["child".into()],
                options: opts,
            }
        }
        let options = QueryOptions {
            expand: Some(vec![nest(6)]),
            ..Default::default()
        };
        assert!(render_query(&options, "orders", &[], &Ansi, Limits::default()).is_err());
    }

    #[test]
    fn expand_splices_child_select_into_root_select_clause() {
        let options = QueryOptions {
            select: Some(vec![SelectItem::Path(vec!["name".into()])]),
            expand: Some(vec![ExpandItem {
                path: vec!["orderLines".into()],
                options: crate::ast::ExpandOptions {
                    select: Some(vec![SelectItem::Path(vec!["quantity".into()])]),
                    ..Default::default()
                },
            }]),
            ..Default::default()
        };
        let rendered = render_query(&options, "orders", &[], &Ansi, Limits::default()).unwrap();
        assert!(rendered.entries_query.contains("SELECT \"name\" AS \"name\", \"orderLines\".\"quantity\" AS \"quantity\""));
        assert_eq!(rendered.includes.len(), 1);
        assert_eq!(rendered.includes[0].navigation_property, "orderLines");
    }

    #[test]
    fn surrealdb_fetch_clause_is_appended() {
        let options = QueryOptions::default();
        let rendered =
            render_query(&options, "orders", &["orderLines".to_string()], &crate::dialect::SurrealDb, Limits::default()).unwrap();
        assert!(rendered.entries_query.contains("FETCH type::field($fetch"));
    }

    #[test]
    fn ansi_family_ignores_fetch_parameter() {
        let options = QueryOptions::default();
        let rendered = render_query(&options, "orders", &["orderLines".to_string()], &Ansi, Limits::default()).unwrap();
        assert!(!rendered.entries_query.contains("FETCH"));
    }

    #[test]
    fn surrealdb_from_clause_uses_type_table() {
        let options = QueryOptions::default();
        let rendered = render_query(&options, "orders", &[], &crate::dialect::SurrealDb, Limits::default()).unwrap();
        assert!(rendered.entries_query.contains("FROM type::table($table1)"));
    }
}
