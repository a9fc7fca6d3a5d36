//! Golden SQL snapshots for a representative filter/select/orderby/paginate
//! query rendered once per dialect, so a dialect's emitted shape is pinned
//! and reviewed explicitly on change.

use insta::assert_snapshot;
use odata_compiler::api::create_query;
use odata_compiler::dialect::DialectKind;
use odata_compiler::options::CompileOptions;

const QUERY: &str = "$filter=startswith(Name,'A') and Age gt 18&$select=Name,Age&$orderby=Age desc&$top=10&$skip=5";

fn render(dialect: DialectKind) -> String {
    let options = CompileOptions::default().with_dialect(dialect);
    let rendered = create_query(QUERY, "entities", &[], &options).unwrap();
    rendered.entries_query
}

#[test]
fn ansi_dialect_snapshot() {
    assert_snapshot!(render(DialectKind::Ansi));
}

#[test]
fn mssql_dialect_snapshot() {
    assert_snapshot!(render(DialectKind::MsSql));
}

#[test]
fn mysql_dialect_snapshot() {
    assert_snapshot!(render(DialectKind::MySql));
}

#[test]
fn postgresql_dialect_snapshot() {
    assert_snapshot!(render(DialectKind::PostgreSql));
}

#[test]
fn oracle_dialect_snapshot() {
    assert_snapshot!(render(DialectKind::Oracle));
}

#[test]
fn surrealdb_dialect_snapshot() {
    assert_snapshot!(render(DialectKind::SurrealDb));
}

#[test]
fn surrealdb_in_expression_appends_record_coercion_twins() {
    let options = CompileOptions::default().with_dialect(DialectKind::SurrealDb);
    let rendered = create_query("$filter=Status in ('open','closed')", "entities", &[], &options).unwrap();
    assert_snapshot!(rendered.entries_query);
}
