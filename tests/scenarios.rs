//! Concrete input → output scenarios against the SurrealDB dialect.

use odata_compiler::api::create_query;
use odata_compiler::dialect::DialectKind;
use odata_compiler::options::CompileOptions;
use odata_compiler::value::ParamValue;

fn surreal() -> CompileOptions {
    CompileOptions::default().with_dialect(DialectKind::SurrealDb)
}

#[test]
fn bare_equality_parameterizes_field_and_literal() {
    let rendered = create_query("$filter=value eq 123", "entities", &[], &surreal()).unwrap();
    assert!(rendered.entries_query.contains("type::field($field2) = $literal3"));
    assert_eq!(
        rendered.parameters.get("field2"),
        Some(&ParamValue::FieldName("value".to_string()))
    );
    assert_eq!(rendered.parameters.get("literal3"), Some(&ParamValue::Int(123)));
}

#[test]
fn and_of_two_comparisons_uses_double_ampersand_and_parens() {
    let rendered = create_query("$filter=Name eq 'John' and Age gt 18", "entities", &[], &surreal()).unwrap();
    assert!(rendered.entries_query.contains(" && "));
    assert!(rendered.entries_query.contains("type::field("));
    assert_eq!(rendered.parameters.len(), 5);
}

#[test]
fn startswith_lowers_to_surrealql_builtin() {
    let rendered = create_query("$filter=startswith(Name, 'J')", "entities", &[], &surreal()).unwrap();
    assert!(rendered.entries_query.contains("string::starts_with(type::field("));
}

#[test]
fn top_skip_count_select_orderby_populate_every_field() {
    let rendered = create_query("$top=10&$skip=5&$count=true&$select=id,label&$orderby=id desc", "entities", &[], &surreal()).unwrap();
    assert_eq!(rendered.limit, Some(10));
    assert_eq!(rendered.skip, Some(5));
    assert!(rendered.count_query.is_some());
    assert!(rendered.entries_query.contains("AS `id`"));
    assert!(rendered.entries_query.contains("AS `label`"));
    assert!(rendered.entries_query.contains("ORDER BY `id` DESC"));
    assert!(rendered.entries_query.contains("LIMIT"));
    assert!(rendered.entries_query.contains("START"));
}

#[test]
fn expand_with_nested_options_produces_one_include() {
    let rendered = create_query("$expand=Friends($filter=Age gt 18;$select=Name;$top=5)", "entities", &[], &surreal()).unwrap();
    assert_eq!(rendered.includes.len(), 1);
    let include = &rendered.includes[0];
    assert_eq!(include.navigation_property, "Friends");
    assert_eq!(include.query.limit, Some(5));
    assert!(include.query.entries_query.contains(">"));
    assert!(include.query.entries_query.contains("AS `Name`") || include.query.entries_query.contains("AS \"Name\""));
}

#[test]
fn sql_injection_attempt_never_appears_verbatim() {
    let rendered = create_query("$filter=Name eq 'OR 1=1 --'", "entities", &[], &surreal()).unwrap();
    assert!(!rendered.entries_query.contains("OR 1=1"));
    let found = rendered
        .parameters
        .values()
        .any(|v| matches!(v, ParamValue::String(s) if s == "OR 1=1 --"));
    assert!(found);
}
