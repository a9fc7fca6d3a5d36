//! Every input here must raise a `ParseError` rather than compile.

use odata_compiler::api::{create_filter, create_query};
use odata_compiler::options::CompileOptions;

fn ansi() -> CompileOptions {
    CompileOptions::default()
}

#[test]
fn top_above_page_size_bound_is_rejected() {
    assert!(create_query("$top=501", "entities", &[], &ansi()).is_err());
}

#[test]
fn negative_skip_fails_to_parse_as_unsigned() {
    assert!(create_query("$skip=-1", "entities", &[], &ansi()).is_err());
}

#[test]
fn search_rejected_while_disabled() {
    assert!(create_query("$search=x", "entities", &[], &ansi()).is_err());
}

#[test]
fn filter_calling_non_whitelisted_function_is_rejected() {
    assert!(create_filter("exec(Name)", &ansi()).is_err());
}

#[test]
fn filter_referencing_qualified_non_whitelisted_call_is_rejected() {
    assert!(create_filter("session::user() eq 'x'", &ansi()).is_err());
}

#[test]
fn expand_eleven_deep_exceeds_default_depth() {
    let mut expand_value = "A0".to_string();
    for i in 1..12u32 {
        expand_value = format!("A{i}($expand={expand_value})");
    }
    let query = format!("$expand={expand_value}");
    assert!(create_query(&query, "entities", &[], &ansi()).is_err());
}

#[test]
fn expand_eleven_siblings_exceeds_default_count() {
    let siblings: Vec<String> = (0..11).map(|i| format!("Rel{i}")).collect();
    let query = format!("$expand={}", siblings.join(","));
    assert!(create_query(&query, "entities", &[], &ansi()).is_err());
}

#[test]
fn orderby_with_injected_ddl_text_is_rejected() {
    assert!(create_query("$orderby=Name`, DELETE", "entities", &[], &ansi()).is_err() || create_query("$orderby=Name`%2C%20DELETE", "entities", &[], &ansi()).is_err());
}

#[test]
fn malformed_guid_literal_is_rejected() {
    assert!(create_filter("id eq 12345678-1234-1234-1234-1234567890ZZ", &ansi()).is_err());
}

#[test]
fn calendar_invalid_date_literal_is_rejected() {
    assert!(create_filter("date eq 2020-13-01", &ansi()).is_err());
}

#[test]
fn malformed_geography_literal_is_rejected() {
    assert!(create_filter("Location eq geography'Point(BAD)'", &ansi()).is_err());
}

#[test]
fn unknown_query_option_is_rejected() {
    assert!(create_query("$bogus=1", "entities", &[], &ansi()).is_err());
}
