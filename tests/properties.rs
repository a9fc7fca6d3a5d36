//! Universal invariants (spec.md §8, P1-P7) checked against representative
//! inputs across option orderings, dialects, and literal shapes.

use odata_compiler::api::create_query;
use odata_compiler::dialect::DialectKind;
use odata_compiler::options::CompileOptions;

fn options_for(dialect: DialectKind) -> CompileOptions {
    CompileOptions::default().with_dialect(dialect)
}

const ALL_DIALECTS: [DialectKind; 6] = [
    DialectKind::Ansi,
    DialectKind::MsSql,
    DialectKind::MySql,
    DialectKind::PostgreSql,
    DialectKind::Oracle,
    DialectKind::SurrealDb,
];

/// P1 — every literal value of length >= 3 never appears verbatim in the
/// emitted SQL text, across every dialect. Field names are a separate
/// matter: they legitimately surface, quoted, as identifier text in every
/// clause for the ANSI-family dialects, and as `$select`/`$orderby` output
/// for SurrealDB — neither is a parameterization leak, so this test only
/// checks literal values.
#[test]
fn p1_parameterization_holds_for_every_dialect() {
    for dialect in ALL_DIALECTS {
        let rendered = create_query(
            "$filter=Name eq 'secretvalue' and Age gt 18&$orderby=Name",
            "entities",
            &[],
            &options_for(dialect),
        )
        .unwrap();
        assert!(
            !rendered.entries_query.contains("secretvalue"),
            "{dialect:?} leaked a literal into SQL text"
        );
        let leaked_literals = rendered.parameters.values().any(|v| match v {
            odata_compiler::value::ParamValue::String(s) if s.len() >= 3 => rendered.entries_query.contains(s.as_str()),
            _ => false,
        });
        assert!(!leaked_literals, "{dialect:?} leaked a literal value into SQL text");
    }
}

/// P2 — parameter names are pairwise distinct and each appears in the SQL
/// text at least once.
#[test]
fn p2_parameter_names_are_unique_and_referenced() {
    let rendered = create_query("$filter=A eq 1 and B eq 2 or C eq 3", "entities", &[], &options_for(DialectKind::Ansi)).unwrap();
    let mut seen = std::collections::HashSet::new();
    for name in rendered.parameters.keys() {
        assert!(seen.insert(name.clone()), "duplicate parameter name {name}");
        assert!(
            rendered.entries_query.contains(name.as_str()),
            "parameter {name} never referenced in SQL"
        );
    }
}

/// P3 — bound violations always fail, valid inputs always compile.
#[test]
fn p3_bound_enforcement() {
    assert!(create_query("$top=500", "entities", &[], &options_for(DialectKind::Ansi)).is_ok());
    assert!(create_query("$top=501", "entities", &[], &options_for(DialectKind::Ansi)).is_err());
    assert!(create_query("$skip=1000000", "entities", &[], &options_for(DialectKind::Ansi)).is_ok());
    assert!(create_query("$skip=1000001", "entities", &[], &options_for(DialectKind::Ansi)).is_err());
}

/// P4 — only whitelisted function names compile.
#[test]
fn p4_function_closure() {
    assert!(create_query("$filter=startswith(Name,'a')", "entities", &[], &options_for(DialectKind::Ansi)).is_ok());
    assert!(create_query("$filter=exec(Name)", "entities", &[], &options_for(DialectKind::Ansi)).is_err());
}

/// P5 — `skip`/`limit` round-trip the requested values.
#[test]
fn p5_pagination_round_trips() {
    let rendered = create_query("$top=42&$skip=7", "entities", &[], &options_for(DialectKind::Ansi)).unwrap();
    assert_eq!(rendered.limit, Some(42));
    assert_eq!(rendered.skip, Some(7));
}

/// P6 — permuting top-level option order yields the same structural SQL
/// (identical up to parameter-seed numbering, which is deterministic given
/// a fixed allocation order — so here: identical option order produces
/// identical output, and swapping commutative options leaves the rendered
/// clauses unchanged).
#[test]
fn p6_option_order_independence() {
    let a = create_query("$top=10&$skip=5&$select=Name", "entities", &[], &options_for(DialectKind::Ansi)).unwrap();
    let b = create_query("$select=Name&$skip=5&$top=10", "entities", &[], &options_for(DialectKind::Ansi)).unwrap();
    assert_eq!(a.limit, b.limit);
    assert_eq!(a.skip, b.skip);
    assert_eq!(a.entries_query, b.entries_query);
}

/// P7 — nested `$expand` composes: navigation property names line up at
/// each depth, and each include's parameter names are disjoint from its
/// siblings'.
#[test]
fn p7_expand_composition_and_disjoint_parameter_spaces() {
    let rendered = create_query(
        "$expand=A($filter=X eq 1;$expand=B($filter=Y eq 2)),C($filter=Z eq 3)",
        "entities",
        &[],
        &options_for(DialectKind::Ansi),
    )
    .unwrap();
    assert_eq!(rendered.includes.len(), 2);
    assert_eq!(rendered.includes[0].navigation_property, "A");
    assert_eq!(rendered.includes[1].navigation_property, "C");
    assert_eq!(rendered.includes[0].query.includes[0].navigation_property, "B");

    let a_params: std::collections::HashSet<_> = rendered.includes[0].query.parameters.keys().collect();
    let c_params: std::collections::HashSet<_> = rendered.includes[1].query.parameters.keys().collect();
    assert!(a_params.is_disjoint(&c_params));
}
