use super::{DialectKind, SqlDialect};

/// Oracle: double-quoted identifiers, `FETCH FIRST .. ROWS ONLY` pagination,
/// `INSTR`/`SYSTIMESTAMP`.
pub struct Oracle;

impl SqlDialect for Oracle {
    fn kind(&self) -> DialectKind {
        DialectKind::Oracle
    }

    fn render_pagination(&self, top: Option<&str>, skip: Option<&str>) -> String {
        let mut clauses = Vec::new();
        if let Some(s) = skip {
            clauses.push(format!("OFFSET {s} ROWS"));
        }
        if let Some(t) = top {
            clauses.push(format!("FETCH NEXT {t} ROWS ONLY"));
        }
        clauses.join(" ")
    }

    fn render_function(&self, name: &str, args: &[String]) -> String {
        match (name, args) {
            ("length", [s]) => format!("LENGTH({s})"),
            ("indexof", [haystack, needle]) => format!("(INSTR({haystack}, {needle}) - 1)"),
            ("substring", [s, start]) => format!("SUBSTR({s}, {start} + 1)"),
            ("substring", [s, start, len]) => format!("SUBSTR({s}, {start} + 1, {len})"),
            ("now", []) => "SYSTIMESTAMP".to_string(),
            ("ceiling", [n]) => format!("CEIL({n})"),
            _ => crate::functions::render_ansi(name, args),
        }
    }
}
