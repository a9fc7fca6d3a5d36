use super::{DialectKind, SqlDialect};

/// SQL Server: bracketed identifiers, `OFFSET .. FETCH NEXT`, `CHARINDEX`/`LEN`.
pub struct MsSql;

impl SqlDialect for MsSql {
    fn kind(&self) -> DialectKind {
        DialectKind::MsSql
    }

    fn quote_identifier(&self, name: &str) -> String {
        format!("[{}]", name.replace(']', "]]"))
    }

    fn render_pagination(&self, top: Option<&str>, skip: Option<&str>) -> String {
        let skip = skip.unwrap_or("0");
        match top {
            Some(t) => format!("OFFSET {skip} ROWS FETCH NEXT {t} ROWS ONLY"),
            None => format!("OFFSET {skip} ROWS"),
        }
    }

    fn render_function(&self, name: &str, args: &[String]) -> String {
        match (name, args) {
            ("length", [s]) => format!("LEN({s})"),
            ("indexof", [haystack, needle]) => format!("(CHARINDEX({needle}, {haystack}) - 1)"),
            ("substring", [s, start]) => format!("SUBSTRING({s}, {start} + 1, LEN({s}))"),
            ("substring", [s, start, len]) => format!("SUBSTRING({s}, {start} + 1, {len})"),
            ("concat", args) => format!("CONCAT({})", args.join(", ")),
            ("now", []) => "SYSDATETIMEOFFSET()".to_string(),
            ("ceiling", [n]) => format!("CEILING({n})"),
            _ => crate::functions::render_ansi(name, args),
        }
    }
}
