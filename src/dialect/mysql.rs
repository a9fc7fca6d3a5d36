use super::{DialectKind, SqlDialect};

/// MySQL: backtick identifiers, `LIMIT .. OFFSET`, `LOCATE`/`CHAR_LENGTH`.
pub struct MySql;

impl SqlDialect for MySql {
    fn kind(&self) -> DialectKind {
        DialectKind::MySql
    }

    fn quote_identifier(&self, name: &str) -> String {
        format!("`{}`", name.replace('`', "``"))
    }

    fn render_function(&self, name: &str, args: &[String]) -> String {
        match (name, args) {
            ("indexof", [haystack, needle]) => format!("(LOCATE({needle}, {haystack}) - 1)"),
            ("substring", [s, start]) => format!("SUBSTRING({s}, {start} + 1)"),
            ("substring", [s, start, len]) => format!("SUBSTRING({s}, {start} + 1, {len})"),
            ("concat", args) => format!("CONCAT({})", args.join(", ")),
            ("now", []) => "NOW()".to_string(),
            ("fractionalseconds", [d]) => format!("(MICROSECOND({d}) / 1000000.0)"),
            _ => crate::functions::render_ansi(name, args),
        }
    }
}
