use super::{DialectKind, SqlDialect};

/// PostgreSQL: double-quoted identifiers (the ANSI default already matches),
/// `POSITION`/`EXTRACT` mostly match ANSI too; only a couple of functions
/// and `now()` differ.
pub struct PostgreSql;

impl SqlDialect for PostgreSql {
    fn kind(&self) -> DialectKind {
        DialectKind::PostgreSql
    }

    fn render_function(&self, name: &str, args: &[String]) -> String {
        match (name, args) {
            ("now", []) => "NOW()".to_string(),
            ("concat", args) => format!("CONCAT({})", args.join(", ")),
            ("geo.distance", [a, b]) => format!("ST_Distance({a}::geography, {b}::geography)"),
            ("geo.intersects", [a, b]) => format!("ST_Intersects({a}::geography, {b}::geography)"),
            ("geo.length", [a]) => format!("ST_Length({a}::geography)"),
            _ => crate::functions::render_ansi(name, args),
        }
    }
}
