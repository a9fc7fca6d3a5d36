use super::{DialectKind, SqlDialect};

/// The baseline dialect: double-quoted identifiers, `LIMIT`/`OFFSET`
/// pagination, every other method uses the trait's ANSI-following default.
pub struct Ansi;

impl SqlDialect for Ansi {
    fn kind(&self) -> DialectKind {
        DialectKind::Ansi
    }
}
