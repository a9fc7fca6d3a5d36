//! Compile-time configuration: which dialect to target and how to bound the
//! limits envelope (C8). Mirrors the teacher's settings-struct-with-serde
//! convention so options can be loaded from a config file or environment as
//! well as constructed directly.

use serde::{Deserialize, Serialize};

use crate::dialect::DialectKind;
use crate::limits::Limits;

/// Top-level knobs for a single compile. `Default` matches spec.md §6.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(default)]
pub struct CompileOptions {
    pub dialect: DialectKind,
    pub use_parameters: bool,
    pub max_expand_depth: u32,
    pub max_expand_count: usize,
    pub max_page_size: u64,
    pub max_skip: u64,
    pub max_parameters: usize,
    pub enable_search: bool,
}

impl Default for CompileOptions {
    fn default() -> Self {
        let limits = Limits::default();
        Self {
            dialect: DialectKind::Ansi,
            use_parameters: true,
            max_expand_depth: limits.max_expand_depth,
            max_expand_count: limits.max_expand_count,
            max_page_size: limits.max_page_size,
            max_skip: limits.max_skip,
            max_parameters: limits.max_parameters,
            enable_search: limits.enable_search,
        }
    }
}

impl CompileOptions {
    #[must_use]
    pub fn with_dialect(mut self, dialect: DialectKind) -> Self {
        self.dialect = dialect;
        self
    }

    #[must_use]
    pub fn with_search_enabled(mut self, enabled: bool) -> Self {
        self.enable_search = enabled;
        self
    }

    #[must_use]
    pub fn limits(&self) -> Limits {
        Limits {
            max_parameters: self.max_parameters,
            max_expand_depth: self.max_expand_depth,
            max_expand_count: self.max_expand_count,
            max_page_size: self.max_page_size,
            max_skip: self.max_skip,
            enable_search: self.enable_search,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_options_use_ansi_and_spec_limits() {
        let opts = CompileOptions::default();
        assert_eq!(opts.dialect, DialectKind::Ansi);
        assert!(opts.use_parameters);
        assert_eq!(opts.limits(), Limits::default());
    }

    #[test]
    fn builder_methods_override_fields() {
        let opts = CompileOptions::default()
            .with_dialect(DialectKind::PostgreSql)
            .with_search_enabled(true);
        assert_eq!(opts.dialect, DialectKind::PostgreSql);
        assert!(opts.enable_search);
        assert!(opts.limits().enable_search);
    }
}
