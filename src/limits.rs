//! C8 — the limits envelope every render pass is checked against.
//! spec.md §6 lists these as configurable bounds; the recursion-depth cap
//! lives in `crate::parser` since it guards the parser itself rather than
//! the renderer.

use crate::error::ParseError;

/// Bounds enforced while lowering a parsed query into SQL. All fields have
/// spec.md §6 defaults; `CompileOptions` (`crate::options`) is the only
/// place that constructs a non-default [`Limits`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Limits {
    pub max_parameters: usize,
    pub max_expand_depth: u32,
    pub max_expand_count: usize,
    pub max_page_size: u64,
    pub max_skip: u64,
    pub enable_search: bool,
}

impl Default for Limits {
    fn default() -> Self {
        Self {
            max_parameters: 1000,
            max_expand_depth: 5,
            max_expand_count: 10,
            max_page_size: 500,
            max_skip: 1_000_000,
            enable_search: false,
        }
    }
}

impl Limits {
    pub fn check_top(&self, top: u64) -> Result<(), ParseError> {
        if top > self.max_page_size {
            tracing::warn!(top, max = self.max_page_size, "rejected $top above page size bound");
            return Err(ParseError::pagination_bound(format!(
                "$top={top} exceeds the maximum page size of {}",
                self.max_page_size
            )));
        }
        Ok(())
    }

    pub fn check_skip(&self, skip: u64) -> Result<(), ParseError> {
        if skip > self.max_skip {
            tracing::warn!(skip, max = self.max_skip, "rejected $skip above bound");
            return Err(ParseError::pagination_bound(format!(
                "$skip={skip} exceeds the maximum of {}",
                self.max_skip
            )));
        }
        Ok(())
    }

    pub fn check_search(&self) -> Result<(), ParseError> {
        if !self.enable_search {
            tracing::warn!("rejected $search while disabled");
            return Err(ParseError::search_disabled());
        }
        Ok(())
    }

    pub fn check_expand_depth(&self, depth: u32) -> Result<(), ParseError> {
        if depth > self.max_expand_depth {
            tracing::warn!(depth, max = self.max_expand_depth, "rejected $expand depth above bound");
            return Err(ParseError::expansion_limit(format!(
                "$expand nesting depth {depth} exceeds the maximum of {}",
                self.max_expand_depth
            )));
        }
        Ok(())
    }

    pub fn check_expand_count(&self, count: usize) -> Result<(), ParseError> {
        if count > self.max_expand_count {
            tracing::warn!(count, max = self.max_expand_count, "rejected $expand sibling count above bound");
            return Err(ParseError::expansion_limit(format!(
                "$expand has {count} siblings, exceeding the maximum of {}",
                self.max_expand_count
            )));
        }
        Ok(())
    }

    pub fn check_parameter_budget(&self, allocated: usize) -> Result<(), ParseError> {
        if allocated > self.max_parameters {
            tracing::warn!(allocated, max = self.max_parameters, "rejected query exceeding parameter budget");
            return Err(ParseError::parameter_budget(format!(
                "query allocated {allocated} parameters, exceeding the maximum of {}",
                self.max_parameters
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_matches_spec_bounds() {
        let limits = Limits::default();
        assert_eq!(limits.max_parameters, 1000);
        assert_eq!(limits.max_expand_depth, 5);
        assert_eq!(limits.max_expand_count, 10);
        assert_eq!(limits.max_page_size, 500);
        assert_eq!(limits.max_skip, 1_000_000);
        assert!(!limits.enable_search);
    }

    #[test]
    fn top_above_bound_is_rejected() {
        let limits = Limits::default();
        assert!(limits.check_top(501).is_err());
        assert!(limits.check_top(500).is_ok());
    }
}
