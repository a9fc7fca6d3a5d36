//! Shared allocator state threaded through a visitor tree.
//!
//! A top-level compile and every `$expand` include it spawns share one
//! parameter-name sequence and one expand-numbering sequence, so parameter
//! names stay globally unique and strictly increase in allocation order
//! (invariant I2) even though each include gets its own [`Visitor`]. An
//! owned `Rc<Cell<u32>>` is the idiomatic stand-in for what would otherwise
//! be process-wide mutable state (REDESIGN FLAGS, spec.md §9) — one compile
//! never crosses a thread boundary, so `Rc`/`RefCell` rather than `Arc`/`Mutex`.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use indexmap::IndexMap;

use crate::value::ParamValue;

#[derive(Clone)]
pub struct ParamAllocator {
    seed: Rc<Cell<u32>>,
    params: Rc<RefCell<IndexMap<String, ParamValue>>>,
}

impl ParamAllocator {
    #[must_use]
    pub fn new() -> Self {
        Self {
            seed: Rc::new(Cell::new(0)),
            params: Rc::new(RefCell::new(IndexMap::new())),
        }
    }

    /// Allocates the next `{prefix}{n}` name and binds it to `value` in the
    /// shared parameter map. `prefix` is one of `literal`/`field`/`param`/
    /// `select`/`fetch` per spec.md §3; the numeric suffix is drawn from one
    /// sequence shared across all prefixes so allocation order is always
    /// recoverable from the numbers alone.
    pub fn alloc(&self, prefix: &str, value: ParamValue) -> String {
        let n = self.seed.get() + 1;
        self.seed.set(n);
        let name = format!("{prefix}{n}");
        self.params.borrow_mut().insert(name.clone(), value);
        name
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.params.borrow().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    #[must_use]
    pub fn into_map(self) -> IndexMap<String, ParamValue> {
        Rc::try_unwrap(self.params)
            .map(RefCell::into_inner)
            .unwrap_or_else(|shared| shared.borrow().clone())
    }

    /// Snapshots the entries allocated from index `start` onward (insertion
    /// order, so this captures exactly what was allocated since the caller
    /// last recorded [`Self::len`]) without consuming the allocator — used
    /// to scope an `$expand` include's own parameter map to what it and its
    /// nested includes actually allocated, excluding its ancestors' and
    /// siblings' entries even though they all share one sequence.
    #[must_use]
    pub fn snapshot_from(&self, start: usize) -> IndexMap<String, ParamValue> {
        self.params.borrow().iter().skip(start).map(|(k, v)| (k.clone(), v.clone())).collect()
    }
}

impl Default for ParamAllocator {
    fn default() -> Self {
        Self::new()
    }
}

/// Per-visitor context: which table the current node renders against, and
/// the name of the lambda variable (`any`/`all`) currently in scope so a
/// bare `$it`-less identifier inside a lambda predicate resolves correctly.
#[derive(Clone)]
pub struct Context {
    pub target: String,
    pub last_identifier: Option<String>,
    pub expand_depth: u32,
}

impl Context {
    #[must_use]
    pub fn root(target: impl Into<String>) -> Self {
        Self {
            target: target.into(),
            last_identifier: None,
            expand_depth: 0,
        }
    }

    /// Forks context for a sibling node at the same nesting level (e.g. the
    /// two sides of an `AndExpression`) — same target/depth, independent of
    /// any lambda-variable binding the sibling introduces.
    #[must_use]
    pub fn fork_sibling(&self) -> Self {
        self.clone()
    }

    /// Forks context for an `$expand` include: same allocator lineage, one
    /// level deeper.
    #[must_use]
    pub fn fork_include(&self, target: impl Into<String>) -> Self {
        Self {
            target: target.into(),
            last_identifier: None,
            expand_depth: self.expand_depth + 1,
        }
    }

    /// Forks context for a lambda predicate (`any`/`all`), binding the
    /// lambda variable as the implicit identifier in scope.
    #[must_use]
    pub fn fork_lambda(&self, variable: impl Into<String>) -> Self {
        Self {
            target: self.target.clone(),
            last_identifier: Some(variable.into()),
            expand_depth: self.expand_depth,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::ParamValue;

    #[test]
    fn allocator_names_are_globally_sequential_across_prefixes() {
        let alloc = ParamAllocator::new();
        let a = alloc.alloc("literal", ParamValue::Int(1));
        let b = alloc.alloc("field", ParamValue::FieldName("x".into()));
        let c = alloc.alloc("literal", ParamValue::Int(2));
        assert_eq!(a, "literal1");
        assert_eq!(b, "field2");
        assert_eq!(c, "literal3");
        assert_eq!(alloc.len(), 3);
    }

    #[test]
    fn cloned_allocator_shares_sequence() {
        let alloc = ParamAllocator::new();
        let child = alloc.clone();
        alloc.alloc("literal", ParamValue::Int(1));
        let name = child.alloc("literal", ParamValue::Int(2));
        assert_eq!(name, "literal2");
    }
}
