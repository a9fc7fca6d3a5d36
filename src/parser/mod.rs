//! C3 — the hand-written recursive-descent parser.
//!
//! Every production has the shape `fn(&mut self, pos: usize) -> ParseResult<(T, usize)>`:
//! it is handed a byte offset into the shared [`Source`] and returns either
//! the parsed node plus the offset just past it, or a [`ParseError`]. There
//! is no parser-combinator library and no backtracking across alternatives
//! wider than a bounded one-token lookahead — this grammar is the
//! engineering this crate exists to contain.

mod filter;
mod options;
mod resource_path;

use crate::error::{ParseError, ParseResult};
use crate::source::Source;

pub use options::parse_query_options;
pub use resource_path::parse_resource_path;

/// Parser state threaded through every production: the source buffer plus
/// a recursion-depth counter so a pathological nesting of parentheses or
/// lambdas fails with [`ParseError::recursion_limit`] instead of
/// overflowing the call stack.
pub struct Parser<'a> {
    pub src: Source<'a>,
    depth: usize,
    max_depth: usize,
}

/// Default recursion ceiling (spec.md §6 promotes this from a SHOULD to a
/// MUST — see DESIGN.md).
pub const DEFAULT_MAX_RECURSION_DEPTH: usize = 1000;

impl<'a> Parser<'a> {
    #[must_use]
    pub fn new(text: &'a str) -> Self {
        Self::with_max_depth(text, DEFAULT_MAX_RECURSION_DEPTH)
    }

    #[must_use]
    pub fn with_max_depth(text: &'a str, max_depth: usize) -> Self {
        Self {
            src: Source::new(text),
            depth: 0,
            max_depth,
        }
    }

    /// Wraps a recursive descent, incrementing/decrementing the depth
    /// counter around it. Every production that recurses into another
    /// production (parens, lambdas, nested boolean/arithmetic operators)
    /// must go through this.
    fn guarded<T>(&mut self, f: impl FnOnce(&mut Self) -> ParseResult<T>) -> ParseResult<T> {
        self.depth += 1;
        if self.depth > self.max_depth {
            self.depth -= 1;
            return Err(ParseError::recursion_limit());
        }
        let result = f(self);
        self.depth -= 1;
        result
    }

    fn ws(&self, pos: usize) -> usize {
        crate::lexer::skip_ws(&self.src, pos)
    }

    /// Parses a complete `$filter` expression and asserts no trailing input
    /// remains.
    pub fn parse_filter_complete(&mut self) -> ParseResult<crate::ast::Spanned<crate::ast::Expr>> {
        let (expr, end) = self.guarded(|p| filter::parse_or(p, 0))?;
        let end = self.ws(end);
        if end != self.src.len() {
            return Err(ParseError::trailing_input(end));
        }
        Ok(expr)
    }
}

pub use filter::parse_or as parse_filter_expr;
