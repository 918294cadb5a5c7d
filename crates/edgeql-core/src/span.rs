//! Source positions attached to syntax and IR nodes.
//!
//! Every syntax node carries a [`Span`]; the compiler copies it onto the IR it
//! produces so diagnostics can point back at the query text.

use std::fmt;

/// A region of query text, identified by its starting line and column.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Span {
    /// Line number (1-indexed).
    pub line: u32,
    /// Column number (1-indexed, byte-based).
    pub col: u32,
    /// Length in bytes.
    pub len: u32,
}

impl Span {
    #[inline]
    pub fn new(line: u32, col: u32, len: u32) -> Self {
        Self { line, col, len }
    }

    /// A zero-length span at a position.
    #[inline]
    pub fn point(line: u32, col: u32) -> Self {
        Self { line, col, len: 0 }
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Extend this span so it also covers `other`.
    ///
    /// Spans on different lines keep the start of `self` and add up lengths.
    pub fn to(self, other: Span) -> Span {
        if self.line != other.line {
            return Span {
                len: self.len + other.len,
                ..self
            };
        }
        let start = self.col.min(other.col);
        let end = (self.col + self.len).max(other.col + other.len);
        Span::new(self.line, start, end - start)
    }
}

impl fmt::Debug for Span {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}+{}", self.line, self.col, self.len)
    }
}

impl fmt::Display for Span {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.col)
    }
}
