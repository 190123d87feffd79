//! Source location tracking

use std::fmt;

/// A span represents a range in the source text of one declaration unit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Span {
    /// Start byte offset
    pub start: usize,
    /// End byte offset (exclusive)
    pub end: usize,
    /// 1-based line of `start`
    pub line: u32,
    /// 1-based column of `start`, counted in characters
    pub column: u32,
}

impl Span {
    /// Create a new span
    pub fn new(start: usize, end: usize, line: u32, column: u32) -> Self {
        Self { start, end, line, column }
    }

    /// Create a dummy span (for testing and synthesized nodes)
    pub fn dummy() -> Self {
        Self { start: 0, end: 0, line: 0, column: 0 }
    }

    /// Merge two spans, keeping the position of the earlier one
    pub fn merge(&self, other: &Span) -> Span {
        let (line, column) = if other.start < self.start {
            (other.line, other.column)
        } else {
            (self.line, self.column)
        };
        Span {
            start: self.start.min(other.start),
            end: self.end.max(other.end),
            line,
            column,
        }
    }

    /// Get the length of the span
    pub fn len(&self) -> usize {
        self.end - self.start
    }

    /// Check if the span is empty
    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }
}

impl Default for Span {
    fn default() -> Self {
        Self::dummy()
    }
}

impl fmt::Display for Span {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}
