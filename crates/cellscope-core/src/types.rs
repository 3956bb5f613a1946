//! Common types shared between the analysis, output and syntax layers.
//!
//! This module contains the position types used everywhere else, kept apart
//! so the syntax crate can depend on them without pulling in output types.

use std::fmt;

use serde::{Deserialize, Serialize};

// ============================================================================
// Span Type
// ============================================================================

/// A half-open byte range `[start, end)` into a source text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
pub struct Span {
    /// Byte offset of the first byte.
    pub start: usize,
    /// Byte offset one past the last byte.
    pub end: usize,
}

impl Span {
    /// Create a new span.
    pub fn new(start: usize, end: usize) -> Self {
        Span { start, end }
    }

    /// An empty span positioned at `offset`.
    pub fn empty(offset: usize) -> Self {
        Span {
            start: offset,
            end: offset,
        }
    }

    /// Length of the span in bytes.
    pub fn len(&self) -> usize {
        self.end.saturating_sub(self.start)
    }

    /// True if the span covers no bytes.
    pub fn is_empty(&self) -> bool {
        self.end <= self.start
    }

    /// Smallest span covering both `self` and `other`.
    pub fn cover(self, other: Span) -> Span {
        Span {
            start: self.start.min(other.start),
            end: self.end.max(other.end),
        }
    }

    /// True if `other` lies entirely inside `self`.
    pub fn contains(&self, other: Span) -> bool {
        self.start <= other.start && other.end <= self.end
    }
}

impl fmt::Display for Span {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}..{}", self.start, self.end)
    }
}

// ============================================================================
// Occurrence Type
// ============================================================================

/// One textual appearance of an identifier.
///
/// Occurrences are never merged: two reads of `x` produce two occurrences,
/// each with its own position. Serialized as `{"name", "from", "to"}`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Occurrence {
    /// The identifier text.
    pub name: String,
    /// Byte offset where the identifier starts.
    pub from: usize,
    /// Byte offset one past the identifier's last byte.
    pub to: usize,
}

impl Occurrence {
    /// Create an occurrence for `name` at `span`.
    pub fn new(name: impl Into<String>, span: Span) -> Self {
        Occurrence {
            name: name.into(),
            from: span.start,
            to: span.end,
        }
    }

    /// The byte range of this occurrence.
    pub fn span(&self) -> Span {
        Span::new(self.from, self.to)
    }
}

// ============================================================================
// Location Type
// ============================================================================

/// A 1-indexed line/column position, used in human-facing output.
///
/// Columns count Unicode scalar values, not bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Location {
    /// Line number (1-indexed).
    pub line: u32,
    /// Column number (1-indexed, chars).
    pub col: u32,
}

impl Location {
    /// Create a new location.
    pub fn new(line: u32, col: u32) -> Self {
        Location { line, col }
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.col)
    }
}
