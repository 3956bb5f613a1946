//! Text position utilities for byte offset and line:column conversions.
//!
//! ## Coordinate Conventions
//!
//! - Lines and columns are **1-indexed** (matching editor conventions)
//! - Byte offsets are **0-indexed**
//! - Columns count Unicode scalar values (chars), not bytes
//!
//! [`LineIndex`] precomputes line starts so repeated conversions over the
//! same text (one per occurrence when rendering output) stay cheap.

use crate::types::Location;

// ============================================================================
// One-shot Conversions
// ============================================================================

/// Convert a byte offset to a 1-indexed line and column (Unicode-aware).
///
/// If `offset` exceeds the content length, returns the position at the end
/// of the content. Offsets inside a multi-byte character resolve to that
/// character's column.
pub fn byte_offset_to_location(content: &str, offset: usize) -> Location {
    LineIndex::new(content).location(content, offset)
}

/// Convert a 1-indexed line and column (chars) to a byte offset.
///
/// Line/column values of 0 are treated as 1. Positions past the end of a
/// line clamp to the line end; lines past the end of the content return the
/// content length.
pub fn location_to_byte_offset(content: &str, line: u32, col: u32) -> usize {
    LineIndex::new(content).offset(content, line, col)
}

// ============================================================================
// LineIndex
// ============================================================================

/// Precomputed byte offsets of every line start in a text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LineIndex {
    line_starts: Vec<usize>,
}

impl LineIndex {
    /// Build the index for `content`.
    pub fn new(content: &str) -> Self {
        let mut line_starts = vec![0];
        line_starts.extend(memchr::memchr_iter(b'\n', content.as_bytes()).map(|i| i + 1));
        LineIndex { line_starts }
    }

    /// Number of lines (a trailing newline opens an empty last line).
    pub fn line_count(&self) -> usize {
        self.line_starts.len()
    }

    /// Byte offset where the 1-indexed `line` starts, if it exists.
    pub fn line_start(&self, line: u32) -> Option<usize> {
        let idx = (line.max(1) - 1) as usize;
        self.line_starts.get(idx).copied()
    }

    /// Convert a byte offset into a location.
    pub fn location(&self, content: &str, offset: usize) -> Location {
        let offset = clamp_to_char_boundary(content, offset.min(content.len()));
        let line_idx = match self.line_starts.binary_search(&offset) {
            Ok(idx) => idx,
            Err(idx) => idx - 1,
        };
        let line_start = self.line_starts[line_idx];
        let col = content[line_start..offset].chars().count() + 1;
        Location::new(line_idx as u32 + 1, col as u32)
    }

    /// Convert a location into a byte offset.
    pub fn offset(&self, content: &str, line: u32, col: u32) -> usize {
        let Some(start) = self.line_start(line) else {
            return content.len();
        };
        let end = self
            .line_starts
            .get(line.max(1) as usize)
            .map(|next| next - 1)
            .unwrap_or(content.len());
        let line_text = &content[start..end];
        let wanted = (col.max(1) - 1) as usize;
        match line_text.char_indices().nth(wanted) {
            Some((byte, _)) => start + byte,
            None => end,
        }
    }
}

/// Move `offset` back to the nearest char boundary.
fn clamp_to_char_boundary(content: &str, mut offset: usize) -> usize {
    while offset > 0 && !content.is_char_boundary(offset) {
        offset -= 1;
    }
    offset
}
