//! The `Document` abstraction: byte range -> source text.
//!
//! The scope explorer never owns source text. It asks a [`Document`] for the
//! exact substring behind a node's byte range, which lets callers back the
//! analysis with a plain `&str`, a [`SourceText`], or an editor buffer.

use crate::text::LineIndex;
use crate::types::{Location, Span};

/// Read-only access to the text a syntax tree was parsed from.
pub trait Document {
    /// Total length in bytes.
    fn len(&self) -> usize;

    /// The text covered by `span`, or `None` if the span is out of range or
    /// does not fall on char boundaries.
    fn slice(&self, span: Span) -> Option<&str>;

    /// True if the document is empty.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Document for str {
    fn len(&self) -> usize {
        str::len(self)
    }

    fn slice(&self, span: Span) -> Option<&str> {
        self.get(span.start..span.end)
    }
}

impl Document for String {
    fn len(&self) -> usize {
        self.as_str().len()
    }

    fn slice(&self, span: Span) -> Option<&str> {
        self.as_str().get(span.start..span.end)
    }
}

/// Owned source text with a precomputed line index.
#[derive(Debug, Clone)]
pub struct SourceText {
    text: String,
    lines: LineIndex,
}

impl SourceText {
    /// Wrap `text`, indexing its lines.
    pub fn new(text: impl Into<String>) -> Self {
        let text = text.into();
        let lines = LineIndex::new(&text);
        SourceText { text, lines }
    }

    /// The full text.
    pub fn as_str(&self) -> &str {
        &self.text
    }

    /// Line/column of a byte offset.
    pub fn location(&self, offset: usize) -> Location {
        self.lines.location(&self.text, offset)
    }

    /// Number of lines in the text.
    pub fn line_count(&self) -> usize {
        self.lines.line_count()
    }
}

impl Document for SourceText {
    fn len(&self) -> usize {
        self.text.len()
    }

    fn slice(&self, span: Span) -> Option<&str> {
        self.text.get(span.start..span.end)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn str_document_slices_by_span() {
        let doc: &str = "x = y + 1";
        assert_eq!(Document::slice(doc, Span::new(4, 5)), Some("y"));
        assert_eq!(Document::len(doc), 9);
    }

    #[test]
    fn out_of_range_slice_is_none() {
        let doc = SourceText::new("abc");
        assert_eq!(doc.slice(Span::new(1, 10)), None);
    }

    #[test]
    fn slice_inside_multibyte_char_is_none() {
        let doc = SourceText::new("a ⊻= b");
        assert_eq!(doc.slice(Span::new(3, 5)), None);
        assert_eq!(doc.slice(Span::new(2, 5)), Some("⊻"));
    }

    #[test]
    fn source_text_locations() {
        let doc = SourceText::new("a\nbc");
        assert_eq!(doc.location(3), Location::new(2, 2));
        assert_eq!(doc.line_count(), 2);
        assert!(!doc.is_empty());
    }
}
