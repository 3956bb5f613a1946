// Copyright (c) Ken Kocienda and other contributors.
//
// This source code is licensed under the MIT license found in the
// LICENSE file in the root directory of this source tree.

//! A Julia tokenizer and parser producing a navigable syntax tree.
//!
//! # Overview
//!
//! - **Tokenizing**: [`tokenize`] turns source text into [`Token`]s, resolving
//!   statement separators, string interpolation and context-dependent
//!   keywords up front.
//! - **Parsing**: [`parse`] runs the PEG grammar over the tokens and returns
//!   a [`SyntaxTree`]. Statements the grammar cannot handle, and unterminated
//!   literals or comments, become [`SyntaxKind::Error`] nodes instead of
//!   failing the whole parse.
//! - **Navigation**: [`SyntaxNode`] handles and [`TreeCursor`] walk the tree.
//!
//! # Quick Start
//!
//! ```
//! use cellscope_julia_syntax::{parse, SyntaxKind};
//!
//! let tree = parse("x = y + 1").expect("parse error");
//! let stmt = tree.root().child(0).unwrap();
//! assert_eq!(stmt.kind(), SyntaxKind::Assignment);
//! ```

use std::cmp::{max, min};

use cellscope_core::text::byte_offset_to_location;
use cellscope_core::types::Span;

// ============================================================================
// Public modules and re-exports
// ============================================================================

/// Tokenizer for Julia source code.
pub mod tokenizer;
pub use tokenizer::{TokError, TokState, TokType, Token};

/// Syntax tree, node handles and cursors.
pub mod tree;
pub use tree::{Node, NodeId, SyntaxKind, SyntaxNode, SyntaxTree, TreeCursor};

mod parser;
use parser::TokVec;

pub use parser::{ParseLoc, ParserError, Result};

// ============================================================================
// Parsing functions
// ============================================================================

/// Tokenizes Julia source code.
///
/// # Errors
///
/// Returns a [`ParserError::TokenizerError`] for unterminated strings,
/// characters or block comments.
///
/// # Example
///
/// ```
/// use cellscope_julia_syntax::tokenize;
///
/// let tokens = tokenize("x = 1").expect("tokenize error");
/// assert_eq!(tokens.len(), 3);
/// ```
pub fn tokenize(text: &str) -> Result<'_, Vec<Token<'_>>> {
    tokenizer::tokenize(text).map_err(|err| ParserError::TokenizerError(err, text))
}

/// Parses a Julia cell or file into a syntax tree.
///
/// The root is a [`SyntaxKind::SourceFile`] spanning the whole text.
/// Statements that do not parse are kept as [`SyntaxKind::Error`] nodes. An
/// unterminated string, character or block comment becomes a final `Error`
/// node running to the end of the text; the statements before it are kept.
///
/// # Example
///
/// ```
/// use cellscope_julia_syntax::{parse, SyntaxKind};
///
/// let tree = parse("f(x) = x\n)").expect("parse error");
/// assert!(tree.has_errors());
/// assert_eq!(tree.root().child_count(), 2);
///
/// let tree = parse("x = 1\ny = \"open").expect("parse error");
/// assert_eq!(tree.root().child(0).unwrap().kind(), SyntaxKind::Assignment);
/// ```
pub fn parse(text: &str) -> Result<'_, SyntaxTree> {
    let tokens = TokState::new(text).tokenize_recovering();
    let tokvec: TokVec = tokens.into();
    let mut root =
        parser::julia::file(&tokvec).map_err(|err| ParserError::ParserError(err, text))?;
    root.span = Span::new(0, text.len());
    Ok(SyntaxTree::from_node(root))
}

// ============================================================================
// Error formatting
// ============================================================================

/// Returns the byte offset of the beginning of line `n` (1-indexed).
fn bol_offset(source: &str, n: usize) -> usize {
    if n <= 1 {
        return 0;
    }
    source
        .match_indices('\n')
        .nth(n - 2)
        .map(|(index, _)| index + 1)
        .unwrap_or_else(|| source.len())
}

/// Formats a parser error into a human-readable string with source context.
///
/// # Example
///
/// ```
/// use cellscope_julia_syntax::{prettify_error, tokenize};
///
/// if let Err(e) = tokenize("x = \"never closed") {
///     let formatted = prettify_error(e, "cell.jl");
///     assert!(formatted.contains("cell.jl"));
/// }
/// ```
pub fn prettify_error(err: ParserError<'_>, label: &str) -> String {
    let loc = err.location();
    let (text, message) = match &err {
        ParserError::TokenizerError(e, text) => (*text, e.to_string()),
        ParserError::ParserError(e, text) => (*text, format!("expected {}", e.expected)),
    };
    if loc.start > text.len() || loc.end > text.len() {
        return format!("Parse error for {}: {}", label, err);
    }

    use annotate_snippets::{Level, Renderer, Snippet};

    let context = 1;
    let start_line = byte_offset_to_location(text, loc.start).line as usize;
    let end_line = byte_offset_to_location(text, loc.end).line as usize;
    let line_start = max(1, start_line.saturating_sub(context));
    let start_offset = bol_offset(text, line_start);
    let end_offset = bol_offset(text, end_line + context + 1);
    let source = &text[start_offset..end_offset];
    let start = loc.start - start_offset;
    let end = loc.end - start_offset;
    let end = if start == end {
        min(end + 1, source.len() + 1)
    } else {
        end
    };
    let position = byte_offset_to_location(text, loc.start);
    Renderer::styled()
        .render(
            Level::Error.title(label).snippet(
                Snippet::source(source)
                    .line_start(line_start)
                    .fold(false)
                    .annotations(vec![Level::Error
                        .span(start..end)
                        .label(&format!("{} at {}", message, position))]),
            ),
        )
        .to_string()
}

// ============================================================================
// Tests
// ============================================================================
