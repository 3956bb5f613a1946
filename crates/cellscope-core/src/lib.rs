//! Core infrastructure for cellscope.
//!
//! This crate provides the language-agnostic pieces shared by the parser,
//! the scope explorer and the CLI:
//! - Span and occurrence types
//! - The analysis result record (locals, usages, definitions)
//! - The `Document` abstraction (byte range -> text)
//! - Text position utilities
//! - Error types and exit codes
//! - JSON output envelopes for CLI responses

pub mod analysis;
pub mod document;
pub mod error;
pub mod output;
pub mod text;
pub mod types;

pub use analysis::{AnalysisResult, Definition, DefinitionKind};
pub use document::{Document, SourceText};
pub use types::{Occurrence, Span};
