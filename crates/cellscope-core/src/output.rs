//! JSON output types and serialization for CLI responses.
//!
//! ## Design Principles
//!
//! 1. **Structured JSON:** All structured CLI output is valid JSON
//! 2. **Status first:** Every response has `status` as first field
//! 3. **Deterministic:** Same input -> same output (field order, array ordering)
//! 4. **Nullable vs absent:** absent field means "not applicable"
//! 5. **Versioned:** Schema version in response enables forward compatibility

use std::io::{self, Write};

use serde::{Deserialize, Serialize};

use crate::analysis::{AnalysisResult, DefinitionKind};
use crate::document::SourceText;
use crate::error::{CellscopeError, OutputErrorCode};
use crate::types::Occurrence;

/// Current schema version for all responses.
pub const SCHEMA_VERSION: &str = "1";

// ============================================================================
// Occurrence and Definition Info
// ============================================================================

/// An occurrence with its human-facing position.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OccurrenceInfo {
    /// Identifier text.
    pub name: String,
    /// Byte offset start.
    pub from: usize,
    /// Byte offset end (exclusive).
    pub to: usize,
    /// Line number (1-indexed).
    pub line: u32,
    /// Column number (1-indexed, chars).
    pub col: u32,
}

impl OccurrenceInfo {
    /// Build from an occurrence, resolving its position in `source`.
    ///
    /// `base` is added to byte offsets when the occurrence belongs to a cell
    /// embedded in a larger file.
    pub fn from_occurrence(occ: &Occurrence, source: &SourceText, base: usize) -> Self {
        let loc = source.location(base + occ.from);
        OccurrenceInfo {
            name: occ.name.clone(),
            from: base + occ.from,
            to: base + occ.to,
            line: loc.line,
            col: loc.col,
        }
    }
}

/// A global definition with its human-facing position.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DefinitionInfo {
    /// Defined name.
    pub name: String,
    /// What produced the definition.
    pub kind: DefinitionKind,
    /// Byte offset start.
    pub from: usize,
    /// Byte offset end (exclusive).
    pub to: usize,
    /// Line number (1-indexed).
    pub line: u32,
    /// Column number (1-indexed, chars).
    pub col: u32,
}

/// Rendered form of an [`AnalysisResult`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalysisInfo {
    /// Global definitions, in first-definition order.
    pub definitions: Vec<DefinitionInfo>,
    /// Every read occurrence, in source order of discovery.
    pub usages: Vec<OccurrenceInfo>,
    /// Local bindings (omitted when the caller disables them).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub locals: Option<Vec<OccurrenceInfo>>,
}

impl AnalysisInfo {
    /// Render `result`, resolving positions against `source` offset by `base`.
    pub fn from_result(
        result: &AnalysisResult,
        source: &SourceText,
        base: usize,
        include_locals: bool,
    ) -> Self {
        let definitions = result
            .definitions
            .iter()
            .map(|(name, def)| {
                let loc = source.location(base + def.from);
                DefinitionInfo {
                    name: name.clone(),
                    kind: def.kind,
                    from: base + def.from,
                    to: base + def.to,
                    line: loc.line,
                    col: loc.col,
                }
            })
            .collect();
        let usages = result
            .usages
            .iter()
            .map(|o| OccurrenceInfo::from_occurrence(o, source, base))
            .collect();
        let locals = include_locals.then(|| {
            result
                .locals
                .iter()
                .map(|o| OccurrenceInfo::from_occurrence(o, source, base))
                .collect()
        });
        AnalysisInfo {
            definitions,
            usages,
            locals,
        }
    }
}

// ============================================================================
// Responses
// ============================================================================

/// Response for `cellscope analyze`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalyzeResponse {
    /// Status: "ok".
    pub status: String,
    /// Schema version for compatibility.
    pub schema_version: String,
    /// Input label (path or `<stdin>`).
    pub file: String,
    /// The analysis.
    pub analysis: AnalysisInfo,
}

impl AnalyzeResponse {
    /// Create a successful analyze response.
    pub fn new(file: impl Into<String>, analysis: AnalysisInfo) -> Self {
        AnalyzeResponse {
            status: "ok".to_string(),
            schema_version: SCHEMA_VERSION.to_string(),
            file: file.into(),
            analysis,
        }
    }
}

/// One cell in a notebook response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CellInfo {
    /// Cell identifier (the UUID in the notebook header).
    pub id: String,
    /// Byte offset of the cell's code within the notebook file.
    pub offset: usize,
    /// Line where the cell's code starts (1-indexed).
    pub line: u32,
    /// The analysis, absent if the cell could not be parsed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub analysis: Option<AnalysisInfo>,
    /// Parse failure message, absent on success.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Analysis of every cell in one notebook file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotebookInfo {
    /// Notebook path.
    pub file: String,
    /// Cells in file order.
    pub cells: Vec<CellInfo>,
}

/// Response for `cellscope notebook`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotebookResponse {
    /// Status: "ok".
    pub status: String,
    /// Schema version for compatibility.
    pub schema_version: String,
    /// One entry per notebook file.
    pub notebooks: Vec<NotebookInfo>,
}

impl NotebookResponse {
    /// Create a successful notebook response.
    pub fn new(notebooks: Vec<NotebookInfo>) -> Self {
        NotebookResponse {
            status: "ok".to_string(),
            schema_version: SCHEMA_VERSION.to_string(),
            notebooks,
        }
    }
}

/// Response for `cellscope tree --format json`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TreeResponse {
    /// Status: "ok".
    pub status: String,
    /// Schema version for compatibility.
    pub schema_version: String,
    /// Input label.
    pub file: String,
    /// Indented tree dump, one node per line.
    pub tree: String,
}

impl TreeResponse {
    /// Create a successful tree response.
    pub fn new(file: impl Into<String>, tree: impl Into<String>) -> Self {
        TreeResponse {
            status: "ok".to_string(),
            schema_version: SCHEMA_VERSION.to_string(),
            file: file.into(),
            tree: tree.into(),
        }
    }
}

// ============================================================================
// Error Response
// ============================================================================

/// Error details inside an [`ErrorResponse`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorInfo {
    /// Numeric error code.
    pub code: u8,
    /// Human-readable message.
    pub message: String,
}

impl ErrorInfo {
    /// Create from a CellscopeError.
    pub fn from_error(err: &CellscopeError) -> Self {
        ErrorInfo {
            code: OutputErrorCode::from(err).code(),
            message: err.to_string(),
        }
    }
}

/// Error response envelope.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Status: "error".
    pub status: String,
    /// Schema version for compatibility.
    pub schema_version: String,
    /// Error information.
    pub error: ErrorInfo,
}

impl ErrorResponse {
    /// Create an error response from a CellscopeError.
    pub fn from_error(err: &CellscopeError) -> Self {
        ErrorResponse {
            status: "error".to_string(),
            schema_version: SCHEMA_VERSION.to_string(),
            error: ErrorInfo::from_error(err),
        }
    }
}

// ============================================================================
// Emission
// ============================================================================

/// Emit a response as pretty-printed JSON to a writer.
pub fn emit_response<T: Serialize>(response: &T, writer: &mut impl Write) -> io::Result<()> {
    let json = serde_json::to_string_pretty(response)
        .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
    writeln!(writer, "{}", json)
}

/// Emit a response as compact JSON (single line) to a writer.
pub fn emit_response_compact<T: Serialize>(
    response: &T,
    writer: &mut impl Write,
) -> io::Result<()> {
    let json = serde_json::to_string(response)
        .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
    writeln!(writer, "{}", json)
}

// ============================================================================
// Tests
// ============================================================================
