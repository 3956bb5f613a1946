//! Parse-and-explore driver for single cells and whole notebooks.

use cellscope_core::analysis::AnalysisResult;
use cellscope_julia_syntax::parse;
use serde::Serialize;
use thiserror::Error;
use tracing::{debug, warn};

use crate::explorer::{explore_variable_usage, ExploreError};
use crate::notebook::{Cell, Notebook};
use crate::scope::ScopeStack;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AnalyzeError {
    /// The code could not be parsed.
    #[error("{message}")]
    Parse { message: String, offset: usize },

    #[error(transparent)]
    Explore(#[from] ExploreError),
}

impl AnalyzeError {
    /// Byte offset of a parse failure within the analyzed code.
    pub fn offset(&self) -> Option<usize> {
        match self {
            AnalyzeError::Parse { offset, .. } => Some(*offset),
            AnalyzeError::Explore(_) => None,
        }
    }
}

/// Knobs for [`analyze_cell`].
#[derive(Debug, Clone)]
pub struct AnalyzeOptions {
    /// Treat the code as the body of a quotation.
    pub quoted: bool,
    /// Keep locals in the result.
    pub include_locals: bool,
    /// Scopes the code is nested in.
    pub enclosing: Option<ScopeStack>,
}

impl Default for AnalyzeOptions {
    fn default() -> Self {
        AnalyzeOptions {
            quoted: false,
            include_locals: true,
            enclosing: None,
        }
    }
}

/// Parse `code` and classify its identifiers.
pub fn analyze_cell(code: &str, options: &AnalyzeOptions) -> Result<AnalysisResult, AnalyzeError> {
    let tree = parse(code).map_err(|err| AnalyzeError::Parse {
        message: err.to_string(),
        offset: err.location().start,
    })?;
    if tree.has_errors() {
        debug!("syntax errors in cell; erroneous statements are skipped");
    }

    let mut result =
        explore_variable_usage(&tree.cursor(), code, options.enclosing.as_ref(), options.quoted)?;
    if !options.include_locals {
        result.locals.clear();
    }
    Ok(result)
}

/// Outcome for one notebook cell.
#[derive(Debug, Clone, Serialize)]
pub struct CellAnalysis {
    pub cell_id: String,
    /// Byte offset of the cell's code within the notebook file.
    pub offset: usize,
    pub disabled: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<AnalysisResult>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl CellAnalysis {
    fn from_cell(cell: &Cell, outcome: Result<AnalysisResult, AnalyzeError>) -> Self {
        let (result, error) = match outcome {
            Ok(result) => (Some(result), None),
            Err(err) => {
                warn!("cell {}: {}", cell.id, err);
                (None, Some(err.to_string()))
            }
        };
        CellAnalysis {
            cell_id: cell.id.clone(),
            offset: cell.offset,
            disabled: cell.disabled,
            result,
            error,
        }
    }
}

/// Analyze every cell independently. A failing cell yields an error entry
/// and does not stop the others.
pub fn analyze_notebook(notebook: &Notebook, options: &AnalyzeOptions) -> Vec<CellAnalysis> {
    notebook
        .iter()
        .map(|cell| CellAnalysis::from_cell(cell, analyze_cell(&cell.code, options)))
        .collect()
}
