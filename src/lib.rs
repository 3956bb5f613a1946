//! cellscope: variable usage and scope explorer for Julia notebook cells.
//!
//! For each cell of a Pluto notebook, reports the names the cell defines for
//! other cells, the names it reads, and the names it binds only locally.

// Core infrastructure - re-exported from cellscope-core
pub use cellscope_core::analysis;
pub use cellscope_core::error;
pub use cellscope_core::output;

// Front door
pub mod cli;

pub use cellscope_core::error::{CellscopeError, OutputErrorCode};
pub use cellscope_julia::{analyze_cell, analyze_notebook, AnalyzeOptions, Notebook};
