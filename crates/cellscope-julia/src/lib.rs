//! Julia scope analysis for cellscope.
//!
//! Given the source of one notebook cell, work out which names the cell
//! defines for other cells, which names it reads, and which names it binds
//! only inside nested scopes:
//!
//! ```
//! use cellscope_julia::{analyze_cell, AnalyzeOptions};
//!
//! let result = analyze_cell("f(x) = x + a", &AnalyzeOptions::default()).unwrap();
//! assert!(result.defines("f"));
//! assert!(result.uses("a"));
//! assert!(result.local_names().contains("x"));
//! ```
//!
//! Modules:
//! - [`explorer`]: the tree walk that classifies identifiers
//! - [`scope`]: the stack of active lexical scopes
//! - [`notebook`]: splitting Pluto notebook files into cells
//! - [`analyze`]: parse-and-explore driver for cells and notebooks

pub mod analyze;
pub mod explorer;
pub mod notebook;
pub mod scope;

pub use analyze::{analyze_cell, analyze_notebook, AnalyzeError, AnalyzeOptions, CellAnalysis};
pub use explorer::{explore_variable_usage, ExploreError};
pub use notebook::{is_notebook, Cell, Notebook, NotebookError};
pub use scope::{Resolution, ScopeKind, ScopeStack};
