//! Error types and error code constants for cellscope.
//!
//! This module provides a unified error type (`CellscopeError`) that bridges
//! domain-specific errors from the syntax and analysis crates into a common
//! format suitable for JSON output.
//!
//! ## Error Code Mapping
//!
//! - `2`: Invalid arguments (bad input from caller)
//! - `3`: Input errors (file not found, unreadable)
//! - `4`: Parse errors (source could not be tokenized or parsed)
//! - `10`: Internal errors (bugs, unexpected state)
//!
//! ## Design
//!
//! - **Unified type**: `CellscopeError` is the single error type for CLI output
//! - **Bridging**: `impl From<X> for CellscopeError` bridges domain errors
//! - **Code mapping**: `OutputErrorCode` provides stable integer codes for JSON

use std::fmt;

use thiserror::Error;

// ============================================================================
// Output Error Codes
// ============================================================================

/// Error codes for JSON output.
///
/// These codes map to CLI exit codes and appear in JSON error responses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum OutputErrorCode {
    /// Invalid arguments from caller.
    InvalidArguments = 2,
    /// Input file missing or unreadable.
    InputError = 3,
    /// Source text could not be tokenized or parsed.
    ParseError = 4,
    /// Internal errors (bugs, unexpected state).
    InternalError = 10,
}

impl OutputErrorCode {
    /// Get the numeric code value.
    pub fn code(&self) -> u8 {
        *self as u8
    }
}

impl fmt::Display for OutputErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

// ============================================================================
// Unified Error Type
// ============================================================================

/// Unified error type for CLI output.
#[derive(Debug, Error)]
pub enum CellscopeError {
    /// Invalid arguments from caller.
    #[error("invalid arguments: {message}")]
    InvalidArguments { message: String },

    /// Input file does not exist.
    #[error("file not found: {path}")]
    FileNotFound { path: String },

    /// Input could not be read.
    #[error("failed to read {path}: {message}")]
    Io { path: String, message: String },

    /// Source text could not be tokenized or parsed.
    #[error("parse error in {label}: {message}")]
    ParseError { label: String, message: String },

    /// Internal error (bug or unexpected state).
    #[error("internal error: {message}")]
    InternalError { message: String },
}

impl CellscopeError {
    /// Create an invalid arguments error.
    pub fn invalid_args(message: impl Into<String>) -> Self {
        CellscopeError::InvalidArguments {
            message: message.into(),
        }
    }

    /// Create a file not found error.
    pub fn file_not_found(path: impl Into<String>) -> Self {
        CellscopeError::FileNotFound { path: path.into() }
    }

    /// Create a parse error.
    pub fn parse(label: impl Into<String>, message: impl Into<String>) -> Self {
        CellscopeError::ParseError {
            label: label.into(),
            message: message.into(),
        }
    }

    /// Create an internal error.
    pub fn internal(message: impl Into<String>) -> Self {
        CellscopeError::InternalError {
            message: message.into(),
        }
    }

    /// Wrap an I/O error for `path`, mapping `NotFound` to [`CellscopeError::FileNotFound`].
    pub fn from_io(path: impl Into<String>, err: &std::io::Error) -> Self {
        let path = path.into();
        if err.kind() == std::io::ErrorKind::NotFound {
            CellscopeError::FileNotFound { path }
        } else {
            CellscopeError::Io {
                path,
                message: err.to_string(),
            }
        }
    }

    /// The output code for this error.
    pub fn error_code(&self) -> OutputErrorCode {
        OutputErrorCode::from(self)
    }
}

// ============================================================================
// Error Code Mapping
// ============================================================================

impl From<&CellscopeError> for OutputErrorCode {
    fn from(err: &CellscopeError) -> Self {
        match err {
            CellscopeError::InvalidArguments { .. } => OutputErrorCode::InvalidArguments,
            CellscopeError::FileNotFound { .. } => OutputErrorCode::InputError,
            CellscopeError::Io { .. } => OutputErrorCode::InputError,
            CellscopeError::ParseError { .. } => OutputErrorCode::ParseError,
            CellscopeError::InternalError { .. } => OutputErrorCode::InternalError,
        }
    }
}

impl From<serde_json::Error> for CellscopeError {
    fn from(err: serde_json::Error) -> Self {
        CellscopeError::internal(format!("serialization failed: {}", err))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    mod error_code_mapping {
        use super::*;

        #[test]
        fn invalid_arguments_maps_to_2() {
            let err = CellscopeError::invalid_args("no input");
            assert_eq!(err.error_code(), OutputErrorCode::InvalidArguments);
            assert_eq!(err.error_code().code(), 2);
        }

        #[test]
        fn file_not_found_maps_to_input_error() {
            let err = CellscopeError::file_not_found("nb.jl");
            assert_eq!(err.error_code(), OutputErrorCode::InputError);
            assert_eq!(err.error_code().code(), 3);
        }

        #[test]
        fn parse_error_maps_to_4() {
            let err = CellscopeError::parse("cell.jl", "unterminated string");
            assert_eq!(err.error_code().code(), 4);
            assert_eq!(
                err.to_string(),
                "parse error in cell.jl: unterminated string"
            );
        }

        #[test]
        fn internal_maps_to_10() {
            let err = CellscopeError::internal("boom");
            assert_eq!(err.error_code().code(), 10);
        }
    }

    mod io_bridging {
        use super::*;

        #[test]
        fn not_found_becomes_file_not_found() {
            let io = std::io::Error::new(std::io::ErrorKind::NotFound, "gone");
            let err = CellscopeError::from_io("x.jl", &io);
            assert!(matches!(err, CellscopeError::FileNotFound { .. }));
        }

        #[test]
        fn other_io_errors_keep_message() {
            let io = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied");
            let err = CellscopeError::from_io("x.jl", &io);
            assert_eq!(err.to_string(), "failed to read x.jl: denied");
        }
    }
}
