//! Error types and error code constants for treewright.
//!
//! This module provides a unified error type ([`TreewrightError`]) that bridges
//! domain-specific errors from the tree, analysis and recipe crates into a
//! common format with stable numeric codes.
//!
//! ## Error Code Mapping
//!
//! - `2`: Invalid pattern (matcher construction failed)
//! - `3`: Parse failure (source could not be turned into a tree at all)
//! - `4`: Protocol error (tree transfer could not be decoded)
//! - `5`: Cancelled (the run was aborted before all trees were scheduled)
//! - `10`: Internal errors (bugs, unexpected state)
//!
//! ## Design
//!
//! - **Unified type**: `TreewrightError` is the single error type callers handle
//! - **Bridging**: `impl From<X> for TreewrightError` lives in the crate that
//!   defines `X`
//! - **Code mapping**: `OutputErrorCode` provides stable integer codes

use std::fmt;

use thiserror::Error;

// ============================================================================
// Output Error Codes
// ============================================================================

/// Stable error codes for reporting.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum OutputErrorCode {
    /// A pattern string failed to parse.
    InvalidPattern = 2,
    /// Source text could not be parsed into a tree.
    ParseFailure = 3,
    /// A transmitted tree could not be decoded.
    ProtocolError = 4,
    /// The run was cancelled.
    Cancelled = 5,
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

/// Unified error type.
#[derive(Debug, Error)]
pub enum TreewrightError {
    /// A matcher pattern is malformed.
    #[error("invalid pattern '{pattern}': {message}")]
    InvalidPattern { pattern: String, message: String },

    /// Source could not be parsed.
    #[error("parse failure in {path}: {message}")]
    ParseFailure { path: String, message: String },

    /// A tree transfer could not be decoded.
    #[error("protocol error: {message}")]
    ProtocolError { message: String },

    /// The run was cancelled before completion.
    #[error("run cancelled after {completed} of {total} trees")]
    Cancelled { completed: usize, total: usize },

    /// Configuration could not be loaded.
    #[error("configuration error: {message}")]
    Configuration { message: String },

    /// Internal error (bug or unexpected state).
    #[error("internal error: {message}")]
    InternalError { message: String },
}

impl From<&TreewrightError> for OutputErrorCode {
    fn from(err: &TreewrightError) -> Self {
        match err {
            TreewrightError::InvalidPattern { .. } => OutputErrorCode::InvalidPattern,
            TreewrightError::ParseFailure { .. } => OutputErrorCode::ParseFailure,
            TreewrightError::ProtocolError { .. } => OutputErrorCode::ProtocolError,
            TreewrightError::Cancelled { .. } => OutputErrorCode::Cancelled,
            TreewrightError::Configuration { .. } => OutputErrorCode::InternalError,
            TreewrightError::InternalError { .. } => OutputErrorCode::InternalError,
        }
    }
}

impl From<TreewrightError> for OutputErrorCode {
    fn from(err: TreewrightError) -> Self {
        OutputErrorCode::from(&err)
    }
}

impl From<serde_json::Error> for TreewrightError {
    fn from(err: serde_json::Error) -> Self {
        TreewrightError::Configuration {
            message: err.to_string(),
        }
    }
}

// ============================================================================
// Convenience Constructors
// ============================================================================

impl TreewrightError {
    /// Create an internal error.
    pub fn internal(message: impl Into<String>) -> Self {
        TreewrightError::InternalError {
            message: message.into(),
        }
    }

    /// Create an invalid-pattern error.
    pub fn invalid_pattern(pattern: impl Into<String>, message: impl Into<String>) -> Self {
        TreewrightError::InvalidPattern {
            pattern: pattern.into(),
            message: message.into(),
        }
    }

    /// The stable code for this error.
    pub fn code(&self) -> OutputErrorCode {
        OutputErrorCode::from(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_codes() {
        assert_eq!(
            TreewrightError::invalid_pattern("java.util.", "trailing dot").code(),
            OutputErrorCode::InvalidPattern
        );
        assert_eq!(
            TreewrightError::Cancelled {
                completed: 1,
                total: 3
            }
            .code()
            .code(),
            5
        );
        assert_eq!(TreewrightError::internal("boom").code().code(), 10);
    }

    #[test]
    fn test_error_messages() {
        let err = TreewrightError::invalid_pattern("a..", "trailing '..'");
        assert_eq!(err.to_string(), "invalid pattern 'a..': trailing '..'");
    }
}
