// Copyright (c) Ken Kocienda and other contributors.
//
// This source code is licensed under the MIT license found in the
// LICENSE file in the root directory of this source tree.

//! Errors raised by the tree crate.
//!
//! Syntax errors inside otherwise tokenizable source never surface here: the
//! parser turns them into `Erroneous` nodes. [`ParseError`] is reserved for
//! input that cannot be tokenized at all, and is only returned for classpath
//! sources.

use std::path::PathBuf;

use thiserror::Error;
use treewright_core::error::TreewrightError;
use treewright_core::text::Position;

use crate::tree::TreeKind;

/// Source text that cannot be turned into a tree.
#[derive(Debug, Error, PartialEq)]
pub enum ParseError {
    #[error("{}:{position}: unterminated block comment", path.display())]
    UnterminatedComment { path: PathBuf, position: Position },

    #[error("{}:{position}: unterminated string or character literal", path.display())]
    UnterminatedLiteral { path: PathBuf, position: Position },
}

impl ParseError {
    pub fn path(&self) -> &PathBuf {
        match self {
            ParseError::UnterminatedComment { path, .. }
            | ParseError::UnterminatedLiteral { path, .. } => path,
        }
    }
}

/// A transmitted tree that cannot be reconstructed.
#[derive(Debug, Error)]
pub enum RpcError {
    #[error("event stream ended early")]
    UnexpectedEnd,

    #[error("unexpected event {event} at {path}")]
    UnexpectedEvent { event: String, path: String },

    #[error("no baseline for tree {0}")]
    MissingBaseline(String),

    #[error("invalid list position {position} (baseline has {len} elements)")]
    InvalidPosition { position: i64, len: usize },

    #[error("{0} trailing events")]
    TrailingEvents(usize),

    #[error("cannot decode tree: {0}")]
    Decode(#[from] serde_json::Error),
}

/// A cursor query that found nothing.
#[derive(Debug, Error, PartialEq)]
pub enum CursorError {
    #[error("no enclosing {0:?}")]
    NoEnclosing(TreeKind),
}

// ============================================================================
// Bridges into TreewrightError
// ============================================================================

impl From<ParseError> for TreewrightError {
    fn from(err: ParseError) -> Self {
        TreewrightError::ParseFailure {
            path: err.path().display().to_string(),
            message: err.to_string(),
        }
    }
}

impl From<RpcError> for TreewrightError {
    fn from(err: RpcError) -> Self {
        TreewrightError::ProtocolError {
            message: err.to_string(),
        }
    }
}

impl From<CursorError> for TreewrightError {
    fn from(err: CursorError) -> Self {
        TreewrightError::internal(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use treewright_core::OutputErrorCode;

    #[test]
    fn test_parse_errors_name_the_file() {
        let err = TreewrightError::from(ParseError::UnterminatedComment {
            path: PathBuf::from("Broken.java"),
            position: Position { line: 1, col: 11 },
        });
        assert_eq!(err.code(), OutputErrorCode::ParseFailure);
        assert!(matches!(err, TreewrightError::ParseFailure { ref path, .. } if path == "Broken.java"));
    }

    #[test]
    fn test_protocol_errors_map_to_their_code() {
        let err = TreewrightError::from(RpcError::TrailingEvents(2));
        assert_eq!(err.code(), OutputErrorCode::ProtocolError);
        assert!(err.to_string().contains("2 trailing events"));
    }
}
