// Copyright (c) Ken Kocienda and other contributors.
//
// This source code is licensed under the MIT license found in the
// LICENSE file in the root directory of this source tree.

//! Errors raised when constructing matchers.

use thiserror::Error;
use treewright_core::error::TreewrightError;

/// A pattern string that does not follow the pointcut grammar.
///
/// Matchers are built completely or not at all: construction either returns
/// a matcher or this error, before any tree is visited.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum PatternError {
    #[error("invalid pattern '{pattern}' at '{fragment}': {message}")]
    Invalid {
        pattern: String,
        /// The rest of the pattern starting at the first character that
        /// could not be parsed, or `<end>` when the pattern ended early.
        fragment: String,
        message: String,
    },
}

impl PatternError {
    pub(crate) fn invalid(
        pattern: &str,
        fragment: &str,
        message: impl Into<String>,
    ) -> Self {
        let fragment = if fragment.is_empty() {
            "<end>".to_string()
        } else {
            fragment.to_string()
        };
        PatternError::Invalid {
            pattern: pattern.to_string(),
            fragment,
            message: message.into(),
        }
    }

    pub fn pattern(&self) -> &str {
        match self {
            PatternError::Invalid { pattern, .. } => pattern,
        }
    }

    pub fn fragment(&self) -> &str {
        match self {
            PatternError::Invalid { fragment, .. } => fragment,
        }
    }
}

impl From<PatternError> for TreewrightError {
    fn from(err: PatternError) -> Self {
        TreewrightError::InvalidPattern {
            pattern: err.pattern().to_string(),
            message: err.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use treewright_core::OutputErrorCode;

    #[test]
    fn test_pattern_errors_keep_the_pattern() {
        let err = TreewrightError::from(PatternError::invalid("a.B c(", "", "unclosed parameter list"));
        assert_eq!(err.code(), OutputErrorCode::InvalidPattern);
        match err {
            TreewrightError::InvalidPattern { pattern, message } => {
                assert_eq!(pattern, "a.B c(");
                assert!(message.contains("<end>"));
            }
            other => panic!("unexpected {:?}", other),
        }
    }
}
