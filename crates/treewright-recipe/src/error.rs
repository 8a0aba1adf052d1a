//! Errors raised while building or running recipes.

use std::path::PathBuf;

use thiserror::Error;
use treewright_analysis::PatternError;
use treewright_core::error::TreewrightError;
use treewright_lst::TreeKind;

#[derive(Debug, Error)]
pub enum RecipeError {
    /// A recipe option holds a malformed pattern.
    #[error(transparent)]
    Pattern(#[from] PatternError),

    /// A path glob could not be compiled.
    #[error("invalid glob '{pattern}': {message}")]
    Glob { pattern: String, message: String },

    /// The run stopped scheduling trees before all of them were processed.
    #[error("run cancelled after {completed} of {total} trees")]
    Cancelled { completed: usize, total: usize },

    /// The worker pool for a parallel run could not be created.
    #[error("cannot start worker pool: {0}")]
    ThreadPool(String),

    /// A visitor replaced a compilation unit with some other node.
    #[error("{}: visitor returned a {kind:?} in place of the compilation unit", path.display())]
    UnexpectedRoot { path: PathBuf, kind: TreeKind },
}

impl RecipeError {
    pub fn glob(pattern: impl Into<String>, err: impl std::fmt::Display) -> Self {
        RecipeError::Glob {
            pattern: pattern.into(),
            message: err.to_string(),
        }
    }
}

impl From<RecipeError> for TreewrightError {
    fn from(err: RecipeError) -> Self {
        match err {
            RecipeError::Pattern(pattern) => TreewrightError::from(pattern),
            RecipeError::Glob { pattern, message } => {
                TreewrightError::InvalidPattern { pattern, message }
            }
            RecipeError::Cancelled { completed, total } => {
                TreewrightError::Cancelled { completed, total }
            }
            other @ (RecipeError::ThreadPool(_) | RecipeError::UnexpectedRoot { .. }) => {
                TreewrightError::internal(other.to_string())
            }
        }
    }
}
