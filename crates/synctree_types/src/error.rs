//! Error types for the Synctree data model.

use thiserror::Error;

/// Result type for data-model operations.
pub type TypeResult<T> = Result<T, TypeError>;

/// Errors that can occur when constructing data-model values.
#[derive(Debug, Error)]
pub enum TypeError {
    /// A path string could not be parsed.
    #[error("invalid path {path:?}: {message}")]
    InvalidPath {
        /// The rejected input.
        path: String,
        /// Description of the problem.
        message: String,
    },
}

impl TypeError {
    /// Creates an invalid path error.
    pub fn invalid_path(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidPath {
            path: path.into(),
            message: message.into(),
        }
    }
}
