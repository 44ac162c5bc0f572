//! Error types for the synced-tree engine.

use synctree_types::Path;
use thiserror::Error;

/// Result type for engine operations.
pub type EngineResult<T> = Result<T, EngineError>;

/// Errors that can occur in engine operations.
///
/// All engine errors are non-retriable from the transaction coordinator's
/// point of view: they indicate the environment, not the data, is wrong.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EngineError {
    /// The engine is disconnected from the remote store.
    #[error("engine is disconnected from the remote store")]
    Disconnected,

    /// A write was rejected by the store's access rules.
    #[error("write denied at {path}")]
    PermissionDenied {
        /// The rejected location.
        path: Path,
    },

    /// The run loop has shut down and accepts no further tasks.
    #[error("engine run loop has shut down")]
    Shutdown,
}

impl EngineError {
    /// Creates a permission denied error.
    pub fn permission_denied(path: Path) -> Self {
        Self::PermissionDenied { path }
    }
}
