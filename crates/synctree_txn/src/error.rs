//! Error types for the transaction coordinator.

use synctree_engine::EngineError;
use thiserror::Error;

/// Result type for transaction operations.
pub type TxnResult<T> = Result<T, TxnError>;

/// Errors surfaced by the transaction coordinator.
///
/// Conflicts never appear here: they are internal to the retry loop and
/// only become visible as [`TxnError::RetriesExhausted`] once the retry
/// budget is spent.
#[derive(Debug, Error)]
pub enum TxnError {
    /// A read was attempted after a write was recorded in the same attempt.
    #[error("transactions require all reads to be executed before all writes")]
    ReadAfterWrite,

    /// The user callback aborted the transaction.
    #[error("transaction aborted by callback: {reason}")]
    Aborted {
        /// Reason given by the callback.
        reason: String,
    },

    /// The engine failed during a fetch or submission. Non-retriable.
    #[error("engine error: {0}")]
    Engine(#[from] EngineError),

    /// The retry budget was spent on repeated conflicts.
    #[error("transaction failed after {attempts} attempts due to repeated conflicts")]
    RetriesExhausted {
        /// Number of attempts made, including the first.
        attempts: u32,
    },

    /// The worker pool dropped the task before it completed.
    #[error("worker pool dropped the task before completion")]
    TaskLost,
}

impl TxnError {
    /// Creates a callback abort error.
    pub fn aborted(reason: impl Into<String>) -> Self {
        Self::Aborted {
            reason: reason.into(),
        }
    }
}
