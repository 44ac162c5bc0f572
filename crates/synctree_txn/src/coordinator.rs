//! The optimistic-transaction coordinator: commit protocol and retry loop.

use crate::attempt::Attempt;
use crate::config::CoordinatorConfig;
use crate::error::{TxnError, TxnResult};
use crate::pool::{TaskHandle, WorkerPool};
use crate::transaction::Transaction;
use std::sync::Arc;
use synctree_engine::{EngineError, EngineState, SyncedEngine};
use synctree_types::{Path, Snapshot};
use tracing::{debug, warn};

/// Result of one commit evaluation.
///
/// `Conflict` is internal to the retry loop; callers of the coordinator
/// only ever observe it indirectly, as a retries-exhausted failure.
#[derive(Debug)]
pub enum CommitOutcome {
    /// Validation passed and the write set (if any) was applied; carries
    /// the committed value at the transaction location.
    Committed(Snapshot),
    /// Some read location changed since it was read; nothing was applied.
    Conflict,
    /// The engine failed during validation or submission; non-retriable.
    Failed(EngineError),
}

/// Runs read-modify-write transactions against the synced tree.
///
/// A transaction is a user callback executed on the coordinator's worker
/// pool, reading and writing through a [`Transaction`] handle. On
/// completion the coordinator validates the attempt's read set on the
/// engine run loop and, if nothing moved underneath it, applies the write
/// set as one atomic multipath update. Conflicts retry the callback from
/// scratch with a fresh attempt, up to a bounded number of tries.
///
/// The coordinator owns its worker pool; dropping the coordinator shuts
/// the pool down after queued transactions drain.
pub struct TransactionCoordinator {
    engine: Arc<SyncedEngine>,
    pool: WorkerPool,
    config: CoordinatorConfig,
}

impl TransactionCoordinator {
    /// Creates a coordinator with default configuration.
    #[must_use]
    pub fn new(engine: Arc<SyncedEngine>) -> Self {
        Self::with_config(engine, CoordinatorConfig::default())
    }

    /// Creates a coordinator with explicit configuration.
    #[must_use]
    pub fn with_config(engine: Arc<SyncedEngine>, config: CoordinatorConfig) -> Self {
        Self {
            pool: WorkerPool::new(config.pool.clone()),
            engine,
            config,
        }
    }

    /// Starts a transaction at `location` and returns a handle to its
    /// completion.
    ///
    /// The callback may run several times; it must tolerate re-execution
    /// and communicate only through its [`Transaction`] handle and return
    /// value. Returning `Err` aborts the transaction immediately with
    /// nothing submitted.
    pub fn submit<F>(&self, location: Path, callback: F) -> TransactionHandle
    where
        F: Fn(&mut Transaction) -> TxnResult<()> + Send + 'static,
    {
        let engine = Arc::clone(&self.engine);
        let max_retries = self.config.max_retries;
        TransactionHandle {
            task: self
                .pool
                .execute(move || run_transaction(&engine, location, &callback, max_retries)),
        }
    }

    /// Runs a transaction at `location`, blocking until it completes.
    ///
    /// The calling thread blocks on the completion signal; the callback
    /// itself still runs on the worker pool, off the engine run loop.
    pub fn run<F>(&self, location: Path, callback: F) -> TxnResult<Snapshot>
    where
        F: Fn(&mut Transaction) -> TxnResult<()> + Send + 'static,
    {
        self.submit(location, callback).join()
    }

    /// Returns the engine this coordinator targets.
    #[must_use]
    pub fn engine(&self) -> &Arc<SyncedEngine> {
        &self.engine
    }
}

/// Completion handle for a submitted transaction.
pub struct TransactionHandle {
    task: TaskHandle<TxnResult<Snapshot>>,
}

impl TransactionHandle {
    /// Blocks until the transaction completes and returns its final value
    /// or terminal error.
    pub fn join(self) -> TxnResult<Snapshot> {
        self.task.join()?
    }
}

fn run_transaction<F>(
    engine: &Arc<SyncedEngine>,
    location: Path,
    callback: &F,
    max_retries: u32,
) -> TxnResult<Snapshot>
where
    F: Fn(&mut Transaction) -> TxnResult<()>,
{
    let mut attempts = 0u32;
    loop {
        attempts += 1;
        let anchor = engine.next_write_id();
        debug!(location = %location, attempts, anchor = %anchor, "starting attempt");

        let mut txn = Transaction::new(Arc::clone(engine), location.clone(), anchor);
        callback(&mut txn)?;

        match commit(engine, &location, txn.into_attempt())? {
            CommitOutcome::Committed(snapshot) => {
                debug!(location = %location, attempts, "transaction committed");
                return Ok(snapshot);
            }
            CommitOutcome::Conflict => {
                if attempts > max_retries {
                    warn!(location = %location, attempts, "retry budget exhausted");
                    return Err(TxnError::RetriesExhausted { attempts });
                }
                debug!(location = %location, attempts, "conflict, retrying");
            }
            CommitOutcome::Failed(error) => {
                warn!(location = %location, error = %error, "engine failure during commit");
                return Err(error.into());
            }
        }
    }
}

/// Validates the attempt's read set and, if it still holds, applies the
/// write set. Both happen inside one task on the engine run loop, so no
/// other engine operation can interleave between validation and submission.
fn commit(
    engine: &SyncedEngine,
    location: &Path,
    attempt: Attempt,
) -> TxnResult<CommitOutcome> {
    let location = location.clone();
    Ok(engine.run(move |state| evaluate_commit(state, &location, &attempt))?)
}

fn evaluate_commit(state: &mut EngineState, location: &Path, attempt: &Attempt) -> CommitOutcome {
    for record in attempt.reads() {
        match state.fetch(record.query()) {
            Ok((_, current)) if current == record.hash() => {}
            Ok(_) => return CommitOutcome::Conflict,
            Err(error) => return CommitOutcome::Failed(error),
        }
    }

    if !attempt.has_writes() {
        // Read-only attempt: validation passed, so the current value is
        // exactly what the callback observed. Nothing to submit.
        return CommitOutcome::Committed(Snapshot::new(location.clone(), state.value_at(location)));
    }

    let writes = attempt.composed_writes();
    match state.apply_multi_write(&writes, attempt.anchor()) {
        Ok(_) => CommitOutcome::Committed(Snapshot::new(location.clone(), state.value_at(location))),
        Err(error) => CommitOutcome::Failed(error),
    }
}
