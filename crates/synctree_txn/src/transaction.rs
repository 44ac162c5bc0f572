//! The handle a transaction callback reads and writes through.

use crate::attempt::Attempt;
use crate::error::{TxnError, TxnResult};
use std::sync::Arc;
use synctree_engine::SyncedEngine;
use synctree_types::{Path, Query, Snapshot, TreeValue, WriteId};
use tracing::trace;

/// The active attempt, as seen by the user callback.
///
/// All data operations a callback performs go through this handle and are
/// tracked in the underlying [`Attempt`]. The callback runs on a worker
/// pool thread; reads are marshaled onto the engine run loop and handed
/// back, so the callback may block freely without stalling the engine.
pub struct Transaction {
    engine: Arc<SyncedEngine>,
    location: Path,
    attempt: Attempt,
}

impl Transaction {
    pub(crate) fn new(engine: Arc<SyncedEngine>, location: Path, anchor: WriteId) -> Self {
        Self {
            engine,
            location,
            attempt: Attempt::new(anchor),
        }
    }

    /// Returns the location this transaction was started at.
    #[must_use]
    pub fn location(&self) -> &Path {
        &self.location
    }

    /// Reads current data for `query` and records it in the read set.
    ///
    /// All reads must happen before the first write; afterwards this fails
    /// with [`TxnError::ReadAfterWrite`] without touching the engine. The
    /// fetch itself runs on the engine's run loop so it observes a
    /// consistent point-in-time view; the result is recorded here, on the
    /// calling worker thread.
    pub fn read(&mut self, query: &Query) -> TxnResult<Snapshot> {
        if self.attempt.has_writes() {
            return Err(TxnError::ReadAfterWrite);
        }
        let fetched = query.clone();
        let (node, hash) = self.engine.run(move |state| state.fetch(&fetched))??;
        self.attempt.record_read(query.clone(), hash)?;
        trace!(query = %query, hash = %hash, "recorded read");
        Ok(Snapshot::new(query.path().clone(), node))
    }

    /// Reads the unfiltered value at `path`.
    pub fn read_at(&mut self, path: &Path) -> TxnResult<Snapshot> {
        self.read(&Query::at(path.clone()))
    }

    /// Records an intended write of `value` at `path`.
    ///
    /// Nothing reaches the engine until commit; within this attempt, later
    /// writes to overlapping locations shadow earlier ones.
    pub fn write(&mut self, path: Path, value: TreeValue) {
        trace!(path = %path, "recorded write");
        self.attempt.record_write(path, value);
    }

    pub(crate) fn into_attempt(self) -> Attempt {
        self.attempt
    }
}
