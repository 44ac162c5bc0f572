//! The engine facade handed to clients of the synced tree.

use crate::error::EngineResult;
use crate::run_loop::RunLoop;
use crate::state::{EngineState, EngineStats, WriteLogEntry};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use synctree_types::{Path, Query, TreeValue, ValueHash, WriteId};

/// Handle to the synced-tree engine.
///
/// The engine owns its state through a [`RunLoop`]; this handle is the only
/// way to reach it. It is cheap to share behind an `Arc` and safe to call
/// from any thread: every operation is marshaled onto the run loop and the
/// calling thread blocks on the handoff, never the loop itself.
pub struct SyncedEngine {
    run_loop: RunLoop,
    write_ids: Arc<AtomicU64>,
}

impl SyncedEngine {
    /// Creates an engine with an empty tree.
    #[must_use]
    pub fn new() -> Self {
        Self::with_root(TreeValue::Empty)
    }

    /// Creates an engine seeded with `root` as the cached tree.
    #[must_use]
    pub fn with_root(root: TreeValue) -> Self {
        let write_ids = Arc::new(AtomicU64::new(1));
        let state = EngineState::new(root, Arc::clone(&write_ids));
        Self {
            run_loop: RunLoop::spawn(state),
            write_ids,
        }
    }

    /// Allocates the next id in the local write sequence.
    ///
    /// Callable from any thread without a run loop round trip. Transaction
    /// attempts capture this as their write-sequence anchor.
    #[must_use]
    pub fn next_write_id(&self) -> WriteId {
        WriteId::new(self.write_ids.fetch_add(1, Ordering::SeqCst))
    }

    /// Runs `f` on the engine's serialized execution context and hands the
    /// result back to the calling thread.
    pub fn run<R, F>(&self, f: F) -> EngineResult<R>
    where
        R: Send + 'static,
        F: FnOnce(&mut EngineState) -> R + Send + 'static,
    {
        self.run_loop.run(f)
    }

    /// Fetches the current node for `query` with its content hash.
    pub fn fetch(&self, query: &Query) -> EngineResult<(TreeValue, ValueHash)> {
        let query = query.clone();
        self.run(move |state| state.fetch(&query))?
    }

    /// Submits an atomic multipath write anchored at `anchor`.
    pub fn submit_multi_write(
        &self,
        writes: Vec<(Path, TreeValue)>,
        anchor: WriteId,
    ) -> EngineResult<WriteId> {
        self.run(move |state| state.apply_multi_write(&writes, anchor))?
    }

    /// Applies a plain local write outside any transaction.
    pub fn apply_local_write(&self, path: Path, value: TreeValue) -> EngineResult<WriteId> {
        self.run(move |state| state.apply_local_write(path, value))?
    }

    /// Ingests a remote update, as the sync layer would.
    pub fn apply_remote_update(&self, path: Path, value: TreeValue) -> EngineResult<()> {
        self.run(move |state| state.apply_remote_update(&path, value))
    }

    /// Returns the current value at `path`.
    pub fn current_value(&self, path: &Path) -> EngineResult<TreeValue> {
        let path = path.clone();
        self.run(move |state| state.value_at(&path))
    }

    /// Sets remote-store reachability.
    pub fn set_connected(&self, connected: bool) -> EngineResult<()> {
        self.run(move |state| state.set_connected(connected))
    }

    /// Rejects all future writes at or below `path`.
    pub fn deny_writes_under(&self, path: Path) -> EngineResult<()> {
        self.run(move |state| state.deny_writes_under(path))
    }

    /// Returns a copy of the operation counters.
    pub fn stats(&self) -> EngineResult<EngineStats> {
        self.run(|state| state.stats())
    }

    /// Returns a copy of the applied-write log, oldest first.
    pub fn write_log(&self) -> EngineResult<Vec<WriteLogEntry>> {
        self.run(|state| state.write_log().to_vec())
    }
}

impl Default for SyncedEngine {
    fn default() -> Self {
        Self::new()
    }
}
