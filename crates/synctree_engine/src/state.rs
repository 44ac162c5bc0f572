//! Engine-owned tree state.

use crate::error::{EngineError, EngineResult};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use synctree_types::{Path, Query, TreeValue, ValueHash, WriteId};
use tracing::{debug, trace};

/// The authoritative local state of the synced tree.
///
/// Owned exclusively by the run loop thread; see [`crate::RunLoop`]. All
/// methods here execute on that thread, serialized with every other engine
/// operation, which is what makes hash comparison against fetched state a
/// sound conflict test.
pub struct EngineState {
    /// The locally cached tree.
    root: TreeValue,
    /// Local write sequence, shared with the engine facade so callers can
    /// capture anchors without a run loop round trip.
    write_ids: Arc<AtomicU64>,
    /// Log of applied local writes, in application order.
    write_log: Vec<WriteLogEntry>,
    /// Subtrees rejected by the store's access rules.
    denied_subtrees: Vec<Path>,
    /// Whether the remote store is reachable.
    connected: bool,
    /// Operation counters.
    stats: EngineStats,
}

/// One applied local write, as recorded in the write log.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WriteLogEntry {
    /// Id assigned when the write was applied.
    pub id: WriteId,
    /// The write-sequence anchor the write was submitted with.
    pub anchor: WriteId,
    /// The locations the write touched.
    pub paths: Vec<Path>,
}

/// Counters for engine operations, used by tests and diagnostics.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EngineStats {
    /// Serialized fetches served.
    pub fetches: u64,
    /// Atomic multipath writes applied.
    pub multi_writes: u64,
    /// Plain local writes applied.
    pub local_writes: u64,
    /// Remote updates ingested.
    pub remote_updates: u64,
}

impl EngineState {
    pub(crate) fn new(root: TreeValue, write_ids: Arc<AtomicU64>) -> Self {
        Self {
            root,
            write_ids,
            write_log: Vec::new(),
            denied_subtrees: Vec::new(),
            connected: true,
            stats: EngineStats::default(),
        }
    }

    /// Fetches the current node for `query` together with its content hash.
    pub fn fetch(&mut self, query: &Query) -> EngineResult<(TreeValue, ValueHash)> {
        if !self.connected {
            return Err(EngineError::Disconnected);
        }
        self.stats.fetches += 1;
        let node = query.apply(self.root.get(query.path()));
        let hash = node.content_hash();
        trace!(query = %query, hash = %hash, "fetch");
        Ok((node, hash))
    }

    /// Returns the current value at `path` without touching fetch counters.
    ///
    /// This is a view of the local cache, usable regardless of
    /// connectivity.
    #[must_use]
    pub fn value_at(&self, path: &Path) -> TreeValue {
        self.root.get(path).clone()
    }

    /// Applies a multipath write: every record or none.
    ///
    /// Records apply in order, so later records shadow earlier ones at
    /// overlapping locations. All records are validated against access
    /// rules and connectivity before the first one mutates the tree. The
    /// applied write is logged with `anchor` and the id assigned at
    /// application time.
    pub fn apply_multi_write(
        &mut self,
        writes: &[(Path, TreeValue)],
        anchor: WriteId,
    ) -> EngineResult<WriteId> {
        if !self.connected {
            return Err(EngineError::Disconnected);
        }
        for (path, _) in writes {
            if self.is_denied(path) {
                return Err(EngineError::permission_denied(path.clone()));
            }
        }
        for (path, value) in writes {
            self.root.set(path, value.clone());
        }
        let id = self.allocate_write_id();
        self.write_log.push(WriteLogEntry {
            id,
            anchor,
            paths: writes.iter().map(|(path, _)| path.clone()).collect(),
        });
        self.stats.multi_writes += 1;
        debug!(id = %id, anchor = %anchor, paths = writes.len(), "applied multipath write");
        Ok(id)
    }

    /// Applies a plain (non-transactional) local write.
    pub fn apply_local_write(&mut self, path: Path, value: TreeValue) -> EngineResult<WriteId> {
        if !self.connected {
            return Err(EngineError::Disconnected);
        }
        if self.is_denied(&path) {
            return Err(EngineError::permission_denied(path));
        }
        self.root.set(&path, value);
        let id = self.allocate_write_id();
        self.write_log.push(WriteLogEntry {
            id,
            anchor: id,
            paths: vec![path],
        });
        self.stats.local_writes += 1;
        Ok(id)
    }

    /// Ingests an update pushed down by the sync layer.
    ///
    /// Remote updates do not consume local write ids; the server already
    /// ordered them.
    pub fn apply_remote_update(&mut self, path: &Path, value: TreeValue) {
        self.root.set(path, value);
        self.stats.remote_updates += 1;
        trace!(path = %path, "ingested remote update");
    }

    /// Sets remote-store reachability. Fetches and submissions fail with
    /// [`EngineError::Disconnected`] while unreachable.
    pub fn set_connected(&mut self, connected: bool) {
        self.connected = connected;
    }

    /// Rejects all future writes at or below `path`.
    pub fn deny_writes_under(&mut self, path: Path) {
        self.denied_subtrees.push(path);
    }

    /// Returns the operation counters.
    #[must_use]
    pub fn stats(&self) -> EngineStats {
        self.stats
    }

    /// Returns the applied-write log, oldest first.
    #[must_use]
    pub fn write_log(&self) -> &[WriteLogEntry] {
        &self.write_log
    }

    fn is_denied(&self, path: &Path) -> bool {
        self.denied_subtrees
            .iter()
            .any(|denied| path.starts_with(denied) || denied.starts_with(path))
    }

    fn allocate_write_id(&self) -> WriteId {
        WriteId::new(self.write_ids.fetch_add(1, Ordering::SeqCst))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn state() -> EngineState {
        EngineState::new(TreeValue::Empty, Arc::new(AtomicU64::new(1)))
    }

    fn path(raw: &str) -> Path {
        Path::parse(raw).unwrap()
    }

    #[test]
    fn fetch_returns_node_and_hash() {
        let mut state = state();
        state.apply_remote_update(&path("/counter"), TreeValue::int(5));

        let (node, hash) = state.fetch(&Query::at(path("/counter"))).unwrap();
        assert_eq!(node, TreeValue::int(5));
        assert_eq!(hash, TreeValue::int(5).content_hash());
    }

    #[test]
    fn fetch_fails_when_disconnected() {
        let mut state = state();
        state.set_connected(false);
        let result = state.fetch(&Query::at(Path::root()));
        assert_eq!(result.unwrap_err(), EngineError::Disconnected);
    }

    #[test]
    fn multi_write_applies_all_records_in_order() {
        let mut state = state();
        let writes = vec![
            (path("/a"), TreeValue::int(1)),
            (path("/b"), TreeValue::int(2)),
            (path("/a"), TreeValue::int(3)),
        ];
        state.apply_multi_write(&writes, WriteId::new(1)).unwrap();

        assert_eq!(state.value_at(&path("/a")), TreeValue::int(3));
        assert_eq!(state.value_at(&path("/b")), TreeValue::int(2));
    }

    #[test]
    fn denied_multi_write_leaves_tree_untouched() {
        let mut state = state();
        state.deny_writes_under(path("/locked"));

        let writes = vec![
            (path("/open"), TreeValue::int(1)),
            (path("/locked/x"), TreeValue::int(2)),
        ];
        let result = state.apply_multi_write(&writes, WriteId::new(1));

        assert!(matches!(result, Err(EngineError::PermissionDenied { .. })));
        assert!(state.value_at(&path("/open")).is_empty());
        assert!(state.write_log().is_empty());
    }

    #[test]
    fn deny_covers_ancestor_writes_too() {
        let mut state = state();
        state.deny_writes_under(path("/locked/inner"));

        // Writing an ancestor would replace the protected subtree.
        let result = state.apply_local_write(path("/locked"), TreeValue::int(1));
        assert!(matches!(result, Err(EngineError::PermissionDenied { .. })));
    }

    #[test]
    fn write_log_records_anchor_and_assigned_id() {
        let ids = Arc::new(AtomicU64::new(7));
        let mut state = EngineState::new(TreeValue::Empty, ids);

        let writes = vec![(path("/x"), TreeValue::int(1))];
        let id = state.apply_multi_write(&writes, WriteId::new(3)).unwrap();

        assert_eq!(id, WriteId::new(7));
        let entry = &state.write_log()[0];
        assert_eq!(entry.anchor, WriteId::new(3));
        assert_eq!(entry.id, WriteId::new(7));
        assert_eq!(entry.paths, vec![path("/x")]);
    }

    #[test]
    fn remote_update_does_not_consume_write_ids() {
        let ids = Arc::new(AtomicU64::new(1));
        let mut state = EngineState::new(TreeValue::Empty, Arc::clone(&ids));

        state.apply_remote_update(&path("/r"), TreeValue::int(9));

        assert_eq!(ids.load(Ordering::SeqCst), 1);
        assert_eq!(state.value_at(&path("/r")), TreeValue::int(9));
        assert_eq!(state.stats().remote_updates, 1);
    }
}
