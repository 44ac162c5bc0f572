//! Per-attempt read/write bookkeeping.

use crate::error::{TxnError, TxnResult};
use synctree_types::{Path, Query, TreeValue, ValueHash, WriteId};

/// State tracked for one run of a transaction callback.
///
/// An attempt owns the queries read (with the hash observed for each), the
/// writes proposed, and the write-sequence anchor captured when the attempt
/// began. It is owned by exactly one callback execution; a retry discards
/// it and starts over with a fresh one.
///
/// Reads and writes are strictly phase-ordered: once any write is
/// recorded, recording a read is an error.
#[derive(Debug)]
pub struct Attempt {
    anchor: WriteId,
    reads: Vec<ReadRecord>,
    writes: Vec<WriteRecord>,
}

/// A query read during an attempt and the hash observed at read time.
///
/// The hash is captured the moment data is fetched; it is the optimistic
/// version this attempt depends on.
#[derive(Debug, Clone)]
pub struct ReadRecord {
    query: Query,
    hash: ValueHash,
}

impl ReadRecord {
    /// Returns the query that was read.
    #[must_use]
    pub fn query(&self) -> &Query {
        &self.query
    }

    /// Returns the hash observed at read time.
    #[must_use]
    pub fn hash(&self) -> ValueHash {
        self.hash
    }
}

/// An intended mutation recorded during an attempt.
#[derive(Debug, Clone)]
pub struct WriteRecord {
    path: Path,
    value: TreeValue,
}

impl WriteRecord {
    /// Returns the location to be written.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Returns the proposed value.
    #[must_use]
    pub fn value(&self) -> &TreeValue {
        &self.value
    }
}

impl Attempt {
    pub(crate) fn new(anchor: WriteId) -> Self {
        Self {
            anchor,
            reads: Vec::new(),
            writes: Vec::new(),
        }
    }

    /// Returns the write-sequence anchor captured at attempt start.
    #[must_use]
    pub fn anchor(&self) -> WriteId {
        self.anchor
    }

    /// Records a read and the hash observed for it.
    ///
    /// A re-read of the same query replaces the recorded hash (the most
    /// recent read wins); distinct queries accumulate independent records.
    /// Fails with [`TxnError::ReadAfterWrite`] once any write exists.
    pub fn record_read(&mut self, query: Query, hash: ValueHash) -> TxnResult<()> {
        if !self.writes.is_empty() {
            return Err(TxnError::ReadAfterWrite);
        }
        if let Some(existing) = self.reads.iter_mut().find(|r| r.query == query) {
            existing.hash = hash;
        } else {
            self.reads.push(ReadRecord { query, hash });
        }
        Ok(())
    }

    /// Records an intended write. Insertion order is preserved; later
    /// writes to overlapping locations shadow earlier ones.
    pub fn record_write(&mut self, path: Path, value: TreeValue) {
        self.writes.push(WriteRecord { path, value });
    }

    /// Returns true once any write has been recorded.
    #[must_use]
    pub fn has_writes(&self) -> bool {
        !self.writes.is_empty()
    }

    /// Returns the recorded reads, in first-read order.
    #[must_use]
    pub fn reads(&self) -> &[ReadRecord] {
        &self.reads
    }

    /// Returns the recorded writes, in insertion order.
    #[must_use]
    pub fn writes(&self) -> &[WriteRecord] {
        &self.writes
    }

    /// Composes the write records into one multipath update.
    ///
    /// Records at an identical path collapse to the latest one, placed at
    /// the latest position so that applying the result in order gives the
    /// same tree as applying the original records in order.
    #[must_use]
    pub fn composed_writes(&self) -> Vec<(Path, TreeValue)> {
        let mut composed: Vec<(Path, TreeValue)> = Vec::new();
        for record in &self.writes {
            composed.retain(|(path, _)| path != record.path());
            composed.push((record.path.clone(), record.value.clone()));
        }
        composed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn path(raw: &str) -> Path {
        Path::parse(raw).unwrap()
    }

    fn hash_of(value: &TreeValue) -> ValueHash {
        value.content_hash()
    }

    #[test]
    fn reads_accumulate_per_query() {
        let mut attempt = Attempt::new(WriteId::new(1));
        attempt
            .record_read(Query::at(path("/a")), hash_of(&TreeValue::int(1)))
            .unwrap();
        attempt
            .record_read(Query::at(path("/b")), hash_of(&TreeValue::int(2)))
            .unwrap();
        assert_eq!(attempt.reads().len(), 2);
    }

    #[test]
    fn reread_updates_hash_in_place() {
        let mut attempt = Attempt::new(WriteId::new(1));
        let query = Query::at(path("/a"));
        attempt
            .record_read(query.clone(), hash_of(&TreeValue::int(1)))
            .unwrap();
        attempt
            .record_read(query.clone(), hash_of(&TreeValue::int(2)))
            .unwrap();

        assert_eq!(attempt.reads().len(), 1);
        assert_eq!(attempt.reads()[0].hash(), hash_of(&TreeValue::int(2)));
    }

    #[test]
    fn same_path_different_filter_is_a_distinct_record() {
        let mut attempt = Attempt::new(WriteId::new(1));
        let plain = Query::at(path("/items"));
        let limited = Query::at(path("/items")).limit_to_first(1);
        attempt
            .record_read(plain, hash_of(&TreeValue::int(1)))
            .unwrap();
        attempt
            .record_read(limited, hash_of(&TreeValue::int(2)))
            .unwrap();
        assert_eq!(attempt.reads().len(), 2);
    }

    #[test]
    fn read_after_write_is_rejected() {
        let mut attempt = Attempt::new(WriteId::new(1));
        attempt.record_write(path("/a"), TreeValue::int(1));

        let result = attempt.record_read(Query::at(path("/b")), hash_of(&TreeValue::int(2)));
        assert!(matches!(result, Err(TxnError::ReadAfterWrite)));
        assert!(attempt.reads().is_empty());
    }

    #[test]
    fn composed_writes_collapse_identical_paths_to_latest() {
        let mut attempt = Attempt::new(WriteId::new(1));
        attempt.record_write(path("/a"), TreeValue::int(1));
        attempt.record_write(path("/b"), TreeValue::int(2));
        attempt.record_write(path("/a"), TreeValue::int(3));

        let composed = attempt.composed_writes();
        assert_eq!(
            composed,
            vec![
                (path("/b"), TreeValue::int(2)),
                (path("/a"), TreeValue::int(3)),
            ]
        );
    }

    #[test]
    fn composed_writes_keep_overlapping_ancestors_in_order() {
        let mut attempt = Attempt::new(WriteId::new(1));
        attempt.record_write(path("/a/b"), TreeValue::int(1));
        attempt.record_write(path("/a"), TreeValue::branch([("c", TreeValue::int(2))]));
        attempt.record_write(path("/a/b"), TreeValue::int(3));

        // Apply the composition in order: the ancestor write lands first,
        // the surviving /a/b write lands after it.
        let mut root = TreeValue::Empty;
        for (p, v) in attempt.composed_writes() {
            root.set(&p, v);
        }
        assert_eq!(root.get(&path("/a/b")), &TreeValue::int(3));
        assert_eq!(root.get(&path("/a/c")), &TreeValue::int(2));
    }

    fn write_strategy() -> impl Strategy<Value = (Vec<String>, i64)> {
        (prop::collection::vec("[ab]", 1..3), any::<i64>())
    }

    proptest! {
        // Composition must be invisible: applying the composed update in
        // order always produces the same tree as replaying every record.
        #[test]
        fn composition_preserves_sequential_semantics(
            writes in prop::collection::vec(write_strategy(), 1..12)
        ) {
            let mut attempt = Attempt::new(WriteId::new(1));
            let mut replayed = TreeValue::Empty;
            for (segments, leaf) in &writes {
                let mut target = Path::root();
                for segment in segments {
                    target = target.child(segment.clone());
                }
                attempt.record_write(target.clone(), TreeValue::int(*leaf));
                replayed.set(&target, TreeValue::int(*leaf));
            }

            let mut composed_tree = TreeValue::Empty;
            for (p, v) in attempt.composed_writes() {
                composed_tree.set(&p, v);
            }
            prop_assert_eq!(composed_tree, replayed);
        }
    }
}
