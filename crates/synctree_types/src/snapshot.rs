//! User-facing read results.

use crate::path::Path;
use crate::value::TreeValue;

/// An immutable view of the data at a location, as observed by a read.
///
/// Snapshot construction is a pure conversion from a fetched node; it
/// performs no engine calls and holds no engine state.
#[derive(Debug, Clone, PartialEq)]
pub struct Snapshot {
    path: Path,
    value: TreeValue,
}

impl Snapshot {
    /// Creates a snapshot of `value` at `path`.
    #[must_use]
    pub fn new(path: Path, value: TreeValue) -> Self {
        Self { path, value }
    }

    /// Returns the location this snapshot was taken at.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Returns the observed value.
    #[must_use]
    pub fn value(&self) -> &TreeValue {
        &self.value
    }

    /// Returns true if any data existed at the location.
    #[must_use]
    pub fn exists(&self) -> bool {
        !self.value.is_empty()
    }

    /// Consumes the snapshot, returning the observed value.
    #[must_use]
    pub fn into_value(self) -> TreeValue {
        self.value
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exists_reflects_value() {
        let path = Path::parse("/counter").unwrap();
        assert!(Snapshot::new(path.clone(), TreeValue::int(5)).exists());
        assert!(!Snapshot::new(path, TreeValue::Empty).exists());
    }

    #[test]
    fn into_value_returns_observed_value() {
        let snapshot = Snapshot::new(Path::root(), TreeValue::text("hello"));
        assert_eq!(snapshot.into_value(), TreeValue::text("hello"));
    }
}
