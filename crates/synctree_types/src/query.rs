//! Addressable locations with optional result filtering.

use crate::path::Path;
use crate::value::TreeValue;
use std::fmt;

/// A readable location in the tree, optionally filtered.
///
/// A query addresses the subtree at a path and may restrict how much of it
/// is returned. Two queries are the same read-set key only if both the
/// path and the filter parameters match.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Query {
    path: Path,
    limit_to_first: Option<u32>,
}

impl Query {
    /// Creates an unfiltered query at `path`.
    #[must_use]
    pub fn at(path: Path) -> Self {
        Self {
            path,
            limit_to_first: None,
        }
    }

    /// Restricts the query to the first `count` children (in key order).
    #[must_use]
    pub fn limit_to_first(mut self, count: u32) -> Self {
        self.limit_to_first = Some(count);
        self
    }

    /// Returns the queried path.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Returns the configured child limit, if any.
    #[must_use]
    pub fn limit(&self) -> Option<u32> {
        self.limit_to_first
    }

    /// Applies the query's filter to a fetched subtree.
    #[must_use]
    pub fn apply(&self, value: &TreeValue) -> TreeValue {
        match (self.limit_to_first, value) {
            (Some(count), TreeValue::Branch(children)) => TreeValue::branch(
                children
                    .iter()
                    .take(count as usize)
                    .map(|(k, v)| (k.clone(), v.clone())),
            ),
            _ => value.clone(),
        }
    }
}

impl fmt::Display for Query {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.limit_to_first {
            Some(count) => write!(f, "{} (first {count})", self.path),
            None => write!(f, "{}", self.path),
        }
    }
}
