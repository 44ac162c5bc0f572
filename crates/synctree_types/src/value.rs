//! Hierarchical tree values and content hashing.

use crate::path::Path;
use sha2::{Digest, Sha256};
use std::collections::BTreeMap;
use std::fmt;

static EMPTY: TreeValue = TreeValue::Empty;

/// A value stored in the synced tree.
///
/// A value is either empty (the absence of data), a scalar leaf, or a
/// branch of named children. Branches never contain empty children:
/// writing an empty value at a location deletes it, and branches that
/// become childless collapse to [`TreeValue::Empty`].
#[derive(Debug, Clone, PartialEq)]
pub enum TreeValue {
    /// Absence of data.
    Empty,
    /// Boolean leaf.
    Bool(bool),
    /// Integer leaf.
    Int(i64),
    /// Floating-point leaf.
    Double(f64),
    /// Text leaf.
    Text(String),
    /// Interior node with named children, ordered by key.
    Branch(BTreeMap<String, TreeValue>),
}

impl TreeValue {
    /// Creates an integer leaf.
    #[must_use]
    pub const fn int(value: i64) -> Self {
        Self::Int(value)
    }

    /// Creates a text leaf.
    #[must_use]
    pub fn text(value: impl Into<String>) -> Self {
        Self::Text(value.into())
    }

    /// Creates a branch from key/value pairs. Empty children are dropped.
    #[must_use]
    pub fn branch<K, I>(children: I) -> Self
    where
        K: Into<String>,
        I: IntoIterator<Item = (K, TreeValue)>,
    {
        let map: BTreeMap<String, TreeValue> = children
            .into_iter()
            .map(|(k, v)| (k.into(), v))
            .filter(|(_, v)| !v.is_empty())
            .collect();
        if map.is_empty() {
            Self::Empty
        } else {
            Self::Branch(map)
        }
    }

    /// Returns true if this value is the absence of data.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        matches!(self, Self::Empty)
    }

    /// Returns the value at `path`, or the empty value if nothing is there.
    #[must_use]
    pub fn get(&self, path: &Path) -> &TreeValue {
        let mut current = self;
        for segment in path.segments() {
            match current {
                Self::Branch(children) => match children.get(segment) {
                    Some(child) => current = child,
                    None => return &EMPTY,
                },
                _ => return &EMPTY,
            }
        }
        current
    }

    /// Replaces the subtree at `path` with `value`.
    ///
    /// Writing a non-empty value below a leaf replaces the leaf with a
    /// branch. Writing an empty value deletes the subtree; branches left
    /// childless collapse to empty, all the way up.
    pub fn set(&mut self, path: &Path, value: TreeValue) {
        if path.is_root() {
            *self = value;
            return;
        }
        if value.is_empty() {
            self.remove(path.segments());
            return;
        }
        self.insert(path.segments(), value);
    }

    fn insert(&mut self, segments: &[String], value: TreeValue) {
        let (head, rest) = match segments.split_first() {
            Some(split) => split,
            None => {
                *self = value;
                return;
            }
        };
        if !matches!(self, Self::Branch(_)) {
            *self = Self::Branch(BTreeMap::new());
        }
        if let Self::Branch(children) = self {
            children
                .entry(head.clone())
                .or_insert(TreeValue::Empty)
                .insert(rest, value);
        }
    }

    fn remove(&mut self, segments: &[String]) {
        let (head, rest) = match segments.split_first() {
            Some(split) => split,
            None => {
                *self = Self::Empty;
                return;
            }
        };
        if let Self::Branch(children) = self {
            if let Some(child) = children.get_mut(head) {
                child.remove(rest);
                if child.is_empty() {
                    children.remove(head);
                }
            }
            if children.is_empty() {
                *self = Self::Empty;
            }
        }
    }

    /// Computes the deterministic content hash of this value.
    ///
    /// The hash is SHA-256 over a canonical byte form: a tag per variant,
    /// big-endian scalar encodings, and length-prefixed keys and children
    /// in key order. Hash equality implies value equality, which is what
    /// makes hash comparison a sound conflict test.
    #[must_use]
    pub fn content_hash(&self) -> ValueHash {
        let mut hasher = Sha256::new();
        self.hash_into(&mut hasher);
        ValueHash(hasher.finalize().into())
    }

    fn hash_into(&self, hasher: &mut Sha256) {
        match self {
            Self::Empty => hasher.update([0u8]),
            Self::Bool(b) => hasher.update([1u8, u8::from(*b)]),
            Self::Int(i) => {
                hasher.update([2u8]);
                hasher.update(i.to_be_bytes());
            }
            Self::Double(d) => {
                hasher.update([3u8]);
                hasher.update(d.to_be_bytes());
            }
            Self::Text(s) => {
                hasher.update([4u8]);
                hasher.update((s.len() as u64).to_be_bytes());
                hasher.update(s.as_bytes());
            }
            Self::Branch(children) => {
                hasher.update([5u8]);
                hasher.update((children.len() as u64).to_be_bytes());
                for (key, child) in children {
                    hasher.update((key.len() as u64).to_be_bytes());
                    hasher.update(key.as_bytes());
                    child.hash_into(hasher);
                }
            }
        }
    }
}

impl From<i64> for TreeValue {
    fn from(value: i64) -> Self {
        Self::Int(value)
    }
}

impl From<bool> for TreeValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<&str> for TreeValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

/// Deterministic content hash of a [`TreeValue`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ValueHash([u8; 32]);

impl ValueHash {
    /// Creates a hash from raw bytes.
    #[must_use]
    pub const fn from_bytes(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    /// Returns the raw hash bytes.
    #[must_use]
    pub const fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }
}

impl fmt::Display for ValueHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for byte in &self.0 {
            write!(f, "{byte:02x}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn path(raw: &str) -> Path {
        Path::parse(raw).unwrap()
    }

    #[test]
    fn get_missing_is_empty() {
        let value = TreeValue::branch([("a", TreeValue::int(1))]);
        assert!(value.get(&path("/b")).is_empty());
        assert!(value.get(&path("/a/b/c")).is_empty());
    }

    #[test]
    fn set_creates_intermediate_branches() {
        let mut root = TreeValue::Empty;
        root.set(&path("/a/b/c"), TreeValue::int(7));
        assert_eq!(root.get(&path("/a/b/c")), &TreeValue::int(7));
    }

    #[test]
    fn set_below_leaf_replaces_leaf() {
        let mut root = TreeValue::Empty;
        root.set(&path("/a"), TreeValue::int(1));
        root.set(&path("/a/b"), TreeValue::int(2));
        assert_eq!(root.get(&path("/a/b")), &TreeValue::int(2));
    }

    #[test]
    fn set_empty_deletes_and_prunes() {
        let mut root = TreeValue::Empty;
        root.set(&path("/a/b"), TreeValue::int(1));
        root.set(&path("/a/b"), TreeValue::Empty);
        assert!(root.is_empty());
    }

    #[test]
    fn set_at_root_replaces_whole_tree() {
        let mut root = TreeValue::branch([("a", TreeValue::int(1))]);
        root.set(&Path::root(), TreeValue::int(9));
        assert_eq!(root, TreeValue::int(9));
    }

    #[test]
    fn branch_drops_empty_children() {
        let value = TreeValue::branch([("a", TreeValue::Empty), ("b", TreeValue::int(1))]);
        assert!(value.get(&path("/a")).is_empty());
        assert_eq!(value.get(&path("/b")), &TreeValue::int(1));
    }

    #[test]
    fn hash_differs_for_different_values() {
        let five = TreeValue::int(5);
        let six = TreeValue::int(6);
        assert_ne!(five.content_hash(), six.content_hash());
    }

    #[test]
    fn hash_distinguishes_types() {
        // Same raw payload bytes, different variant tags.
        assert_ne!(
            TreeValue::int(1).content_hash(),
            TreeValue::Bool(true).content_hash()
        );
        assert_ne!(
            TreeValue::text("1").content_hash(),
            TreeValue::int(1).content_hash()
        );
    }

    #[test]
    fn hash_display_is_hex() {
        let hash = TreeValue::int(5).content_hash().to_string();
        assert_eq!(hash.len(), 64);
        assert!(hash.chars().all(|c| c.is_ascii_hexdigit()));
    }

    fn leaf_strategy() -> impl Strategy<Value = TreeValue> {
        prop_oneof![
            Just(TreeValue::Empty),
            any::<bool>().prop_map(TreeValue::Bool),
            any::<i64>().prop_map(TreeValue::Int),
            "[a-z0-9]{0,12}".prop_map(TreeValue::text),
        ]
    }

    fn value_strategy() -> impl Strategy<Value = TreeValue> {
        leaf_strategy().prop_recursive(3, 24, 4, |inner| {
            prop::collection::btree_map("[a-z]{1,4}", inner, 1..4)
                .prop_map(|children| TreeValue::branch(children))
        })
    }

    proptest! {
        #[test]
        fn equal_values_hash_equal(value in value_strategy()) {
            prop_assert_eq!(value.content_hash(), value.clone().content_hash());
        }

        #[test]
        fn set_then_get_round_trips(
            segments in prop::collection::vec("[a-z]{1,4}", 1..4),
            leaf in any::<i64>(),
        ) {
            let mut target = Path::root();
            for segment in &segments {
                target = target.child(segment.clone());
            }
            let mut root = TreeValue::Empty;
            root.set(&target, TreeValue::int(leaf));
            prop_assert_eq!(root.get(&target), &TreeValue::int(leaf));
        }
    }
}
