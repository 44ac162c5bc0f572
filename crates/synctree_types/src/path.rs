//! Locations in the synced tree.

use crate::error::{TypeError, TypeResult};
use std::fmt;

/// A location in the hierarchical tree.
///
/// Paths are sequences of non-empty segments. The empty sequence is the
/// tree root. Paths order lexicographically by segment, so an ancestor
/// always sorts before its descendants.
#[derive(Debug, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Path {
    segments: Vec<String>,
}

impl Path {
    /// Returns the root path.
    #[must_use]
    pub fn root() -> Self {
        Self::default()
    }

    /// Parses a path from a `/`-separated string.
    ///
    /// Leading and trailing slashes are ignored; `""` and `"/"` both parse
    /// to the root. Empty interior segments (`"a//b"`) are rejected.
    pub fn parse(raw: &str) -> TypeResult<Self> {
        let trimmed = raw.trim_matches('/');
        if trimmed.is_empty() {
            return Ok(Self::root());
        }
        let mut segments = Vec::new();
        for segment in trimmed.split('/') {
            if segment.is_empty() {
                return Err(TypeError::invalid_path(raw, "empty segment"));
            }
            segments.push(segment.to_string());
        }
        Ok(Self { segments })
    }

    /// Returns the child path under `segment`.
    #[must_use]
    pub fn child(&self, segment: impl Into<String>) -> Self {
        let mut segments = self.segments.clone();
        segments.push(segment.into());
        Self { segments }
    }

    /// Returns the parent path, or `None` for the root.
    #[must_use]
    pub fn parent(&self) -> Option<Self> {
        if self.segments.is_empty() {
            return None;
        }
        let mut segments = self.segments.clone();
        segments.pop();
        Some(Self { segments })
    }

    /// Returns true for the root path.
    #[must_use]
    pub fn is_root(&self) -> bool {
        self.segments.is_empty()
    }

    /// Returns the number of segments.
    #[must_use]
    pub fn depth(&self) -> usize {
        self.segments.len()
    }

    /// Returns the path segments.
    #[must_use]
    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    /// Returns true if `self` is `ancestor` or lies beneath it.
    #[must_use]
    pub fn starts_with(&self, ancestor: &Path) -> bool {
        self.segments.len() >= ancestor.segments.len()
            && self.segments[..ancestor.segments.len()] == ancestor.segments[..]
    }

    /// Returns true if either path contains the other.
    ///
    /// Overlapping paths address overlapping subtrees, so a write to one
    /// shadows (part of) a write to the other.
    #[must_use]
    pub fn overlaps(&self, other: &Path) -> bool {
        self.starts_with(other) || other.starts_with(self)
    }
}

impl fmt::Display for Path {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.segments.is_empty() {
            return write!(f, "/");
        }
        for segment in &self.segments {
            write!(f, "/{segment}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_root_forms() {
        assert!(Path::parse("").unwrap().is_root());
        assert!(Path::parse("/").unwrap().is_root());
        assert!(Path::parse("///").unwrap().is_root());
    }

    #[test]
    fn parse_rejects_empty_segment() {
        assert!(Path::parse("a//b").is_err());
    }

    #[test]
    fn parse_ignores_surrounding_slashes() {
        let a = Path::parse("/users/alice/").unwrap();
        let b = Path::parse("users/alice").unwrap();
        assert_eq!(a, b);
        assert_eq!(a.depth(), 2);
    }

    #[test]
    fn display_round_trips() {
        let path = Path::parse("/a/b/c").unwrap();
        assert_eq!(path.to_string(), "/a/b/c");
        assert_eq!(Path::root().to_string(), "/");
    }

    #[test]
    fn child_and_parent() {
        let base = Path::parse("/a").unwrap();
        let child = base.child("b");
        assert_eq!(child.to_string(), "/a/b");
        assert_eq!(child.parent().unwrap(), base);
        assert!(Path::root().parent().is_none());
    }

    #[test]
    fn starts_with_and_overlaps() {
        let root = Path::root();
        let a = Path::parse("/a").unwrap();
        let ab = Path::parse("/a/b").unwrap();
        let c = Path::parse("/c").unwrap();

        assert!(ab.starts_with(&a));
        assert!(!a.starts_with(&ab));
        assert!(a.starts_with(&root));
        assert!(a.overlaps(&ab));
        assert!(ab.overlaps(&a));
        assert!(!a.overlaps(&c));
    }

    #[test]
    fn ancestor_sorts_before_descendant() {
        let a = Path::parse("/a").unwrap();
        let ab = Path::parse("/a/b").unwrap();
        assert!(a < ab);
    }
}
