//! Core types for the outline document engine.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// NodeId: opaque, stable identity of a node, independent of its position
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeId(String);

impl NodeId {
    pub fn new(id: impl Into<String>) -> Self {
        NodeId(id.into())
    }

    /// Fresh random identity (UUID v4, uppercase hyphenated)
    pub fn fresh() -> Self {
        NodeId(uuid::Uuid::new_v4().hyphenated().to_string().to_uppercase())
    }

    /// Identity of the `n`-th top-level import group
    pub fn import_root(n: u64) -> Self {
        NodeId(format!("root.{}", n))
    }

    /// Counter value `n` when this id is in the reserved `root.<n>` namespace
    pub fn import_root_index(&self) -> Option<u64> {
        let digits = self.0.strip_prefix("root.")?;
        if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }
        digits.parse().ok()
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for NodeId {
    fn from(s: &str) -> Self {
        NodeId(s.to_string())
    }
}

/// NodeHandle: arena slot of a node inside one `TreeStore`
///
/// Handles are never exposed across a mutation boundary by the document API;
/// they are only meaningful to the store that issued them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeHandle(pub(crate) usize);

/// IndexPath: position-based address `[i0, i1, ..., ik]` descending from the roots
///
/// Not an identity. Any insert or remove before it makes it stale, so it must be
/// resolved fresh from a `NodeId` right before use.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct IndexPath(Vec<usize>);

impl IndexPath {
    pub fn new(indices: Vec<usize>) -> Self {
        IndexPath(indices)
    }

    pub fn root(index: usize) -> Self {
        IndexPath(vec![index])
    }

    pub fn indices(&self) -> &[usize] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn last(&self) -> Option<usize> {
        self.0.last().copied()
    }

    /// Path of the parent, `None` for a top-level path (or the empty path)
    pub fn parent(&self) -> Option<IndexPath> {
        if self.0.len() < 2 {
            return None;
        }
        Some(IndexPath(self.0[..self.0.len() - 1].to_vec()))
    }

    /// New path one level deeper
    pub fn appending(&self, index: usize) -> IndexPath {
        let mut indices = self.0.clone();
        indices.push(index);
        IndexPath(indices)
    }

    /// Same parent, next position
    pub fn next_sibling(&self) -> Option<IndexPath> {
        let mut indices = self.0.clone();
        let last = indices.last_mut()?;
        *last += 1;
        Some(IndexPath(indices))
    }

    /// True when `self` names `other` or one of its ancestors
    pub fn is_prefix_of(&self, other: &IndexPath) -> bool {
        other.0.len() >= self.0.len() && other.0[..self.0.len()] == self.0[..]
    }
}

impl From<Vec<usize>> for IndexPath {
    fn from(indices: Vec<usize>) -> Self {
        IndexPath(indices)
    }
}

impl fmt::Display for IndexPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self.0.iter().map(|i| i.to_string()).collect();
        f.write_str(&parts.join("."))
    }
}

impl FromStr for IndexPath {
    type Err = String;

    /// Parses the dotted form produced by `Display`, e.g. `0.3.1`
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if trimmed.is_empty() {
            return Err("index path is empty".to_string());
        }
        trimmed
            .split('.')
            .map(|part| {
                part.parse::<usize>()
                    .map_err(|e| format!("invalid index '{}' in path '{}': {}", part, s, e))
            })
            .collect::<Result<Vec<_>, _>>()
            .map(IndexPath)
    }
}
