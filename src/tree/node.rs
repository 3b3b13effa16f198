//! Node types and detached subtrees

use crate::types::NodeId;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use unicode_normalization::UnicodeNormalization;

/// Title given to folders created without a name
pub const UNTITLED: &str = "untitled";

/// Node type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum NodeType {
    Container,
    Document,
    Separator,
    Root,
    #[default]
    Unknown,
}

impl NodeType {
    /// Leaves never own children
    pub fn is_leaf(self) -> bool {
        matches!(self, NodeType::Document | NodeType::Separator)
    }

    /// Directory-type nodes may own children
    pub fn is_directory(self) -> bool {
        matches!(self, NodeType::Container | NodeType::Root)
    }
}

/// Node payload: everything about a node except its structural links
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Node {
    pub id: NodeId,
    #[serde(rename = "type")]
    pub node_type: NodeType,
    pub title: String,
    /// External resource this node mirrors, if any
    #[serde(default)]
    pub resource_ref: Option<PathBuf>,
    /// Resource-backed directory whose entries have already been grafted
    #[serde(default)]
    pub mirrored: bool,
}

impl Node {
    pub fn new(node_type: NodeType, title: impl Into<String>, id: NodeId) -> Self {
        Self {
            id,
            node_type,
            title: title.into(),
            resource_ref: None,
            mirrored: false,
        }
    }

    /// Empty folder with a fresh identity
    pub fn container(title: impl Into<String>) -> Self {
        Self::new(NodeType::Container, title, NodeId::fresh())
    }

    /// Leaf item with a fresh identity
    pub fn document(title: impl Into<String>) -> Self {
        Self::new(NodeType::Document, title, NodeId::fresh())
    }

    /// Top-level import group
    pub fn root(title: impl Into<String>, counter: u64) -> Self {
        Self::new(NodeType::Root, title, NodeId::import_root(counter))
    }

    /// Attach a resource; the title is rederived from the resource name
    pub fn with_resource(mut self, path: PathBuf) -> Self {
        self.title = display_name(&path);
        self.resource_ref = Some(path);
        self
    }

    pub fn is_leaf(&self) -> bool {
        self.node_type.is_leaf()
    }

    pub fn is_directory(&self) -> bool {
        self.node_type.is_directory()
    }

    pub fn is_resource_backed(&self) -> bool {
        self.resource_ref.is_some()
    }

    pub fn is_root(&self) -> bool {
        self.node_type == NodeType::Root
    }

    /// Only plain folders can be renamed
    pub fn can_change(&self) -> bool {
        self.is_directory() && !self.is_resource_backed() && !self.is_root()
    }
}

/// Display name of a resource: its last path component, NFC-normalized
pub fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().nfc().collect())
        .unwrap_or_else(|| path.to_string_lossy().nfc().collect())
}

/// A fully built subtree that is not attached to any store
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeTree {
    pub node: Node,
    #[serde(default)]
    pub children: Vec<NodeTree>,
}

impl NodeTree {
    pub fn leaf(node: Node) -> Self {
        Self {
            node,
            children: Vec::new(),
        }
    }

    pub fn with_children(node: Node, children: Vec<NodeTree>) -> Self {
        Self { node, children }
    }

    /// Number of nodes in this subtree, itself included
    pub fn count(&self) -> usize {
        1 + self.children.iter().map(NodeTree::count).sum::<usize>()
    }

    /// Pre-order walk over every node payload
    pub fn walk<'a>(&'a self, visit: &mut dyn FnMut(&'a Node)) {
        visit(&self.node);
        for child in &self.children {
            child.walk(visit);
        }
    }
}

/// Whole-document snapshot: the ordered roots with their subtrees
pub type Forest = Vec<NodeTree>;
