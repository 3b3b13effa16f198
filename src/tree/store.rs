//! Tree Store
//!
//! Owns the forest of root nodes as an arena of slots. Ownership flows strictly
//! from parent to child through handle lists; the parent link in each slot is a
//! plain handle and never owns anything. An id index keeps identities unique and
//! lets identity lookups avoid a full tree walk.

use crate::error::TreeError;
use crate::tree::node::{Forest, Node, NodeTree};
use crate::types::{IndexPath, NodeHandle, NodeId};
use std::collections::{HashMap, HashSet};
use tracing::debug;

#[derive(Debug, Clone)]
struct Slot {
    node: Node,
    parent: Option<NodeHandle>,
    children: Vec<NodeHandle>,
}

/// Ordered forest with index-path addressing
#[derive(Debug, Clone, Default)]
pub struct TreeStore {
    slots: Vec<Option<Slot>>,
    free: Vec<usize>,
    roots: Vec<NodeHandle>,
    index: HashMap<NodeId, NodeHandle>,
}

impl TreeStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuild a store from a snapshot
    pub fn from_forest(forest: Forest) -> Result<Self, TreeError> {
        let mut store = Self::new();
        for (i, tree) in forest.into_iter().enumerate() {
            store.insert(tree, &IndexPath::root(i))?;
        }
        Ok(store)
    }

    /// Number of nodes in the whole forest
    pub fn len(&self) -> usize {
        self.index.len()
    }

    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    pub fn root_count(&self) -> usize {
        self.roots.len()
    }

    pub fn roots(&self) -> &[NodeHandle] {
        &self.roots
    }

    pub fn get(&self, handle: NodeHandle) -> Option<&Node> {
        self.slot(handle).map(|s| &s.node)
    }

    pub fn parent(&self, handle: NodeHandle) -> Option<NodeHandle> {
        self.slot(handle).and_then(|s| s.parent)
    }

    pub fn children(&self, handle: NodeHandle) -> &[NodeHandle] {
        self.slot(handle).map(|s| s.children.as_slice()).unwrap_or(&[])
    }

    pub fn contains(&self, id: &NodeId) -> bool {
        self.index.contains_key(id)
    }

    pub fn handle_of(&self, id: &NodeId) -> Option<NodeHandle> {
        self.index.get(id).copied()
    }

    pub fn node(&self, id: &NodeId) -> Option<&Node> {
        self.handle_of(id).and_then(|h| self.get(h))
    }

    /// Resolve an address to a handle; `None` if any level is out of range
    pub fn handle_at(&self, path: &IndexPath) -> Option<NodeHandle> {
        let (&first, rest) = path.indices().split_first()?;
        let mut current = *self.roots.get(first)?;
        for &i in rest {
            current = *self.children(current).get(i)?;
        }
        Some(current)
    }

    pub fn node_at(&self, path: &IndexPath) -> Option<&Node> {
        self.handle_at(path).and_then(|h| self.get(h))
    }

    /// Current structural position of a node, recomputed on every call
    pub fn path_of(&self, id: &NodeId) -> Option<IndexPath> {
        self.handle_of(id).and_then(|h| self.path_of_handle(h))
    }

    pub fn path_of_handle(&self, handle: NodeHandle) -> Option<IndexPath> {
        let mut indices = Vec::new();
        let mut current = handle;
        loop {
            let parent = self.slot(current)?.parent;
            let siblings = match parent {
                Some(p) => self.children(p),
                None => self.roots.as_slice(),
            };
            indices.push(siblings.iter().position(|&h| h == current)?);
            match parent {
                Some(p) => current = p,
                None => break,
            }
        }
        indices.reverse();
        Some(IndexPath::new(indices))
    }

    /// Number of children at an address; `None` addresses the root level
    pub fn child_count(&self, parent: Option<&IndexPath>) -> Option<usize> {
        match parent {
            None => Some(self.roots.len()),
            Some(path) => self.handle_at(path).map(|h| self.children(h).len()),
        }
    }

    /// Children at an address, in order; `None` addresses the root level
    pub fn children_of(&self, parent: Option<&IndexPath>) -> Option<Vec<&Node>> {
        let handles = match parent {
            None => &self.roots[..],
            Some(path) => self.children(self.handle_at(path)?),
        };
        Some(handles.iter().filter_map(|&h| self.get(h)).collect())
    }

    /// Graft a built subtree at `at`
    ///
    /// The last component of `at` is the position among the target parent's
    /// children (among the roots for a one-component path); a value equal to the
    /// child count appends.
    pub fn insert(&mut self, tree: NodeTree, at: &IndexPath) -> Result<NodeHandle, TreeError> {
        let index = at.last().ok_or_else(|| TreeError::InvalidPath(at.clone()))?;
        let parent = match at.parent() {
            None => None,
            Some(parent_path) => {
                let handle = self
                    .handle_at(&parent_path)
                    .ok_or_else(|| TreeError::InvalidPath(at.clone()))?;
                Some(handle)
            }
        };
        self.insert_under(parent, index, tree)
    }

    /// Graft a built subtree as a child of `parent` (a root when `None`)
    ///
    /// Rejected with `InvalidPath` when the parent is not a directory, the index
    /// is past the end, or a non-directory node inside `tree` carries children.
    pub fn insert_under(
        &mut self,
        parent: Option<NodeHandle>,
        index: usize,
        tree: NodeTree,
    ) -> Result<NodeHandle, TreeError> {
        if let Some(p) = parent {
            let accepts_children = self.get(p).map(Node::is_directory).unwrap_or(false);
            if !accepts_children {
                return Err(self.invalid_at(parent, index));
            }
        }
        let sibling_count = match parent {
            Some(p) => self.children(p).len(),
            None => self.roots.len(),
        };
        if index > sibling_count {
            return Err(self.invalid_at(parent, index));
        }
        self.check_ids(&tree)?;
        if let Some(offset) = first_childbearing_leaf(&tree) {
            let mut at = self.path_at(parent, index);
            for i in offset {
                at = at.appending(i);
            }
            return Err(TreeError::InvalidPath(at));
        }

        let handle = self.attach(tree, parent);
        match parent {
            Some(p) => {
                if let Some(slot) = self.slot_mut(p) {
                    slot.children.insert(index, handle);
                }
            }
            None => self.roots.insert(index, handle),
        }
        debug!(index, sibling_count, "Inserted subtree");
        Ok(handle)
    }

    /// Remove a batch of addresses in one pass
    ///
    /// Every path is resolved before anything is detached, so no removal can
    /// shift another target. A target whose ancestor is in the same batch goes
    /// away with that ancestor. Returns the detached subtrees in tree order.
    pub fn remove(&mut self, paths: &[IndexPath]) -> Result<Vec<NodeTree>, TreeError> {
        let mut handles = HashSet::new();
        for path in paths {
            let handle = self
                .handle_at(path)
                .ok_or_else(|| TreeError::InvalidPath(path.clone()))?;
            handles.insert(handle);
        }

        let mut targets: Vec<(IndexPath, NodeHandle)> = handles
            .iter()
            .filter(|&&h| !self.has_ancestor_in(h, &handles))
            .filter_map(|&h| self.path_of_handle(h).map(|p| (p, h)))
            .collect();
        // deepest/rightmost first
        targets.sort_by(|a, b| b.0.cmp(&a.0));

        let mut removed: Vec<NodeTree> = targets
            .into_iter()
            .filter_map(|(_, h)| self.detach(h))
            .collect();
        removed.reverse();
        debug!(requested = paths.len(), removed = removed.len(), "Removed paths");
        Ok(removed)
    }

    /// Detach a node with its subtree and return it as a built tree
    pub fn detach(&mut self, handle: NodeHandle) -> Option<NodeTree> {
        self.unlink(handle)?;
        self.take_subtree(handle)
    }

    /// Move a node (with its subtree) to the position named by `to`
    ///
    /// `to` is interpreted against the tree as it is before the move. Returns the
    /// node's new path.
    pub fn move_node(&mut self, id: &NodeId, to: &IndexPath) -> Result<IndexPath, TreeError> {
        let handle = self
            .handle_of(id)
            .ok_or_else(|| TreeError::NodeNotFound(id.clone()))?;
        let mut index = to.last().ok_or_else(|| TreeError::InvalidPath(to.clone()))?;
        let dest_parent = match to.parent() {
            None => None,
            Some(parent_path) => Some(
                self.handle_at(&parent_path)
                    .ok_or_else(|| TreeError::InvalidPath(to.clone()))?,
            ),
        };
        if let Some(p) = dest_parent {
            if p == handle || self.is_descendant_of(p, handle) {
                return Err(TreeError::MoveIntoDescendant(id.clone()));
            }
            if !self.get(p).map(Node::is_directory).unwrap_or(false) {
                return Err(TreeError::InvalidPath(to.clone()));
            }
        }
        let dest_count = match dest_parent {
            Some(p) => self.children(p).len(),
            None => self.roots.len(),
        };
        if index > dest_count {
            return Err(TreeError::InvalidPath(to.clone()));
        }

        let (old_parent, old_index) = self
            .unlink(handle)
            .ok_or_else(|| TreeError::NodeNotFound(id.clone()))?;
        if old_parent == dest_parent && old_index < index {
            index -= 1;
        }
        match dest_parent {
            Some(p) => {
                if let Some(slot) = self.slot_mut(p) {
                    slot.children.insert(index, handle);
                }
            }
            None => self.roots.insert(index, handle),
        }
        if let Some(slot) = self.slot_mut(handle) {
            slot.parent = dest_parent;
        }
        self.path_of_handle(handle)
            .ok_or_else(|| TreeError::NodeNotFound(id.clone()))
    }

    pub fn set_title(&mut self, id: &NodeId, title: impl Into<String>) -> Result<(), TreeError> {
        let handle = self
            .handle_of(id)
            .ok_or_else(|| TreeError::NodeNotFound(id.clone()))?;
        if let Some(slot) = self.slot_mut(handle) {
            slot.node.title = title.into();
        }
        Ok(())
    }

    pub fn set_mirrored(&mut self, handle: NodeHandle) {
        if let Some(slot) = self.slot_mut(handle) {
            slot.node.mirrored = true;
        }
    }

    /// Copy of the subtree rooted at `handle`
    pub fn subtree(&self, handle: NodeHandle) -> Option<NodeTree> {
        let slot = self.slot(handle)?;
        let children = slot
            .children
            .iter()
            .filter_map(|&c| self.subtree(c))
            .collect();
        Some(NodeTree::with_children(slot.node.clone(), children))
    }

    /// Snapshot of the whole forest
    pub fn to_forest(&self) -> Forest {
        self.roots.iter().filter_map(|&h| self.subtree(h)).collect()
    }

    /// Pre-order listing of every node with its current path
    pub fn outline(&self) -> Vec<(IndexPath, &Node)> {
        let mut out = Vec::with_capacity(self.len());
        for (i, &root) in self.roots.iter().enumerate() {
            self.collect_outline(root, IndexPath::root(i), &mut out);
        }
        out
    }

    fn collect_outline<'a>(
        &'a self,
        handle: NodeHandle,
        path: IndexPath,
        out: &mut Vec<(IndexPath, &'a Node)>,
    ) {
        let Some(slot) = self.slot(handle) else {
            return;
        };
        out.push((path.clone(), &slot.node));
        for (i, &child) in slot.children.iter().enumerate() {
            self.collect_outline(child, path.appending(i), out);
        }
    }

    fn slot(&self, handle: NodeHandle) -> Option<&Slot> {
        self.slots.get(handle.0).and_then(Option::as_ref)
    }

    fn slot_mut(&mut self, handle: NodeHandle) -> Option<&mut Slot> {
        self.slots.get_mut(handle.0).and_then(Option::as_mut)
    }

    fn path_at(&self, parent: Option<NodeHandle>, index: usize) -> IndexPath {
        match parent.and_then(|p| self.path_of_handle(p)) {
            Some(p) => p.appending(index),
            None => IndexPath::root(index),
        }
    }

    fn invalid_at(&self, parent: Option<NodeHandle>, index: usize) -> TreeError {
        TreeError::InvalidPath(self.path_at(parent, index))
    }

    fn check_ids(&self, tree: &NodeTree) -> Result<(), TreeError> {
        let mut seen = HashSet::new();
        let mut duplicate = None;
        tree.walk(&mut |node| {
            if duplicate.is_none() && (self.index.contains_key(&node.id) || !seen.insert(&node.id)) {
                duplicate = Some(node.id.clone());
            }
        });
        match duplicate {
            Some(id) => Err(TreeError::DuplicateId(id)),
            None => Ok(()),
        }
    }

    fn attach(&mut self, tree: NodeTree, parent: Option<NodeHandle>) -> NodeHandle {
        let NodeTree { node, children } = tree;
        let id = node.id.clone();
        let slot = Slot {
            node,
            parent,
            children: Vec::with_capacity(children.len()),
        };
        let handle = match self.free.pop() {
            Some(i) => {
                self.slots[i] = Some(slot);
                NodeHandle(i)
            }
            None => {
                self.slots.push(Some(slot));
                NodeHandle(self.slots.len() - 1)
            }
        };
        self.index.insert(id, handle);
        for child in children {
            let child_handle = self.attach(child, Some(handle));
            if let Some(slot) = self.slot_mut(handle) {
                slot.children.push(child_handle);
            }
        }
        handle
    }

    /// Remove `handle` from its parent's child list (or the roots)
    fn unlink(&mut self, handle: NodeHandle) -> Option<(Option<NodeHandle>, usize)> {
        let parent = self.slot(handle)?.parent;
        let siblings = match parent {
            Some(p) => &mut self.slot_mut(p)?.children,
            None => &mut self.roots,
        };
        let position = siblings.iter().position(|&h| h == handle)?;
        siblings.remove(position);
        Some((parent, position))
    }

    fn take_subtree(&mut self, handle: NodeHandle) -> Option<NodeTree> {
        let slot = self.slots.get_mut(handle.0)?.take()?;
        self.free.push(handle.0);
        self.index.remove(&slot.node.id);
        let children = slot
            .children
            .into_iter()
            .filter_map(|c| self.take_subtree(c))
            .collect();
        Some(NodeTree::with_children(slot.node, children))
    }

    fn has_ancestor_in(&self, handle: NodeHandle, set: &HashSet<NodeHandle>) -> bool {
        let mut current = self.parent(handle);
        while let Some(p) = current {
            if set.contains(&p) {
                return true;
            }
            current = self.parent(p);
        }
        false
    }

    fn is_descendant_of(&self, handle: NodeHandle, ancestor: NodeHandle) -> bool {
        let mut current = self.parent(handle);
        while let Some(p) = current {
            if p == ancestor {
                return true;
            }
            current = self.parent(p);
        }
        false
    }
}

/// Relative position of the first non-directory node that carries children
fn first_childbearing_leaf(tree: &NodeTree) -> Option<Vec<usize>> {
    if !tree.children.is_empty() && !tree.node.is_directory() {
        return Some(Vec::new());
    }
    tree.children.iter().enumerate().find_map(|(i, child)| {
        let mut offset = first_childbearing_leaf(child)?;
        offset.insert(0, i);
        Some(offset)
    })
}
