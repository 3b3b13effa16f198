//! Selection Tracker
//!
//! Holds the current selection as node identities. Paths are never cached: they
//! are re-resolved against the store every time a caller asks for one.

use crate::tree::TreeStore;
use crate::types::{IndexPath, NodeId};

#[derive(Debug, Clone, Default)]
pub struct SelectionTracker {
    selected: Vec<NodeId>,
}

impl SelectionTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn clear(&mut self) {
        self.selected.clear();
    }

    pub fn is_empty(&self) -> bool {
        self.selected.is_empty()
    }

    /// Replace the selection; order is kept and the first entry wins tie-breaks
    pub fn select(&mut self, ids: Vec<NodeId>) {
        self.selected = ids;
    }

    pub fn select_one(&mut self, id: NodeId) {
        self.selected = vec![id];
    }

    /// Select whatever currently lives at `path`; clears on an unresolved path
    pub fn select_path(&mut self, path: &IndexPath, store: &TreeStore) {
        match store.node_at(path) {
            Some(node) => self.select_one(node.id.clone()),
            None => self.clear(),
        }
    }

    pub fn selected(&self) -> &[NodeId] {
        &self.selected
    }

    pub fn first(&self) -> Option<&NodeId> {
        self.selected.first()
    }

    /// Current paths of the selected nodes that still exist
    pub fn selected_paths(&self, store: &TreeStore) -> Vec<IndexPath> {
        self.selected
            .iter()
            .filter_map(|id| store.path_of(id))
            .collect()
    }

    /// Where a new node goes given the current selection
    ///
    /// No selection: append as the last root. Otherwise: last child of the first
    /// selected node. With `for_new_sibling`, or when the first selected node
    /// cannot own children, the position right after it among its siblings.
    pub fn resolve_insertion_path(&self, store: &TreeStore, for_new_sibling: bool) -> IndexPath {
        let append_root = IndexPath::root(store.root_count());
        let Some(first) = self.first() else {
            return append_root;
        };
        let (Some(handle), Some(path)) = (store.handle_of(first), store.path_of(first)) else {
            return append_root;
        };
        let is_directory = store.get(handle).map(|n| n.is_directory()).unwrap_or(false);
        if for_new_sibling || !is_directory {
            return path.next_sibling().unwrap_or(append_root);
        }
        path.appending(store.children(handle).len())
    }

    /// Move the selection from the first selected node up to its parent
    ///
    /// A selected root (or a selection that no longer resolves) clears it.
    pub fn select_parent_of_selection(&mut self, store: &TreeStore) {
        let Some(first) = self.first() else {
            return;
        };
        let parent = store
            .handle_of(first)
            .and_then(|h| store.parent(h))
            .and_then(|p| store.get(p))
            .map(|n| n.id.clone());
        match parent {
            Some(id) => self.select_one(id),
            None => self.clear(),
        }
    }

    /// Make `id`'s parent the sole selection (cleared if `id` is a root)
    pub fn select_parent_of(&mut self, id: &NodeId, store: &TreeStore) {
        self.select_one(id.clone());
        self.select_parent_of_selection(store);
    }

    /// Drop identities that no longer resolve
    pub fn prune(&mut self, store: &TreeStore) {
        self.selected.retain(|id| store.contains(id));
    }
}
