//! Document
//!
//! The single owner of a tree store and its selection. All structural mutation
//! goes through the write half of one `RwLock`, for the whole logical operation
//! (an import's recursive walk included); readers share the read half. Index
//! paths handed out by the read accessors are snapshots: they are only valid
//! until the next mutation and must be re-resolved from a `NodeId` before use.
//!
//! Each successful mutation records the previous forest with the undo manager
//! and stages the new forest with the persistence gateway. A failed mutation
//! restores the tree and selection it started from.

use crate::error::{ApiError, ImportError, StorageError, TreeError};
use crate::graft::FsGrafter;
use crate::import::{ImportCounter, ImportRecord, Importer, RecordDecoder};
use crate::persistence::PersistenceGateway;
use crate::selection::SelectionTracker;
use crate::tree::{display_name, Forest, Node, NodeTree, TreeStore, UNTITLED};
use crate::types::{IndexPath, NodeId};
use parking_lot::RwLock;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Tree plus selection, always locked together
#[derive(Debug, Default)]
pub struct DocumentState {
    pub store: TreeStore,
    pub selection: SelectionTracker,
}

impl DocumentState {
    pub fn new(store: TreeStore) -> Self {
        Self {
            store,
            selection: SelectionTracker::new(),
        }
    }

    /// Selection-relative insert
    ///
    /// The node goes where `resolve_insertion_path` says and becomes the
    /// selection. A non-directory node then hands the selection back to its
    /// parent, so consecutive leaf adds accumulate under one directory while a
    /// new directory stays selected for nested adds.
    pub fn add_node(&mut self, tree: NodeTree) -> Result<NodeId, TreeError> {
        let path = self.selection.resolve_insertion_path(&self.store, false);
        let is_directory = tree.node.is_directory();
        let id = tree.node.id.clone();
        self.store.insert(tree, &path)?;
        self.selection.select_one(id.clone());
        if !is_directory {
            self.selection.select_parent_of_selection(&self.store);
        }
        debug!(node = %id, path = %path, "Added node");
        Ok(id)
    }
}

/// Removal result applied under the write lock
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct AppliedRemoval {
    pub removed: Vec<NodeId>,
    pub skipped: usize,
}

pub struct Document {
    state: RwLock<DocumentState>,
    counter: ImportCounter,
    gateway: Arc<dyn PersistenceGateway>,
    grafter: FsGrafter,
}

impl Document {
    /// Empty document
    pub fn new(gateway: Arc<dyn PersistenceGateway>) -> Self {
        Self {
            state: RwLock::new(DocumentState::default()),
            counter: ImportCounter::new(),
            gateway,
            grafter: FsGrafter::new(),
        }
    }

    /// Document holding whatever the gateway last saved
    pub fn open(gateway: Arc<dyn PersistenceGateway>) -> Result<Self, ApiError> {
        let forest = gateway.load()?.unwrap_or_default();
        let store = TreeStore::from_forest(forest)?;
        info!(nodes = store.len(), roots = store.root_count(), "Opened document");
        Ok(Self {
            counter: ImportCounter::resume_after(&store),
            state: RwLock::new(DocumentState::new(store)),
            gateway,
            grafter: FsGrafter::new(),
        })
    }

    pub fn with_grafter(mut self, grafter: FsGrafter) -> Self {
        self.grafter = grafter;
        self
    }

    pub fn gateway(&self) -> &Arc<dyn PersistenceGateway> {
        &self.gateway
    }

    pub fn import_counter(&self) -> &ImportCounter {
        &self.counter
    }

    // --- reads -------------------------------------------------------------

    /// Run `f` against the current state under the read lock
    ///
    /// Nothing borrowed from the state can escape the closure.
    pub fn read<R>(&self, f: impl FnOnce(&DocumentState) -> R) -> R {
        let state = self.state.read();
        f(&*state)
    }

    pub fn snapshot(&self) -> Forest {
        self.state.read().store.to_forest()
    }

    pub fn len(&self) -> usize {
        self.state.read().store.len()
    }

    pub fn is_empty(&self) -> bool {
        self.state.read().store.is_empty()
    }

    pub fn path_of(&self, id: &NodeId) -> Option<IndexPath> {
        self.state.read().store.path_of(id)
    }

    pub fn node(&self, id: &NodeId) -> Option<Node> {
        self.state.read().store.node(id).cloned()
    }

    pub fn node_at(&self, path: &IndexPath) -> Option<Node> {
        self.state.read().store.node_at(path).cloned()
    }

    /// Pre-order listing of every node with its current path
    pub fn outline(&self) -> Vec<(IndexPath, Node)> {
        self.state
            .read()
            .store
            .outline()
            .into_iter()
            .map(|(p, n)| (p, n.clone()))
            .collect()
    }

    // --- selection ---------------------------------------------------------

    pub fn selection(&self) -> Vec<NodeId> {
        self.state.read().selection.selected().to_vec()
    }

    pub fn select(&self, ids: Vec<NodeId>) {
        self.state.write().selection.select(ids);
    }

    pub fn select_path(&self, path: &IndexPath) {
        let mut state = self.state.write();
        let DocumentState { store, selection } = &mut *state;
        selection.select_path(path, store);
    }

    pub fn clear_selection(&self) {
        self.state.write().selection.clear();
    }

    pub fn insertion_path(&self, for_new_sibling: bool) -> IndexPath {
        let state = self.state.read();
        state.selection.resolve_insertion_path(&state.store, for_new_sibling)
    }

    // --- mutations ---------------------------------------------------------

    fn mutate<R, E>(
        &self,
        label: &str,
        f: impl FnOnce(&mut DocumentState) -> Result<R, E>,
    ) -> Result<R, E> {
        let mut state = self.state.write();
        let before = state.store.to_forest();
        let selection_before = state.selection.clone();
        match f(&mut *state) {
            Ok(result) => {
                let after = state.store.to_forest();
                if after != before {
                    self.gateway.undo_manager().lock().record(label, before);
                    self.gateway.stage(&after);
                }
                Ok(result)
            }
            Err(e) => {
                match TreeStore::from_forest(before) {
                    Ok(store) => state.store = store,
                    Err(err) => warn!(error = %err, "Could not restore tree after failed edit"),
                }
                let DocumentState { store, selection } = &mut *state;
                *selection = selection_before;
                selection.prune(store);
                Err(e)
            }
        }
    }

    /// Graft a built subtree at an explicit path
    pub fn insert(&self, tree: NodeTree, at: &IndexPath) -> Result<NodeId, ApiError> {
        let id = tree.node.id.clone();
        self.mutate("Insert", |state| {
            state.store.insert(tree, at)?;
            state.selection.select_one(id.clone());
            Ok::<_, TreeError>(())
        })?;
        Ok(id)
    }

    /// Graft a built subtree relative to the selection
    pub fn add_node(&self, tree: NodeTree) -> Result<NodeId, ApiError> {
        Ok(self.mutate("Add", |state| state.add_node(tree))?)
    }

    /// New empty folder relative to the selection
    pub fn add_folder(&self, title: Option<&str>) -> Result<NodeId, ApiError> {
        let node = Node::container(title.unwrap_or(UNTITLED));
        Ok(self.mutate("Add Folder", |state| state.add_node(NodeTree::leaf(node)))?)
    }

    /// New empty folder appended to `parent`'s children
    pub fn add_folder_at(&self, parent: &NodeId, title: Option<&str>) -> Result<NodeId, ApiError> {
        let node = Node::container(title.unwrap_or(UNTITLED));
        let id = node.id.clone();
        self.mutate("Add Folder", |state| {
            let path = state
                .store
                .path_of(parent)
                .ok_or_else(|| TreeError::NodeNotFound(parent.clone()))?;
            let count = state.store.child_count(Some(&path)).unwrap_or(0);
            state.store.insert(NodeTree::leaf(node), &path.appending(count))?;
            state.selection.select_one(id.clone());
            Ok::<_, TreeError>(())
        })?;
        Ok(id)
    }

    /// New document leaf inserted first among `parent`'s children
    ///
    /// With a resource the title is the resource's display name.
    pub fn add_document_at(
        &self,
        parent: &NodeId,
        title: &str,
        resource: Option<PathBuf>,
    ) -> Result<NodeId, ApiError> {
        let node = match resource {
            Some(path) => Node::document(title).with_resource(path),
            None => Node::document(title),
        };
        let id = node.id.clone();
        self.mutate("Add Item", |state| {
            let path = state
                .store
                .path_of(parent)
                .ok_or_else(|| TreeError::NodeNotFound(parent.clone()))?;
            state.store.insert(NodeTree::leaf(node), &path.appending(0))?;
            Ok::<_, TreeError>(())
        })?;
        Ok(id)
    }

    /// Retitle a plain folder; items, import groups and mirrored entries keep their titles
    pub fn rename(&self, id: &NodeId, title: &str) -> Result<(), ApiError> {
        Ok(self.mutate("Rename", |state| {
            let node = state
                .store
                .node(id)
                .ok_or_else(|| TreeError::NodeNotFound(id.clone()))?;
            if !node.can_change() {
                return Err(TreeError::NotEditable(id.clone()));
            }
            state.store.set_title(id, title)
        })?)
    }

    /// Insertion path for a drop onto `target` at `child_index`
    ///
    /// No target means the root level. A missing index means "append".
    pub fn drop_index_path(
        &self,
        target: Option<&NodeId>,
        child_index: Option<usize>,
    ) -> Result<IndexPath, ApiError> {
        let state = self.state.read();
        Ok(Self::resolve_drop(&state.store, target, child_index)?)
    }

    fn resolve_drop(
        store: &TreeStore,
        target: Option<&NodeId>,
        child_index: Option<usize>,
    ) -> Result<IndexPath, TreeError> {
        match target {
            Some(id) => {
                let path = store
                    .path_of(id)
                    .ok_or_else(|| TreeError::NodeNotFound(id.clone()))?;
                let count = store.child_count(Some(&path)).unwrap_or(0);
                Ok(path.appending(child_index.unwrap_or(count)))
            }
            None => Ok(IndexPath::root(child_index.unwrap_or(store.root_count()))),
        }
    }

    /// Move a node to an explicit path (interpreted before the move)
    pub fn move_node(&self, id: &NodeId, to: &IndexPath) -> Result<IndexPath, ApiError> {
        let new_path = self.mutate("Move", |state| state.store.move_node(id, to))?;
        info!(node = %id, to = %new_path, "Moved node");
        Ok(new_path)
    }

    /// Internal drag and drop: the drop path is resolved under the same lock as the move
    pub fn move_by_drop(
        &self,
        id: &NodeId,
        target: Option<&NodeId>,
        child_index: Option<usize>,
    ) -> Result<IndexPath, ApiError> {
        Ok(self.mutate("Move", |state| {
            let to = Self::resolve_drop(&state.store, target, child_index)?;
            state.store.move_node(id, &to)
        })?)
    }

    /// Import already decoded records as a new top-level group
    pub fn import_records(
        &self,
        records: &[ImportRecord],
        root_label: &str,
    ) -> Result<NodeId, ApiError> {
        let counter = &self.counter;
        let root = self.mutate("Import", |state| {
            Importer::import_into(state, records, root_label, counter).map_err(ImportError::from)
        })?;
        Ok(root)
    }

    /// Read, decode and import a file
    ///
    /// Nothing is touched unless the source reads and decodes completely. The
    /// group title defaults to the file name.
    pub fn import_file(
        &self,
        path: &Path,
        decoder: &dyn RecordDecoder,
        root_label: Option<&str>,
    ) -> Result<NodeId, ApiError> {
        let bytes = std::fs::read(path).map_err(|source| ImportError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let decoded = decoder.decode(&bytes)?;
        debug!(
            path = %path.display(),
            format = decoder.format(),
            records = decoded.children.len(),
            "Decoded import source"
        );
        let label = root_label
            .map(str::to_string)
            .unwrap_or_else(|| display_name(path));
        self.import_records(&decoded.children, &label)
    }

    /// Mirror a filesystem resource and graft it at `at`
    ///
    /// The destination is resolved to an identity first, the filesystem is read
    /// without holding the lock, and the destination is re-resolved before the
    /// graft. A destination that disappeared meanwhile fails with `NodeNotFound`.
    pub fn add_filesystem_object(&self, path: &Path, at: &IndexPath) -> Result<NodeId, ApiError> {
        let (parent, index) = self.resolve_destination(at)?;
        let tree = self.grafter.build(path);
        self.graft_at(parent, index, tree)
    }

    /// Same as `add_filesystem_object`, with the filesystem walk on a blocking task
    pub async fn add_filesystem_object_async(
        self: Arc<Self>,
        path: PathBuf,
        at: IndexPath,
    ) -> Result<NodeId, ApiError> {
        let (parent, index) = self.resolve_destination(&at)?;
        let grafter = self.grafter.clone();
        let tree = tokio::task::spawn_blocking(move || grafter.build(&path))
            .await
            .map_err(|e| ApiError::TaskFailed(e.to_string()))?;
        self.graft_at(parent, index, tree)
    }

    fn resolve_destination(&self, at: &IndexPath) -> Result<(Option<NodeId>, usize), TreeError> {
        let index = at.last().ok_or_else(|| TreeError::InvalidPath(at.clone()))?;
        let state = self.state.read();
        match at.parent() {
            None => {
                if index > state.store.root_count() {
                    return Err(TreeError::InvalidPath(at.clone()));
                }
                Ok((None, index))
            }
            Some(parent_path) => {
                let handle = state
                    .store
                    .handle_at(&parent_path)
                    .ok_or_else(|| TreeError::InvalidPath(at.clone()))?;
                let node = state
                    .store
                    .get(handle)
                    .ok_or_else(|| TreeError::InvalidPath(at.clone()))?;
                if !node.is_directory() || index > state.store.children(handle).len() {
                    return Err(TreeError::InvalidPath(at.clone()));
                }
                Ok((Some(node.id.clone()), index))
            }
        }
    }

    fn graft_at(
        &self,
        parent: Option<NodeId>,
        index: usize,
        tree: NodeTree,
    ) -> Result<NodeId, ApiError> {
        let id = tree.node.id.clone();
        let count = tree.count();
        let path = self.mutate("Add Filesystem Item", |state| {
            let parent_handle = match &parent {
                Some(pid) => Some(
                    state
                        .store
                        .handle_of(pid)
                        .ok_or_else(|| TreeError::NodeNotFound(pid.clone()))?,
                ),
                None => None,
            };
            let sibling_count = match parent_handle {
                Some(h) => state.store.children(h).len(),
                None => state.store.root_count(),
            };
            let handle = state
                .store
                .insert_under(parent_handle, index.min(sibling_count), tree)?;
            state.selection.select_one(id.clone());
            state
                .store
                .path_of_handle(handle)
                .ok_or_else(|| TreeError::NodeNotFound(id.clone()))
        })?;
        info!(node = %id, path = %path, nodes = count, "Grafted filesystem object");
        Ok(id)
    }

    /// Mirror the entries of a resource-backed directory that has not been
    /// mirrored yet; returns how many children were added (0 when already done)
    pub fn expand(&self, id: &NodeId) -> Result<usize, ApiError> {
        let dir = {
            let state = self.state.read();
            let node = state
                .store
                .node(id)
                .ok_or_else(|| TreeError::NodeNotFound(id.clone()))?;
            match (&node.resource_ref, node.is_directory(), node.mirrored) {
                (Some(path), true, false) => path.clone(),
                _ => return Ok(0),
            }
        };
        let children = self.grafter.build_children(&dir);
        let added = self.mutate("Expand", |state| {
            let handle = state
                .store
                .handle_of(id)
                .ok_or_else(|| TreeError::NodeNotFound(id.clone()))?;
            // a concurrent expand may have won the race
            if state.store.get(handle).map(|n| n.mirrored).unwrap_or(true) {
                return Ok(0);
            }
            let mut added = 0;
            for child in children {
                let at = state.store.children(handle).len();
                state.store.insert_under(Some(handle), at, child)?;
                added += 1;
            }
            state.store.set_mirrored(handle);
            Ok::<_, TreeError>(added)
        })?;
        debug!(node = %id, added, "Expanded directory");
        Ok(added)
    }

    /// Remove whatever of `ids` still exists, in one atomic pass
    pub(crate) fn apply_removal(&self, ids: &[NodeId]) -> Result<AppliedRemoval, ApiError> {
        Ok(self.mutate("Remove", |state| {
            let mut paths = Vec::with_capacity(ids.len());
            let mut skipped = 0;
            for id in ids {
                match state.store.path_of(id) {
                    Some(path) => paths.push(path),
                    None => skipped += 1,
                }
            }
            let removed = state.store.remove(&paths)?;
            state.selection.clear();
            Ok::<_, TreeError>(AppliedRemoval {
                removed: removed.into_iter().map(|t| t.node.id).collect(),
                skipped,
            })
        })?)
    }

    // --- undo and persistence ---------------------------------------------

    pub fn can_undo(&self) -> bool {
        self.gateway.undo_manager().lock().can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.gateway.undo_manager().lock().can_redo()
    }

    /// Revert the most recent edit; `false` when there is nothing to undo
    pub fn undo(&self) -> Result<bool, ApiError> {
        self.step_history(true)
    }

    /// Re-apply the most recently undone edit
    pub fn redo(&self) -> Result<bool, ApiError> {
        self.step_history(false)
    }

    fn step_history(&self, backwards: bool) -> Result<bool, ApiError> {
        let mut state = self.state.write();
        let current = state.store.to_forest();
        let undo = self.gateway.undo_manager();
        let mut history = undo.lock();
        let target = if backwards {
            history.peek_undo()
        } else {
            history.peek_redo()
        };
        let Some(target) = target.cloned() else {
            return Ok(false);
        };
        // history only moves once the target forest has been rebuilt
        let restored = TreeStore::from_forest(target)?;
        let step = if backwards {
            history.undo(current)
        } else {
            history.redo(current)
        };
        drop(history);
        let Some((label, _)) = step else {
            return Ok(false);
        };
        state.store = restored;
        state.selection.clear();
        self.gateway.stage(&state.store.to_forest());
        info!(action = %label, undo = backwards, "Stepped edit history");
        Ok(true)
    }

    pub fn has_pending_changes(&self) -> bool {
        self.gateway.has_pending_changes()
    }

    /// Commit staged changes; `Ok(false)` when there was nothing to save
    pub fn save(&self) -> Result<bool, ApiError> {
        if !self.gateway.commit_editing() {
            warn!("Unable to commit editing before saving");
            return Err(StorageError::CommitFailure(
                "unable to commit editing before saving".to_string(),
            )
            .into());
        }
        if !self.gateway.has_pending_changes() {
            return Ok(false);
        }
        self.gateway.save()?;
        Ok(true)
    }
}
