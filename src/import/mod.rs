//! Importer
//!
//! Grafts an externally decoded record tree into the document as one new
//! top-level group. Records are materialized in input order through the
//! document's selection-relative add policy; separator records are dropped
//! together with everything below them.

pub mod decoder;

use crate::document::DocumentState;
use crate::error::TreeError;
use crate::tree::{Node, NodeTree, NodeType, TreeStore};
use crate::types::NodeId;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::sync::atomic::{AtomicU64, Ordering};
use tracing::{debug, info, warn};

pub use decoder::{
    decoder_for, decoder_for_path, JsonRecordDecoder, RecordDecoder, YamlRecordDecoder,
};

/// Top level of an import source
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ImportDocument {
    #[serde(default)]
    pub children: Vec<ImportRecord>,
}

/// One record of an import source
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ImportRecord {
    #[serde(rename = "type", default)]
    pub node_type: NodeType,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub identifier: String,
    /// Plain path or `file://` URI
    #[serde(default, alias = "resourceRef")]
    pub url: Option<String>,
    #[serde(default)]
    pub children: Vec<ImportRecord>,
}

impl ImportRecord {
    pub fn new(node_type: NodeType, title: impl Into<String>) -> Self {
        Self {
            node_type,
            title: title.into(),
            ..Self::default()
        }
    }

    pub fn with_children(mut self, children: Vec<ImportRecord>) -> Self {
        self.children = children;
        self
    }

    /// Filesystem path named by `url`, if any
    pub fn resource_path(&self) -> Option<PathBuf> {
        let url = self.url.as_deref()?.trim();
        if url.is_empty() {
            return None;
        }
        let path = url.strip_prefix("file://").unwrap_or(url);
        Some(PathBuf::from(path))
    }
}

/// Store-scoped import counter; each import takes exactly one value
#[derive(Debug, Default)]
pub struct ImportCounter(AtomicU64);

impl ImportCounter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Counter positioned after every `root.<n>` id already in `store`, at any depth
    pub fn resume_after(store: &TreeStore) -> Self {
        let next = store
            .outline()
            .into_iter()
            .filter_map(|(_, n)| n.id.import_root_index())
            .map(|n| n.saturating_add(1))
            .max()
            .unwrap_or(0);
        Self(AtomicU64::new(next))
    }

    pub fn next(&self) -> u64 {
        self.0.fetch_add(1, Ordering::SeqCst)
    }

    pub fn peek(&self) -> u64 {
        self.0.load(Ordering::SeqCst)
    }
}

pub struct Importer;

impl Importer {
    /// Add a `Root` group `root.<n>` titled `root_label` and graft `records` under it
    ///
    /// The selection is cleared before and after, so the group lands as the last
    /// root and the next insertion starts back at the root level.
    pub fn import_into(
        state: &mut DocumentState,
        records: &[ImportRecord],
        root_label: &str,
        counter: &ImportCounter,
    ) -> Result<NodeId, TreeError> {
        state.selection.clear();
        let mut n = counter.next();
        while state.store.contains(&NodeId::import_root(n)) {
            debug!(taken = n, "Import root id already in use, advancing counter");
            n = counter.next();
        }
        let root_id = state.add_node(NodeTree::leaf(Node::root(root_label, n)))?;

        let mut imported = 0usize;
        Self::add_records(state, records, &mut imported)?;
        state.selection.clear();

        info!(root = %root_id, nodes = imported, "Import completed");
        Ok(root_id)
    }

    fn add_records(
        state: &mut DocumentState,
        records: &[ImportRecord],
        imported: &mut usize,
    ) -> Result<(), TreeError> {
        for record in records {
            if record.node_type == NodeType::Separator {
                continue;
            }
            let node = Self::materialize(&state.store, record);
            let is_directory = node.is_directory();
            let id = state.add_node(NodeTree::leaf(node))?;
            *imported += 1;

            if is_directory {
                Self::add_records(state, &record.children, imported)?;
                // back up so the next sibling lands beside this directory
                state.selection.select_parent_of_selection(&state.store);
            } else if !record.children.is_empty() {
                warn!(
                    node = %id,
                    dropped = record.children.len(),
                    "Children of a non-directory record were not imported"
                );
            }
        }
        Ok(())
    }

    fn materialize(store: &TreeStore, record: &ImportRecord) -> Node {
        let candidate = NodeId::from(record.identifier.as_str());
        let id = if record.identifier.is_empty() {
            NodeId::fresh()
        } else if candidate.import_root_index().is_some() {
            debug!(identifier = %record.identifier, "Identifier is reserved for import groups, assigning a fresh one");
            NodeId::fresh()
        } else if store.contains(&candidate) {
            debug!(identifier = %record.identifier, "Identifier already in use, assigning a fresh one");
            NodeId::fresh()
        } else {
            candidate
        };
        let node = Node::new(record.node_type, record.title.clone(), id);
        match record.resource_path() {
            Some(path) => node.with_resource(path),
            None => node,
        }
    }
}
