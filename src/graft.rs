//! Filesystem Grafting
//!
//! Builds a detached subtree mirroring a filesystem resource. Building touches
//! only the filesystem, never the document, so callers can run it without
//! holding the document lock and graft the result afterwards.
//!
//! Children are ordered by descending file name. Unreadable directories yield
//! an empty subtree instead of failing the graft.

use crate::tree::{Node, NodeTree};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};
use walkdir::WalkDir;

/// One immediate directory entry
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entry {
    pub name: String,
    pub path: PathBuf,
    pub is_dir: bool,
}

#[derive(Debug, Clone, Default)]
pub struct FsGrafter {
    include_hidden: bool,
}

impl FsGrafter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_hidden(mut self, include_hidden: bool) -> Self {
        self.include_hidden = include_hidden;
        self
    }

    /// Mirror `path`: a directory becomes a mirrored container with its whole
    /// subtree, anything else a document leaf
    pub fn build(&self, path: &Path) -> NodeTree {
        let path = dunce::canonicalize(path).unwrap_or_else(|_| path.to_path_buf());
        if path.is_dir() {
            self.build_directory(&path)
        } else {
            NodeTree::leaf(Node::document("").with_resource(path))
        }
    }

    /// Mirrored subtrees for the entries of `dir`, in graft order
    pub fn build_children(&self, dir: &Path) -> Vec<NodeTree> {
        let entries = match self.list_entries(dir) {
            Ok(entries) => entries,
            Err(e) => {
                warn!(path = %dir.display(), error = %e, "Directory listing failed, grafting it empty");
                return Vec::new();
            }
        };
        entries
            .into_iter()
            .map(|entry| {
                if entry.is_dir {
                    self.build_directory(&entry.path)
                } else {
                    NodeTree::leaf(Node::document("").with_resource(entry.path))
                }
            })
            .collect()
    }

    /// Immediate entries of `dir`, hidden ones excluded, sorted by descending name
    pub fn list_entries(&self, dir: &Path) -> Result<Vec<Entry>, walkdir::Error> {
        let mut entries = Vec::new();
        for result in WalkDir::new(dir).min_depth(1).max_depth(1).follow_links(false) {
            let entry = match result {
                Ok(entry) => entry,
                // depth 0 means the directory itself could not be read
                Err(e) if e.depth() == 0 => return Err(e),
                Err(e) => {
                    debug!(path = %dir.display(), error = %e, "Skipping unreadable entry");
                    continue;
                }
            };
            let name = entry.file_name().to_string_lossy().to_string();
            if !self.include_hidden && name.starts_with('.') {
                continue;
            }
            entries.push(Entry {
                name,
                is_dir: entry.file_type().is_dir(),
                path: entry.into_path(),
            });
        }
        entries.sort_by(|a, b| b.name.cmp(&a.name));
        Ok(entries)
    }

    fn build_directory(&self, path: &Path) -> NodeTree {
        let mut node = Node::container("").with_resource(path.to_path_buf());
        node.mirrored = true;
        let children = self.build_children(path);
        debug!(path = %path.display(), children = children.len(), "Mirrored directory");
        NodeTree::with_children(node, children)
    }
}
