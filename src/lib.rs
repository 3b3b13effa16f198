//! Outliner: an ordered forest of folders and items
//!
//! Nodes are addressed by index paths that are re-resolved from stable ids on
//! every use. The document engine adds selection-relative insertion, bulk
//! import, filesystem mirroring, confirmed removal, snapshot undo and a
//! persistence gateway on top of the tree store.

pub mod config;
pub mod document;
pub mod error;
pub mod graft;
pub mod import;
pub mod logging;
pub mod persistence;
pub mod removal;
pub mod selection;
pub mod tooling;
pub mod tree;
pub mod types;
pub mod undo;

pub use document::{Document, DocumentState};
pub use error::{ApiError, ImportError, StorageError, TreeError};
pub use removal::{Confirm, RemovalCoordinator, RemovalOutcome, RemovalState};
pub use tree::{Node, NodeTree, NodeType, TreeStore};
pub use types::{IndexPath, NodeId};
