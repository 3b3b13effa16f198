//! Persistence Gateway
//!
//! Durable commit of the whole forest plus the undo manager handle. The document
//! stages a snapshot after every successful mutation and asks the gateway to
//! save on demand; how and where the bytes land is the gateway's business.

pub mod memory;
pub mod sled_store;

use crate::error::StorageError;
use crate::tree::Forest;
use crate::undo::UndoManager;
use parking_lot::Mutex;
use std::sync::Arc;

pub use memory::MemoryGateway;
pub use sled_store::SledGateway;

pub trait PersistenceGateway: Send + Sync {
    /// Flush any in-progress external edit; `false` aborts the outer operation
    fn commit_editing(&self) -> bool {
        true
    }

    /// True when a staged snapshot has not been saved yet
    fn has_pending_changes(&self) -> bool;

    /// Record the latest forest as a discardable edit awaiting `save`
    fn stage(&self, forest: &Forest);

    /// Durably write the staged forest
    fn save(&self) -> Result<(), StorageError>;

    /// Last saved forest, `None` for a fresh document
    fn load(&self) -> Result<Option<Forest>, StorageError>;

    /// Undo manager the host attaches to its edit menu
    fn undo_manager(&self) -> Arc<Mutex<UndoManager>>;
}
