//! In-process gateway, used by tests and by hosts that persist elsewhere.

use super::PersistenceGateway;
use crate::error::StorageError;
use crate::tree::Forest;
use crate::undo::{UndoConfig, UndoManager};
use parking_lot::Mutex;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;

pub struct MemoryGateway {
    staged: Mutex<Option<Forest>>,
    saved: Mutex<Option<Forest>>,
    undo: Arc<Mutex<UndoManager>>,
    commit_editing: AtomicBool,
    fail_saves: AtomicBool,
    save_count: AtomicUsize,
}

impl MemoryGateway {
    pub fn new() -> Self {
        Self::with_undo_config(UndoConfig::default())
    }

    pub fn with_undo_config(config: UndoConfig) -> Self {
        Self {
            staged: Mutex::new(None),
            saved: Mutex::new(None),
            undo: Arc::new(Mutex::new(UndoManager::new(config))),
            commit_editing: AtomicBool::new(true),
            fail_saves: AtomicBool::new(false),
            save_count: AtomicUsize::new(0),
        }
    }

    /// Start from an already saved forest
    pub fn with_saved(forest: Forest) -> Self {
        let gateway = Self::new();
        *gateway.saved.lock() = Some(forest);
        gateway
    }

    /// Simulate a host whose in-progress edit cannot be committed
    pub fn set_commit_editing(&self, ok: bool) {
        self.commit_editing.store(ok, Ordering::SeqCst);
    }

    /// Make every subsequent `save` fail
    pub fn set_fail_saves(&self, fail: bool) {
        self.fail_saves.store(fail, Ordering::SeqCst);
    }

    pub fn saved(&self) -> Option<Forest> {
        self.saved.lock().clone()
    }

    pub fn save_count(&self) -> usize {
        self.save_count.load(Ordering::SeqCst)
    }
}

impl Default for MemoryGateway {
    fn default() -> Self {
        Self::new()
    }
}

impl PersistenceGateway for MemoryGateway {
    fn commit_editing(&self) -> bool {
        self.commit_editing.load(Ordering::SeqCst)
    }

    fn has_pending_changes(&self) -> bool {
        self.staged.lock().is_some()
    }

    fn stage(&self, forest: &Forest) {
        *self.staged.lock() = Some(forest.clone());
    }

    fn save(&self) -> Result<(), StorageError> {
        if self.fail_saves.load(Ordering::SeqCst) {
            return Err(StorageError::CommitFailure(
                "memory gateway configured to fail".to_string(),
            ));
        }
        let mut staged = self.staged.lock();
        if let Some(forest) = staged.take() {
            *self.saved.lock() = Some(forest);
            self.save_count.fetch_add(1, Ordering::SeqCst);
        }
        Ok(())
    }

    fn load(&self) -> Result<Option<Forest>, StorageError> {
        Ok(self.saved.lock().clone())
    }

    fn undo_manager(&self) -> Arc<Mutex<UndoManager>> {
        Arc::clone(&self.undo)
    }
}
