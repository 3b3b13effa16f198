//! Sled-backed gateway: the forest is stored bincode-encoded under one key.

use super::PersistenceGateway;
use crate::error::StorageError;
use crate::tree::Forest;
use crate::undo::{UndoConfig, UndoManager};
use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, info};

const FOREST_KEY: &[u8] = b"forest";
const SAVED_AT_KEY: &[u8] = b"saved_at";

pub struct SledGateway {
    db: sled::Db,
    tree: sled::Tree,
    staged: Mutex<Option<Forest>>,
    undo: Arc<Mutex<UndoManager>>,
}

impl SledGateway {
    /// Open (or create) a document store at `path`
    pub fn open(path: &Path, undo_config: UndoConfig) -> Result<Self, StorageError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let db = sled::open(path)?;
        let tree = db.open_tree("document")?;
        debug!(path = %path.display(), "Opened document store");
        Ok(Self {
            db,
            tree,
            staged: Mutex::new(None),
            undo: Arc::new(Mutex::new(UndoManager::new(undo_config))),
        })
    }

    /// Timestamp of the last successful save
    pub fn last_saved(&self) -> Result<Option<DateTime<Utc>>, StorageError> {
        let Some(raw) = self.tree.get(SAVED_AT_KEY)? else {
            return Ok(None);
        };
        let text = String::from_utf8_lossy(&raw).to_string();
        DateTime::parse_from_rfc3339(&text)
            .map(|dt| Some(dt.with_timezone(&Utc)))
            .map_err(|e| StorageError::Serialization(format!("Invalid saved_at stamp: {}", e)))
    }
}

impl PersistenceGateway for SledGateway {
    fn has_pending_changes(&self) -> bool {
        self.staged.lock().is_some()
    }

    fn stage(&self, forest: &Forest) {
        *self.staged.lock() = Some(forest.clone());
    }

    fn save(&self) -> Result<(), StorageError> {
        let mut staged = self.staged.lock();
        let Some(forest) = staged.as_ref() else {
            return Ok(());
        };
        let bytes = bincode::serialize(forest)?;
        let saved_at = Utc::now().to_rfc3339();
        self.tree.insert(FOREST_KEY, bytes)?;
        self.tree.insert(SAVED_AT_KEY, saved_at.as_bytes())?;
        self.db.flush()?;
        info!(roots = forest.len(), saved_at = %saved_at, "Saved document");
        *staged = None;
        Ok(())
    }

    fn load(&self) -> Result<Option<Forest>, StorageError> {
        match self.tree.get(FOREST_KEY)? {
            Some(bytes) => Ok(Some(bincode::deserialize(&bytes)?)),
            None => Ok(None),
        }
    }

    fn undo_manager(&self) -> Arc<Mutex<UndoManager>> {
        Arc::clone(&self.undo)
    }
}
