//! Configuration
//!
//! Layered configuration for the outliner: built-in defaults, the global
//! `$XDG_CONFIG_HOME/outliner/config.toml`, the workspace `outliner.toml`, then
//! `OUTLINER__SECTION__KEY` environment variables.

pub mod facade;
pub mod merge;
pub mod paths;
pub mod sources;

pub use facade::ConfigLoader;
pub use paths::xdg_root as xdg;

use crate::error::ApiError;
use crate::logging::LoggingConfig;
use crate::undo::UndoConfig;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Workspace config file name
pub const WORKSPACE_CONFIG_FILE: &str = "outliner.toml";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OutlinerConfig {
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default)]
    pub document: DocumentConfig,
    #[serde(default)]
    pub import: ImportConfig,
    #[serde(default)]
    pub graft: GraftConfig,
}

impl OutlinerConfig {
    pub fn to_toml(&self) -> Result<String, ApiError> {
        toml::to_string_pretty(self)
            .map_err(|e| ApiError::ConfigError(format!("Failed to render config: {}", e)))
    }
}

fn default_undo_depth() -> usize {
    UndoConfig::default().max_depth
}

/// Where the document lives and how much history it keeps
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocumentConfig {
    /// Store directory; relative paths resolve against the workspace, unset
    /// means the per-workspace XDG data directory
    #[serde(default)]
    pub store_path: Option<PathBuf>,

    #[serde(default = "default_undo_depth")]
    pub undo_depth: usize,
}

impl Default for DocumentConfig {
    fn default() -> Self {
        Self {
            store_path: None,
            undo_depth: default_undo_depth(),
        }
    }
}

impl DocumentConfig {
    pub fn resolve_store_path(&self, workspace_root: &Path) -> Result<PathBuf, ApiError> {
        match &self.store_path {
            Some(path) if path.is_absolute() => Ok(path.clone()),
            Some(path) => Ok(workspace_root.join(path)),
            None => Ok(xdg::workspace_data_dir(workspace_root)?.join("document")),
        }
    }

    pub fn undo_config(&self) -> UndoConfig {
        UndoConfig {
            max_depth: self.undo_depth,
        }
    }
}

fn default_import_format() -> String {
    "json".to_string()
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImportConfig {
    /// Decoder used when the file extension does not name one
    #[serde(default = "default_import_format")]
    pub default_format: String,

    /// Group title; the source file name when unset
    #[serde(default)]
    pub root_label: Option<String>,
}

impl Default for ImportConfig {
    fn default() -> Self {
        Self {
            default_format: default_import_format(),
            root_label: None,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GraftConfig {
    #[serde(default)]
    pub include_hidden: bool,
}
