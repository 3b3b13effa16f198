//! ConfigLoader facade delegating to merge service.

use super::merge::service::MergeService;
use super::OutlinerConfig;
use config::ConfigError;
use std::path::Path;

/// Configuration loader facade.
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load configuration from files and environment.
    pub fn load(workspace_root: &Path) -> Result<OutlinerConfig, ConfigError> {
        MergeService::load(workspace_root)
    }

    /// Load configuration from a specific file.
    pub fn load_from_file(path: &Path) -> Result<OutlinerConfig, ConfigError> {
        MergeService::load_from_file(path)
    }

    pub fn default() -> OutlinerConfig {
        OutlinerConfig::default()
    }
}
