//! MergeService: orchestrates sources, applies merge policy, deserializes to OutlinerConfig.

use crate::config::sources::{environment, global_file, workspace_file};
use crate::config::OutlinerConfig;
use config::{ConfigError, File, FileFormat};
use std::path::Path;

use super::merge_policy;

/// Merge service for config composition.
pub struct MergeService;

impl MergeService {
    /// Precedence: defaults -> global file -> workspace file -> environment (highest).
    pub fn load(workspace_root: &Path) -> Result<OutlinerConfig, ConfigError> {
        let builder = merge_policy::builder_with_defaults()?;
        let builder = global_file::add_to_builder(builder)?;
        let builder = workspace_file::add_to_builder(builder, workspace_root)?;
        let builder = environment::add_to_builder(builder)?;

        builder.build()?.try_deserialize()
    }

    /// Load config from a specific file with environment overlay.
    pub fn load_from_file(path: &Path) -> Result<OutlinerConfig, ConfigError> {
        let builder = merge_policy::builder_with_defaults()?;
        let builder = builder.add_source(File::from(path).format(FileFormat::Toml));
        let builder = environment::add_to_builder(builder)?;

        builder.build()?.try_deserialize()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_workspace_file_overrides_defaults() {
        let temp = TempDir::new().unwrap();
        fs::write(
            temp.path().join("outliner.toml"),
            "[document]\nundo_depth = 7\n\n[graft]\ninclude_hidden = true\n",
        )
        .unwrap();
        let config = MergeService::load(temp.path()).unwrap();
        assert_eq!(config.document.undo_depth, 7);
        assert!(config.graft.include_hidden);
        assert_eq!(config.import.default_format, "json");
    }

    #[test]
    fn test_explicit_file() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("custom.toml");
        fs::write(&path, "[import]\ndefault_format = \"yaml\"\nroot_label = \"Inbox\"\n").unwrap();
        let config = MergeService::load_from_file(&path).unwrap();
        assert_eq!(config.import.default_format, "yaml");
        assert_eq!(config.import.root_label.as_deref(), Some("Inbox"));
    }

    #[test]
    fn test_missing_explicit_file_errors() {
        let temp = TempDir::new().unwrap();
        assert!(MergeService::load_from_file(&temp.path().join("absent.toml")).is_err());
    }
}
