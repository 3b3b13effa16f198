//! Defaults layer: the lowest-precedence source of every merge.

use config::builder::DefaultState;
use config::{Config, ConfigBuilder, ConfigError};

pub(crate) fn builder_with_defaults() -> Result<ConfigBuilder<DefaultState>, ConfigError> {
    Config::builder()
        .set_default("document.undo_depth", 100_i64)?
        .set_default("import.default_format", "json")?
        .set_default("graft.include_hidden", false)
}
