//! Environment variable source: OUTLINER_* prefix with __ separator

use config::builder::DefaultState;
use config::ConfigBuilder;
use config::ConfigError;
use config::Environment;

/// `OUTLINER__DOCUMENT__UNDO_DEPTH=5` sets `document.undo_depth`.
pub fn add_to_builder(
    builder: ConfigBuilder<DefaultState>,
) -> Result<ConfigBuilder<DefaultState>, ConfigError> {
    Ok(builder.add_source(
        Environment::with_prefix("OUTLINER")
            .prefix_separator("__")
            .separator("__")
            .try_parsing(true),
    ))
}
