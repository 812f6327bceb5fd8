//! Per-user config file under the XDG config home.

use crate::config::xdg;
use config::builder::DefaultState;
use config::{ConfigBuilder, ConfigError, File};

/// Optional `$XDG_CONFIG_HOME/satchel/config.toml`; skipped when HOME is unknown
pub fn add_to_builder(
    builder: ConfigBuilder<DefaultState>,
) -> Result<ConfigBuilder<DefaultState>, ConfigError> {
    match xdg::global_config_path() {
        Ok(path) => Ok(builder.add_source(File::from(path).required(false))),
        Err(e) => {
            tracing::debug!("no global config file: {}", e);
            Ok(builder)
        }
    }
}
