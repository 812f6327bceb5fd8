//! Base layer every merge starts from.

use crate::config::SatchelConfig;
use config::builder::DefaultState;
use config::{Config, ConfigBuilder, ConfigError};

/// Builder seeded with the serialized defaults, so later sources only need
/// to name the keys they change.
pub fn builder_with_defaults() -> Result<ConfigBuilder<DefaultState>, ConfigError> {
    let defaults = Config::try_from(&SatchelConfig::default())?;
    Ok(Config::builder().add_source(defaults))
}
