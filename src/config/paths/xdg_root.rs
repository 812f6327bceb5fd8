//! XDG Base Directory and platform directory lookups.

use crate::error::ApiError;
use std::path::PathBuf;

pub const APP_NAME: &str = "satchel";

/// Get XDG config home directory
///
/// Returns `$XDG_CONFIG_HOME` if set, otherwise defaults to `$HOME/.config`
pub fn config_home() -> Result<PathBuf, ApiError> {
    if let Ok(xdg_config_home) = std::env::var("XDG_CONFIG_HOME") {
        if !xdg_config_home.is_empty() {
            return Ok(PathBuf::from(xdg_config_home));
        }
    }

    let home = std::env::var("HOME").map_err(|_| {
        ApiError::ConfigError(
            "Could not determine XDG config home directory (HOME not set)".to_string(),
        )
    })?;

    Ok(PathBuf::from(home).join(".config"))
}

/// `$XDG_CONFIG_HOME/satchel/config.toml`
pub fn global_config_path() -> Result<PathBuf, ApiError> {
    Ok(config_home()?.join(APP_NAME).join("config.toml"))
}

/// Store root used when the config names none: the platform data directory
/// plus `store`
pub fn default_store_root() -> Result<PathBuf, ApiError> {
    let project_dirs = directories::ProjectDirs::from("", "", APP_NAME).ok_or_else(|| {
        ApiError::ConfigError("Could not determine platform data directory".to_string())
    })?;
    Ok(project_dirs.data_dir().join("store"))
}
