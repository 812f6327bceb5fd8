//! StoreConfig and store root resolution.

use crate::config::xdg;
use crate::error::ApiError;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

fn default_colon_substitute() -> bool {
    cfg!(windows)
}

/// Store configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoreConfig {
    /// Store root; relative paths are taken from the working directory.
    /// None uses the platform data directory.
    #[serde(default)]
    pub root: Option<PathBuf>,

    /// Write `_` instead of `:` in version file names
    #[serde(default = "default_colon_substitute")]
    pub colon_substitute: bool,
}

impl StoreConfig {
    /// Resolve the store root to an actual filesystem location.
    pub fn resolve_root(&self, workdir: &Path) -> Result<PathBuf, ApiError> {
        match &self.root {
            Some(root) if root.as_os_str().is_empty() => Err(ApiError::ConfigError(
                "store.root must not be empty".to_string(),
            )),
            Some(root) if root.is_absolute() => Ok(root.clone()),
            Some(root) => Ok(workdir.join(root)),
            None => xdg::default_store_root(),
        }
    }
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            root: None,
            colon_substitute: default_colon_substitute(),
        }
    }
}
