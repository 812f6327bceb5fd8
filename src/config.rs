//! Configuration
//!
//! Layered settings: built-in defaults, the per-user file
//! (`$XDG_CONFIG_HOME/satchel/config.toml`), the working directory's
//! `satchel.toml`, then `SATCHEL__SECTION__KEY` environment variables.

pub mod facade;
pub mod merge;
pub mod paths;
pub mod sources;
pub mod store;

pub use facade::ConfigLoader;
pub use paths::xdg_root as xdg;
pub use store::StoreConfig;

use crate::logging::LoggingConfig;
use crate::registry::ScanPolicy;
use serde::{Deserialize, Serialize};

/// Top-level configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SatchelConfig {
    #[serde(default)]
    pub store: StoreConfig,

    #[serde(default)]
    pub dispatch: DispatchConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

fn default_event_param() -> String {
    crate::registry::scan::EVENT_PARAM.to_string()
}

fn default_callback_prefix() -> String {
    crate::registry::scan::CALLBACK_PREFIX.to_string()
}

fn default_workers() -> usize {
    4
}

/// Command discovery and concurrent dispatch settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DispatchConfig {
    /// Parameter name that marks a callable as a command handler
    #[serde(default = "default_event_param")]
    pub event_param: String,

    /// Callables with this prefix are never registered as commands
    #[serde(default = "default_callback_prefix")]
    pub callback_prefix: String,

    /// Events handled at once by the interactive shell
    #[serde(default = "default_workers")]
    pub workers: usize,
}

impl DispatchConfig {
    pub fn scan_policy(&self) -> ScanPolicy {
        ScanPolicy {
            event_param: self.event_param.clone(),
            callback_prefix: self.callback_prefix.clone(),
        }
    }
}

impl Default for DispatchConfig {
    fn default() -> Self {
        Self {
            event_param: default_event_param(),
            callback_prefix: default_callback_prefix(),
            workers: default_workers(),
        }
    }
}
