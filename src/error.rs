//! Error types for the store, registries, and configuration layers.

use std::path::PathBuf;
use thiserror::Error;

/// Errors raised by the versioned store and its index backends.
#[derive(Debug, Error)]
pub enum StorageError {
    /// A store operation ran before the store root was configured
    #[error("Store root is not configured")]
    Unconfigured,

    /// The store root was already set; it is never reloaded
    #[error("Store root already configured at {0}")]
    AlreadyConfigured(PathBuf),

    /// An on-disk artifact could not be parsed
    #[error("Corrupt artifact {path}: {reason}")]
    CorruptArtifact { path: PathBuf, reason: String },

    /// A path or string that does not follow the handle layout
    #[error("Invalid handle: {0}")]
    InvalidHandle(String),

    /// Writing a new version failed; the version was not persisted
    #[error("Failed to write version {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

impl StorageError {
    pub(crate) fn corrupt(path: impl Into<PathBuf>, reason: impl ToString) -> Self {
        StorageError::CorruptArtifact {
            path: path.into(),
            reason: reason.to_string(),
        }
    }

    pub(crate) fn write(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        StorageError::Write {
            path: path.into(),
            source,
        }
    }
}

/// Crate-level error used by configuration, logging, and the CLI surface.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Storage error: {0}")]
    StorageError(#[from] StorageError),

    #[error("Config load error: {0}")]
    Config(#[from] config::ConfigError),

    #[error("Unknown command: {0}")]
    UnknownCommand(String),

    #[error("Worker task failed: {0}")]
    WorkerFailed(String),
}
