//! The single store root directory.

use crate::error::StorageError;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

/// Root directory under which every artifact lives.
///
/// Set exactly once per process (or per store), then read without locking.
#[derive(Debug, Default)]
pub struct StoreRoot {
    path: OnceLock<PathBuf>,
}

impl StoreRoot {
    /// A root that is not configured yet
    pub fn unset() -> Self {
        Self::default()
    }

    /// A root configured at `path`
    pub fn at(path: impl Into<PathBuf>) -> Self {
        let root = Self::unset();
        let _ = root.path.set(path.into());
        root
    }

    /// Configure the root; fails if it was already set
    pub fn set(&self, path: impl Into<PathBuf>) -> Result<(), StorageError> {
        self.path
            .set(path.into())
            .map_err(|_| StorageError::AlreadyConfigured(self.path.get().cloned().unwrap_or_default()))
    }

    pub fn get(&self) -> Result<&Path, StorageError> {
        self.path
            .get()
            .map(PathBuf::as_path)
            .ok_or(StorageError::Unconfigured)
    }

    pub fn is_set(&self) -> bool {
        self.path.get().is_some()
    }
}
