//! Version index abstraction.
//!
//! The store talks to its persistence through [`VersionIndex`]: write one
//! version, fetch one version, find the current version of an instance, and
//! scan the current versions of a kind. [`FsIndex`](crate::store::fs::FsIndex)
//! is the filesystem implementation.

use crate::bag::{Handle, InstanceId, VersionStamp};
use crate::error::StorageError;
use crate::store::query::TimeWindow;
use crate::types::Fields;
use std::path::PathBuf;

/// Result of scanning one kind.
///
/// Instances that could not be read are reported next to the handles that
/// could, so one bad artifact never hides the rest.
#[derive(Debug, Default)]
pub struct ScanBatch {
    /// Current version of every readable instance inside the window
    pub handles: Vec<Handle>,
    pub failures: Vec<(PathBuf, StorageError)>,
}

pub trait VersionIndex: Send + Sync {
    /// Persist a new immutable version; an existing version is never replaced
    fn put(&self, handle: &Handle, fields: &Fields) -> Result<(), StorageError>;

    fn fetch(&self, handle: &Handle) -> Result<Fields, StorageError>;

    /// Greatest stamp recorded for an instance
    fn current_version(
        &self,
        kind: &str,
        instance: &InstanceId,
    ) -> Result<Option<VersionStamp>, StorageError>;

    fn scan(&self, kind: &str, window: &TimeWindow) -> Result<ScanBatch, StorageError>;

    /// Kinds with at least one stored instance directory
    fn type_tags(&self) -> Result<Vec<String>, StorageError>;
}
