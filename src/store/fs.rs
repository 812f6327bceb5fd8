//! Filesystem version index.
//!
//! Layout: `<root>/<TypeTag>/<InstanceId>/<YYYY-MM-DD>/<HH:MM:SS.ffffff>`.
//! Every artifact is written to a hidden temporary file in its date directory,
//! flushed, marked read-only, and then linked into place without replacing
//! anything already there. Readers ignore dot-prefixed names, so they only
//! ever see complete artifacts.

use crate::bag::stamp::is_date_segment;
use crate::bag::{Handle, InstanceId, VersionStamp};
use crate::error::StorageError;
use crate::store::codec;
use crate::store::index::{ScanBatch, VersionIndex};
use crate::store::query::TimeWindow;
use crate::store::root::StoreRoot;
use crate::types::Fields;
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, trace};

const TEMP_PREFIX: &str = ".tmp";

pub struct FsIndex {
    root: Arc<StoreRoot>,
    /// Write `_` instead of `:` in time file names
    colon_substitute: bool,
}

impl FsIndex {
    pub fn new(root: Arc<StoreRoot>, colon_substitute: bool) -> Self {
        Self {
            root,
            colon_substitute,
        }
    }

    pub fn root(&self) -> Result<&Path, StorageError> {
        self.root.get()
    }

    /// Where a handle's artifact is written
    pub fn artifact_path(&self, handle: &Handle) -> Result<PathBuf, StorageError> {
        Ok(self.root.get()?.join(handle.relative_path(self.colon_substitute)))
    }

    /// The artifact as it exists on disk, under either time spelling
    fn existing_path(&self, handle: &Handle) -> Result<Option<PathBuf>, StorageError> {
        let root = self.root.get()?;
        for substitute in [self.colon_substitute, !self.colon_substitute] {
            let candidate = root.join(handle.relative_path(substitute));
            if candidate.is_file() {
                return Ok(Some(candidate));
            }
        }
        Ok(None)
    }

    /// Greatest version stamp inside one instance directory
    fn latest_in_instance(&self, instance_dir: &Path) -> Result<Option<VersionStamp>, StorageError> {
        let mut dates: Vec<String> = visible_entries(instance_dir)?
            .into_iter()
            .filter(|(_, is_dir)| *is_dir)
            .map(|(name, _)| name)
            .filter(|name| is_date_segment(name))
            .collect();
        dates.sort_unstable_by(|a, b| b.cmp(a));

        for date in dates {
            let latest = visible_entries(&instance_dir.join(&date))?
                .into_iter()
                .filter(|(_, is_dir)| !*is_dir)
                .filter_map(|(name, _)| {
                    let stamp = VersionStamp::from_segments(&date, &name);
                    if stamp.is_none() {
                        trace!(date = %date, file = %name, "ignoring non-version file");
                    }
                    stamp
                })
                .max();
            if latest.is_some() {
                return Ok(latest);
            }
        }
        Ok(None)
    }
}

/// Non-hidden directory entries as `(name, is_dir)`
fn visible_entries(dir: &Path) -> Result<Vec<(String, bool)>, StorageError> {
    let mut entries = Vec::new();
    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        let name = match entry.file_name().into_string() {
            Ok(name) => name,
            Err(_) => continue,
        };
        if name.starts_with('.') {
            continue;
        }
        let is_dir = entry.file_type()?.is_dir();
        entries.push((name, is_dir));
    }
    Ok(entries)
}

fn already_exists(path: &Path) -> StorageError {
    StorageError::write(
        path,
        io::Error::new(io::ErrorKind::AlreadyExists, "version already exists"),
    )
}

impl VersionIndex for FsIndex {
    fn put(&self, handle: &Handle, fields: &Fields) -> Result<(), StorageError> {
        let target = self.artifact_path(handle)?;
        if self.existing_path(handle)?.is_some() {
            return Err(already_exists(&target));
        }
        let bytes = codec::encode(fields)
            .map_err(|e| StorageError::write(&target, io::Error::new(io::ErrorKind::InvalidData, e)))?;

        let dir = target
            .parent()
            .ok_or_else(|| StorageError::InvalidHandle(handle.to_string()))?;
        fs::create_dir_all(dir).map_err(|e| StorageError::write(dir, e))?;

        let mut temp = tempfile::Builder::new()
            .prefix(TEMP_PREFIX)
            .tempfile_in(dir)
            .map_err(|e| StorageError::write(dir, e))?;
        temp.write_all(&bytes)
            .and_then(|_| temp.as_file().sync_all())
            .map_err(|e| StorageError::write(temp.path(), e))?;

        let mut permissions = temp
            .as_file()
            .metadata()
            .map_err(|e| StorageError::write(temp.path(), e))?
            .permissions();
        permissions.set_readonly(true);
        temp.as_file()
            .set_permissions(permissions)
            .map_err(|e| StorageError::write(temp.path(), e))?;

        temp.persist_noclobber(&target)
            .map_err(|e| StorageError::write(&target, e.error))?;
        debug!(path = %target.display(), "version written");
        Ok(())
    }

    fn fetch(&self, handle: &Handle) -> Result<Fields, StorageError> {
        let path = match self.existing_path(handle)? {
            Some(path) => path,
            None => {
                return Err(StorageError::IoError(io::Error::new(
                    io::ErrorKind::NotFound,
                    format!("no artifact for {}", handle),
                )))
            }
        };
        let bytes = fs::read(&path)?;
        codec::decode(&path, &bytes)
    }

    fn current_version(
        &self,
        kind: &str,
        instance: &InstanceId,
    ) -> Result<Option<VersionStamp>, StorageError> {
        let dir = self.root.get()?.join(kind).join(instance.as_str());
        if !dir.is_dir() {
            return Ok(None);
        }
        self.latest_in_instance(&dir)
    }

    fn scan(&self, kind: &str, window: &TimeWindow) -> Result<ScanBatch, StorageError> {
        let kind_dir = self.root.get()?.join(kind);
        let mut batch = ScanBatch::default();
        if !kind_dir.is_dir() {
            return Ok(batch);
        }

        for (name, is_dir) in visible_entries(&kind_dir)? {
            if !is_dir {
                continue;
            }
            let instance_dir = kind_dir.join(&name);
            let instance = match InstanceId::parse(&name) {
                Ok(instance) => instance,
                Err(e) => {
                    batch.failures.push((instance_dir, e));
                    continue;
                }
            };
            match self.latest_in_instance(&instance_dir) {
                Ok(Some(stamp)) if window.contains(stamp) => {
                    batch.handles.push(Handle::new(kind, instance, stamp));
                }
                Ok(_) => {}
                Err(e) => batch.failures.push((instance_dir, e)),
            }
        }
        Ok(batch)
    }

    fn type_tags(&self) -> Result<Vec<String>, StorageError> {
        let root = self.root.get()?;
        if !root.is_dir() {
            return Ok(Vec::new());
        }
        let mut tags: Vec<String> = visible_entries(root)?
            .into_iter()
            .filter(|(_, is_dir)| *is_dir)
            .map(|(name, _)| name)
            .collect();
        tags.sort();
        Ok(tags)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bag::Value;
    use tempfile::TempDir;

    fn index(substitute: bool) -> (TempDir, FsIndex) {
        let temp = TempDir::new().unwrap();
        let root = Arc::new(StoreRoot::at(temp.path()));
        (temp, FsIndex::new(root, substitute))
    }

    fn handle(stamp: &str) -> Handle {
        Handle::new(
            "cmds.Log",
            InstanceId::parse("abc").unwrap(),
            VersionStamp::parse(stamp).unwrap(),
        )
    }

    fn fields(txt: &str) -> Fields {
        let mut fields = Fields::new();
        fields.insert("txt".to_string(), Value::from(txt));
        fields
    }

    #[test]
    fn test_put_writes_readonly_artifact_without_temporaries() {
        let (temp, index) = index(false);
        let h = handle("2024-01-01/10:00:00.000001");
        index.put(&h, &fields("hello")).unwrap();

        let path = temp
            .path()
            .join("cmds.Log/abc/2024-01-01/10:00:00.000001");
        assert!(fs::metadata(&path).unwrap().permissions().readonly());
        let leftovers: Vec<_> = fs::read_dir(path.parent().unwrap())
            .unwrap()
            .filter_map(|e| e.ok())
            .filter(|e| e.file_name().to_string_lossy().starts_with('.'))
            .collect();
        assert!(leftovers.is_empty());
        assert_eq!(index.fetch(&h).unwrap(), fields("hello"));
    }

    #[test]
    fn test_put_never_replaces_existing_version() {
        let (_temp, index) = index(false);
        let h = handle("2024-01-01/10:00:00");
        index.put(&h, &fields("first")).unwrap();
        let err = index.put(&h, &fields("second")).unwrap_err();
        match err {
            StorageError::Write { source, .. } => {
                assert_eq!(source.kind(), io::ErrorKind::AlreadyExists)
            }
            other => panic!("unexpected: {:?}", other),
        }
        assert_eq!(index.fetch(&h).unwrap(), fields("first"));
    }

    #[test]
    fn test_both_time_spellings_are_read() {
        let (temp, index) = index(false);
        let dir = temp.path().join("cmds.Log/abc/2024-01-01");
        fs::create_dir_all(&dir).unwrap();
        fs::write(dir.join("10_00_00.000001"), b"{\"txt\": \"old\"}").unwrap();
        fs::write(dir.join("10_00_05.000000"), b"{\"txt\": \"new\"}").unwrap();
        fs::write(dir.join(".tmp9999"), b"{\"txt\": \"partial").unwrap();

        let current = index
            .current_version("cmds.Log", &InstanceId::parse("abc").unwrap())
            .unwrap()
            .unwrap();
        assert_eq!(current.to_string(), "2024-01-01/10:00:05.000000");
        assert_eq!(index.fetch(&handle("2024-01-01/10:00:05")).unwrap(), fields("new"));

        // a colon spelling collides with the existing underscore spelling
        assert!(index.put(&handle("2024-01-01/10:00:05"), &fields("x")).is_err());
    }

    #[test]
    fn test_latest_date_directory_wins() {
        let (_temp, index) = index(true);
        index.put(&handle("2024-01-01/23:59:59"), &fields("a")).unwrap();
        index.put(&handle("2024-01-02/00:00:01"), &fields("b")).unwrap();
        let batch = index.scan("cmds.Log", &TimeWindow::default()).unwrap();
        assert_eq!(batch.handles.len(), 1);
        assert_eq!(batch.handles[0].version.to_string(), "2024-01-02/00:00:01.000000");
    }

    #[test]
    fn test_scan_window_uses_current_version() {
        let (_temp, index) = index(false);
        index.put(&handle("2024-01-01/10:00:00"), &fields("a")).unwrap();
        index.put(&handle("2024-01-03/10:00:00"), &fields("b")).unwrap();
        let to = VersionStamp::parse("2024-01-02").unwrap();
        let batch = index.scan("cmds.Log", &TimeWindow::until(to)).unwrap();
        assert!(batch.handles.is_empty());
    }

    #[test]
    fn test_missing_kind_and_root() {
        let (_temp, index) = index(false);
        assert!(index.scan("Nope", &TimeWindow::default()).unwrap().handles.is_empty());
        assert!(index.type_tags().unwrap().is_empty());

        let unset = FsIndex::new(Arc::new(StoreRoot::unset()), false);
        assert!(matches!(unset.type_tags(), Err(StorageError::Unconfigured)));
    }
}
