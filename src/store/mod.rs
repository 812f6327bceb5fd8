//! Versioned Object Store
//!
//! Persists attribute bags as immutable, timestamped versions and answers
//! "what is the current state of every instance of this kind" queries. Each
//! save writes a new version; nothing is ever rewritten or removed.

pub mod clock;
pub mod codec;
pub mod fs;
pub mod index;
pub mod query;
pub mod root;

pub use clock::VersionClock;
pub use fs::FsIndex;
pub use index::{ScanBatch, VersionIndex};
pub use query::{FindOptions, Selector, TimeWindow};
pub use root::StoreRoot;

use crate::bag::{validate_kind, AttributeBag, Handle, InstanceId, VersionStamp};
use crate::concurrency::InstanceLockManager;
use crate::error::StorageError;
use crate::registry::types::bare_name;
use crate::registry::TypeRegistry;
use crate::types::Fields;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, warn};

/// Attempts at minting a fresh stamp when a version file already exists
const MAX_SAVE_ATTEMPTS: usize = 8;

/// Bags found by a scan plus the artifacts that could not be read
#[derive(Debug, Default)]
pub struct FindReport {
    pub bags: Vec<AttributeBag>,
    pub failures: Vec<(PathBuf, StorageError)>,
}

/// Store of versioned attribute bags.
///
/// Safe to share between threads; saves of one instance are serialized
/// in-process, reads never lock.
pub struct VersionedStore {
    index: Arc<dyn VersionIndex>,
    types: Arc<TypeRegistry>,
    clock: VersionClock,
    locks: InstanceLockManager,
}

impl VersionedStore {
    /// Filesystem store under `root`, substituting `:` in file names on Windows
    pub fn new(root: Arc<StoreRoot>, types: Arc<TypeRegistry>) -> Self {
        Self::filesystem(root, cfg!(windows), types)
    }

    pub fn filesystem(root: Arc<StoreRoot>, colon_substitute: bool, types: Arc<TypeRegistry>) -> Self {
        Self::with_index(Arc::new(FsIndex::new(root, colon_substitute)), types)
    }

    /// Filesystem store with an already known root directory
    pub fn at(path: impl Into<PathBuf>, types: Arc<TypeRegistry>) -> Self {
        Self::new(Arc::new(StoreRoot::at(path)), types)
    }

    pub fn with_index(index: Arc<dyn VersionIndex>, types: Arc<TypeRegistry>) -> Self {
        Self {
            index,
            types,
            clock: VersionClock::system(),
            locks: InstanceLockManager::new(),
        }
    }

    pub fn with_clock(mut self, clock: VersionClock) -> Self {
        self.clock = clock;
        self
    }

    pub fn types(&self) -> &Arc<TypeRegistry> {
        &self.types
    }

    pub fn index(&self) -> &Arc<dyn VersionIndex> {
        &self.index
    }

    /// Persist the bag's fields as a new version and stamp the bag with it.
    ///
    /// The new stamp is later than any version already recorded for the
    /// instance.
    pub fn save(&self, bag: &mut AttributeBag) -> Result<Handle, StorageError> {
        validate_kind(bag.kind())?;
        let kind = bag.kind().to_string();
        let instance = bag.instance().clone();
        let lock = self.locks.get_lock(&kind, &instance);
        let saved = {
            let _guard = lock.write();
            self.save_locked(bag)
        };
        self.locks.release(&kind, &instance, lock);
        saved
    }

    /// Body of [`save`](Self::save); the instance's write lock is held
    fn save_locked(&self, bag: &mut AttributeBag) -> Result<Handle, StorageError> {
        let recorded = self.index.current_version(bag.kind(), bag.instance())?;
        let mut floor = recorded.max(bag.version());
        let mut last_err = None;

        for _ in 0..MAX_SAVE_ATTEMPTS {
            let stamp = self.clock.next_after(floor);
            let handle = Handle::new(bag.kind(), bag.instance().clone(), stamp);
            match self.index.put(&handle, bag.fields()) {
                Ok(()) => {
                    bag.set_version(stamp);
                    debug!(handle = %handle, "saved");
                    return Ok(handle);
                }
                Err(err) if is_collision(&err) => {
                    debug!(handle = %handle, "version exists, retrying with a later stamp");
                    floor = Some(stamp);
                    last_err = Some(err);
                }
                Err(err) => return Err(err),
            }
        }
        Err(last_err.unwrap_or_else(|| {
            StorageError::write(
                bag.kind(),
                io::Error::new(io::ErrorKind::AlreadyExists, "no free version stamp"),
            )
        }))
    }

    /// Read the version a path points at.
    ///
    /// Only the last four components are used, so both handles and absolute
    /// artifact paths work.
    pub fn read(&self, path: impl AsRef<Path>) -> Result<AttributeBag, StorageError> {
        let text = path.as_ref().to_string_lossy();
        let handle = Handle::parse(&text)?;
        self.read_handle(&handle)
    }

    /// Read one version. Registered kinds start from their defaults; stored
    /// fields are laid over them, unknown ones included.
    pub fn read_handle(&self, handle: &Handle) -> Result<AttributeBag, StorageError> {
        let fields = self.index.fetch(handle)?;
        let bag = match self.types.get(&handle.kind) {
            Some(entry) => {
                let mut bag = AttributeBag::restore(handle, Fields::new());
                entry.init(&mut bag);
                bag.extend(fields);
                bag
            }
            None => AttributeBag::restore(handle, fields),
        };
        Ok(bag)
    }

    /// Concrete type tags a user-supplied name refers to.
    ///
    /// An exact registered name wins, then registered kinds whose bare name
    /// matches ignoring case, then stored kinds whose full or bare name
    /// contains the input ignoring case.
    pub fn resolve_type(&self, tag: &str) -> Result<Vec<String>, StorageError> {
        if tag.is_empty() {
            return Ok(Vec::new());
        }
        if self.types.contains(tag) {
            return Ok(vec![tag.to_string()]);
        }
        let registered = self.types.full(tag);
        if !registered.is_empty() {
            return Ok(registered);
        }
        let wanted = tag.to_lowercase();
        Ok(self
            .index
            .type_tags()?
            .into_iter()
            .filter(|name| {
                name.to_lowercase().contains(&wanted)
                    || bare_name(name).to_lowercase().contains(&wanted)
            })
            .collect())
    }

    /// Current version of every matching instance, oldest first, with the
    /// artifacts that failed to load.
    pub fn find_report(&self, tag: &str, options: &FindOptions) -> Result<FindReport, StorageError> {
        let mut report = FindReport::default();
        for kind in self.resolve_type(tag)? {
            let batch = self.index.scan(&kind, &options.window)?;
            report.failures.extend(batch.failures);
            for handle in batch.handles {
                let bag = match self.read_handle(&handle) {
                    Ok(bag) => bag,
                    Err(err) => {
                        report.failures.push((PathBuf::from(handle.to_string()), err));
                        continue;
                    }
                };
                if options.skip_deleted && bag.is_deleted() {
                    continue;
                }
                if !options.selector.matches(&bag) {
                    continue;
                }
                report.bags.push(bag);
            }
        }

        report.bags.sort_by(|a, b| {
            a.version()
                .cmp(&b.version())
                .then_with(|| a.kind().cmp(b.kind()))
                .then_with(|| a.instance().cmp(b.instance()))
        });
        if let Some(nth) = options.index {
            report.bags = report.bags.into_iter().nth(nth).into_iter().collect();
        }
        Ok(report)
    }

    /// Like [`find_report`](Self::find_report), logging unreadable artifacts
    pub fn find(&self, tag: &str, options: &FindOptions) -> Result<Vec<AttributeBag>, StorageError> {
        let report = self.find_report(tag, options)?;
        for (path, err) in &report.failures {
            warn!(path = %path.display(), "skipping unreadable artifact: {}", err);
        }
        Ok(report.bags)
    }

    /// Most recently saved matching instance
    pub fn last(&self, tag: &str, selector: &Selector) -> Result<Option<AttributeBag>, StorageError> {
        let options = FindOptions::new().selector(selector.clone());
        Ok(self.find(tag, &options)?.pop())
    }

    /// Load the most recent instance of the bag's own kind into it.
    ///
    /// The bag adopts that instance's identity and fields. Returns false when
    /// nothing of the kind is stored.
    pub fn refresh(&self, bag: &mut AttributeBag) -> Result<bool, StorageError> {
        let batch = self.index.scan(bag.kind(), &TimeWindow::default())?;
        for (path, err) in &batch.failures {
            warn!(path = %path.display(), "skipping unreadable instance: {}", err);
        }
        let mut handles = batch.handles;
        handles.sort_by(|a, b| b.version.cmp(&a.version).then_with(|| b.instance.cmp(&a.instance)));

        for handle in handles {
            match self.read_handle(&handle) {
                Ok(stored) => {
                    bag.update(&stored);
                    bag.adopt_identity(&stored);
                    return Ok(true);
                }
                Err(err) => warn!(handle = %handle, "skipping unreadable artifact: {}", err),
            }
        }
        Ok(false)
    }

    pub fn current_version(
        &self,
        kind: &str,
        instance: &InstanceId,
    ) -> Result<Option<VersionStamp>, StorageError> {
        self.index.current_version(kind, instance)
    }

    /// Mark the bag deleted and save that as a new version.
    ///
    /// Earlier versions stay readable by handle.
    pub fn soft_delete(&self, bag: &mut AttributeBag) -> Result<Handle, StorageError> {
        bag.mark_deleted();
        self.save(bag)
    }

    /// Stored type tags, optionally only those containing `filter` (ignoring case)
    pub fn type_tags(&self, filter: Option<&str>) -> Result<Vec<String>, StorageError> {
        let tags = self.index.type_tags()?;
        Ok(match filter {
            Some(filter) if !filter.is_empty() => {
                let wanted = filter.to_lowercase();
                tags.into_iter()
                    .filter(|tag| tag.to_lowercase().contains(&wanted))
                    .collect()
            }
            _ => tags,
        })
    }
}

fn is_collision(err: &StorageError) -> bool {
    matches!(err, StorageError::Write { source, .. } if source.kind() == io::ErrorKind::AlreadyExists)
}
