//! Type whitelist: qualified kind names allowed to be reconstructed from disk.

use crate::bag::AttributeBag;
use parking_lot::RwLock;
use std::collections::BTreeMap;

/// Fills a freshly created bag with the default fields of its kind
pub type KindInit = fn(&mut AttributeBag);

/// One whitelisted kind
#[derive(Clone)]
pub struct TypeEntry {
    pub qualified: String,
    init: KindInit,
}

impl TypeEntry {
    pub fn new(qualified: impl Into<String>, init: KindInit) -> Self {
        Self {
            qualified: qualified.into(),
            init,
        }
    }

    /// Last dotted component of the qualified name
    pub fn bare_name(&self) -> &str {
        bare_name(&self.qualified)
    }

    /// Apply the kind's defaults to a bag
    pub fn init(&self, bag: &mut AttributeBag) {
        (self.init)(bag)
    }

    /// Build an empty bag of this kind
    pub fn construct(&self) -> AttributeBag {
        let mut bag = AttributeBag::new(self.qualified.clone());
        self.init(&mut bag);
        bag
    }
}

impl std::fmt::Debug for TypeEntry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TypeEntry")
            .field("qualified", &self.qualified)
            .finish()
    }
}

pub(crate) fn bare_name(qualified: &str) -> &str {
    qualified.rsplit('.').next().unwrap_or(qualified)
}

/// Whitelist of kinds, keyed by fully qualified name.
///
/// Qualified names are unique; bare names need not be.
#[derive(Default)]
pub struct TypeRegistry {
    entries: RwLock<BTreeMap<String, TypeEntry>>,
}

impl TypeRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a kind, replacing any entry with the same qualified name
    pub fn add(&self, qualified: impl Into<String>, init: KindInit) {
        let entry = TypeEntry::new(qualified, init);
        self.entries.write().insert(entry.qualified.clone(), entry);
    }

    /// Exact lookup by qualified name
    pub fn get(&self, qualified: &str) -> Option<TypeEntry> {
        self.entries.read().get(qualified).cloned()
    }

    pub fn contains(&self, qualified: &str) -> bool {
        self.entries.read().contains_key(qualified)
    }

    /// Build an empty bag of a registered kind
    pub fn construct(&self, qualified: &str) -> Option<AttributeBag> {
        self.get(qualified).map(|entry| entry.construct())
    }

    /// All qualified names whose bare name equals `name`, ignoring case
    pub fn full(&self, name: &str) -> Vec<String> {
        let wanted = name.to_lowercase();
        self.entries
            .read()
            .values()
            .filter(|entry| entry.bare_name().to_lowercase() == wanted)
            .map(|entry| entry.qualified.clone())
            .collect()
    }

    pub fn names(&self) -> Vec<String> {
        self.entries.read().keys().cloned().collect()
    }

    /// Administrative removal
    pub fn remove(&self, qualified: &str) -> bool {
        self.entries.write().remove(qualified).is_some()
    }

    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }
}
