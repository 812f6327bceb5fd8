//! Command whitelist: names the dispatcher may route events to.

use crate::dispatch::Handler;
use parking_lot::RwLock;
use std::collections::BTreeMap;
use std::sync::Arc;

/// A routable command
#[derive(Clone)]
pub struct CommandEntry {
    pub name: String,
    /// `<module>.<command>`, reported in handler diagnostics
    pub qualified: String,
    handler: Arc<dyn Handler>,
}

impl CommandEntry {
    pub fn new(
        name: impl Into<String>,
        qualified: impl Into<String>,
        handler: Arc<dyn Handler>,
    ) -> Self {
        Self {
            name: name.into(),
            qualified: qualified.into(),
            handler,
        }
    }

    pub fn handler(&self) -> &Arc<dyn Handler> {
        &self.handler
    }
}

impl std::fmt::Debug for CommandEntry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CommandEntry")
            .field("name", &self.name)
            .field("qualified", &self.qualified)
            .finish()
    }
}

/// Registry of command handlers keyed by exact, case-sensitive name
#[derive(Default)]
pub struct CommandRegistry {
    entries: RwLock<BTreeMap<String, CommandEntry>>,
}

impl CommandRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a handler under `name`; the name doubles as its qualified name
    pub fn register(&self, name: &str, handler: impl Handler + 'static) -> &Self {
        self.add(CommandEntry::new(name, name, Arc::new(handler)));
        self
    }

    /// Insert an entry, replacing any previous entry of the same name
    pub fn add(&self, entry: CommandEntry) {
        self.entries.write().insert(entry.name.clone(), entry);
    }

    pub fn get(&self, name: &str) -> Option<CommandEntry> {
        self.entries.read().get(name).cloned()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.read().contains_key(name)
    }

    /// Sorted command names
    pub fn names(&self) -> Vec<String> {
        self.entries.read().keys().cloned().collect()
    }

    /// Administrative removal
    pub fn remove(&self, name: &str) -> bool {
        self.entries.write().remove(name).is_some()
    }

    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }
}
