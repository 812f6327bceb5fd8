//! Module declarations and registry scanning.
//!
//! A [`Module`] is an explicit description of a code unit: the kinds it
//! declares and the callables it exposes with their parameter names. Scanning
//! a module turns those declarations into whitelist entries.

use crate::dispatch::Handler;
use crate::registry::types::KindInit;
use std::path::Path;
use std::sync::Arc;
use walkdir::WalkDir;

/// Parameter name that marks a callable as an event handler
pub const EVENT_PARAM: &str = "event";

/// Name prefix of callables reserved for internal callback machinery
pub const CALLBACK_PREFIX: &str = "cb";

/// Kind declared by a module
#[derive(Clone)]
pub struct KindDecl {
    pub name: String,
    pub init: KindInit,
}

/// Top-level callable declared by a module
#[derive(Clone)]
pub struct Callable {
    pub name: String,
    pub params: Vec<String>,
    pub handler: Arc<dyn Handler>,
}

/// A code unit offered for scanning
#[derive(Clone)]
pub struct Module {
    name: String,
    kinds: Vec<KindDecl>,
    callables: Vec<Callable>,
}

impl Module {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kinds: Vec::new(),
            callables: Vec::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Declare a kind with its default-field initializer
    pub fn kind(mut self, name: &str, init: KindInit) -> Self {
        self.kinds.push(KindDecl {
            name: name.to_string(),
            init,
        });
        self
    }

    /// Declare a callable with its parameter names
    pub fn callable(mut self, name: &str, params: &[&str], handler: impl Handler + 'static) -> Self {
        self.callables.push(Callable {
            name: name.to_string(),
            params: params.iter().map(|p| p.to_string()).collect(),
            handler: Arc::new(handler),
        });
        self
    }

    /// Declare a callable taking the conventional event parameter
    pub fn command(self, name: &str, handler: impl Handler + 'static) -> Self {
        self.callable(name, &[EVENT_PARAM], handler)
    }

    pub fn kinds(&self) -> &[KindDecl] {
        &self.kinds
    }

    pub fn callables(&self) -> &[Callable] {
        &self.callables
    }

    /// `<module>.<name>`
    pub fn qualify(&self, name: &str) -> String {
        format!("{}.{}", self.name, name)
    }
}

/// Rules deciding which callables become commands
#[derive(Debug, Clone)]
pub struct ScanPolicy {
    pub event_param: String,
    pub callback_prefix: String,
}

impl ScanPolicy {
    pub fn accepts(&self, callable: &Callable) -> bool {
        if !self.callback_prefix.is_empty() && callable.name.starts_with(&self.callback_prefix) {
            return false;
        }
        callable.params.iter().any(|p| *p == self.event_param)
    }
}

impl Default for ScanPolicy {
    fn default() -> Self {
        Self {
            event_param: EVENT_PARAM.to_string(),
            callback_prefix: CALLBACK_PREFIX.to_string(),
        }
    }
}

/// What one scan registered
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScanReport {
    pub types: Vec<String>,
    pub commands: Vec<String>,
}

/// List loadable units under a directory as `(package, module)` pairs.
///
/// Backup files (`~` suffix) and private entries (`__` prefix) are skipped.
/// A missing directory yields an empty list.
pub fn scan_directory(path: &Path) -> Vec<(String, String)> {
    if !path.exists() {
        return Vec::new();
    }
    let package = path
        .file_name()
        .and_then(|n| n.to_str())
        .map(str::to_string)
        .unwrap_or_else(|| path.display().to_string());

    let mut units = Vec::new();
    for entry in WalkDir::new(path)
        .min_depth(1)
        .max_depth(1)
        .sort_by_file_name()
    {
        let entry = match entry {
            Ok(e) => e,
            Err(e) => {
                tracing::warn!("Failed to read entry under {}: {}", path.display(), e);
                continue;
            }
        };
        let file_name = match entry.file_name().to_str() {
            Some(name) => name,
            None => continue,
        };
        if file_name.ends_with('~') || file_name.starts_with("__") {
            continue;
        }
        let module = if entry.file_type().is_dir() {
            file_name.to_string()
        } else {
            match entry.path().file_stem().and_then(|s| s.to_str()) {
                Some(stem) => stem.to_string(),
                None => continue,
            }
        };
        units.push((package.clone(), module));
    }
    units
}
