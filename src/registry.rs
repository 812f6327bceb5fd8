//! Type and Command Registries
//!
//! The whitelists that gate deserialization (which kinds may be rebuilt from
//! disk) and dispatch (which command names route to handlers). Both are filled
//! at startup by scanning declared modules and are read-mostly afterwards.

pub mod commands;
pub mod scan;
pub mod types;

pub use commands::{CommandEntry, CommandRegistry};
pub use scan::{scan_directory, Callable, KindDecl, Module, ScanPolicy, ScanReport};
pub use types::{KindInit, TypeEntry, TypeRegistry};

use parking_lot::Mutex;
use std::sync::Arc;
use tracing::debug;

/// Both whitelists plus the policy used to fill them.
///
/// Passed explicitly to the store and dispatcher; there is no global instance.
pub struct Registry {
    types: Arc<TypeRegistry>,
    commands: Arc<CommandRegistry>,
    policy: ScanPolicy,
    scan_lock: Mutex<()>,
}

impl Registry {
    pub fn new() -> Self {
        Self::with_policy(ScanPolicy::default())
    }

    pub fn with_policy(policy: ScanPolicy) -> Self {
        Self {
            types: Arc::new(TypeRegistry::new()),
            commands: Arc::new(CommandRegistry::new()),
            policy,
            scan_lock: Mutex::new(()),
        }
    }

    pub fn types(&self) -> &Arc<TypeRegistry> {
        &self.types
    }

    pub fn commands(&self) -> &Arc<CommandRegistry> {
        &self.commands
    }

    pub fn policy(&self) -> &ScanPolicy {
        &self.policy
    }

    /// Register a module's kinds as `<module>.<Kind>` and its event-taking,
    /// non-callback callables as commands.
    ///
    /// Scans are serialized with each other. Rescanning a module overwrites
    /// its entries with identical definitions.
    pub fn scan_module(&self, module: &Module) -> ScanReport {
        let _guard = self.scan_lock.lock();
        let mut report = ScanReport::default();

        for kind in module.kinds() {
            let qualified = module.qualify(&kind.name);
            self.types.add(qualified.clone(), kind.init);
            report.types.push(qualified);
        }

        for callable in module.callables() {
            if !self.policy.accepts(callable) {
                debug!(module = module.name(), callable = %callable.name, "skipping non-command callable");
                continue;
            }
            self.commands.add(CommandEntry::new(
                callable.name.clone(),
                module.qualify(&callable.name),
                Arc::clone(&callable.handler),
            ));
            report.commands.push(callable.name.clone());
        }

        debug!(
            module = module.name(),
            types = report.types.len(),
            commands = report.commands.len(),
            "module scanned"
        );
        report
    }
}

impl Default for Registry {
    fn default() -> Self {
        Self::new()
    }
}
