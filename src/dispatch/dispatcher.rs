//! Routes parsed events to whitelisted handlers.

use crate::dispatch::event::Event;
use crate::dispatch::handler::{Context, PanicReport};
use crate::error::ApiError;
use crate::registry::{CommandEntry, Registry};
use crate::store::VersionedStore;
use std::any::Any;
use std::cell::{Cell, RefCell};
use std::panic::{self, AssertUnwindSafe};
use std::sync::{Arc, Once};
use std::time::Instant;
use tracing::{debug, warn};

/// Outcome of dispatching one event
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dispatch {
    /// The handler ran to completion
    Handled,
    /// The handler failed; a diagnostic reply was added
    Failed,
    /// No command of that name is registered; no reply was added
    Unknown,
}

thread_local! {
    static IN_HANDLER: Cell<bool> = const { Cell::new(false) };
    static PANIC_SITE: RefCell<Option<(String, u32)>> = const { RefCell::new(None) };
}

static PANIC_HOOK: Once = Once::new();

/// Record panic locations raised inside handlers instead of printing them.
/// Panics elsewhere go to the previously installed hook.
fn install_panic_hook() {
    PANIC_HOOK.call_once(|| {
        let previous = panic::take_hook();
        panic::set_hook(Box::new(move |info| {
            if IN_HANDLER.with(Cell::get) {
                let site = info
                    .location()
                    .map(|loc| (loc.file().to_string(), loc.line()));
                PANIC_SITE.with(|slot| *slot.borrow_mut() = site);
            } else {
                previous(info);
            }
        }));
    });
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "handler panicked".to_string()
    }
}

/// Looks up commands and runs their handlers against a shared store.
///
/// Handler failures never escape `dispatch`; they become a single reply on
/// the event.
pub struct Dispatcher {
    registry: Arc<Registry>,
    store: Arc<VersionedStore>,
    started: Instant,
}

impl Dispatcher {
    pub fn new(registry: Arc<Registry>, store: Arc<VersionedStore>) -> Self {
        install_panic_hook();
        Self {
            registry,
            store,
            started: Instant::now(),
        }
    }

    pub fn registry(&self) -> &Arc<Registry> {
        &self.registry
    }

    pub fn store(&self) -> &Arc<VersionedStore> {
        &self.store
    }

    /// Exact, case-sensitive command lookup
    pub fn resolve(&self, name: &str) -> Result<CommandEntry, ApiError> {
        self.registry
            .commands()
            .get(name)
            .ok_or_else(|| ApiError::UnknownCommand(name.to_string()))
    }

    pub fn dispatch(&self, event: &mut Event) -> Dispatch {
        let entry = match self.registry.commands().get(&event.command) {
            Some(entry) => entry,
            None => {
                debug!(command = %event.command, "unknown command");
                return Dispatch::Unknown;
            }
        };

        let ctx = Context::new(&self.store, &self.registry, self.started);
        IN_HANDLER.with(|flag| flag.set(true));
        let outcome = panic::catch_unwind(AssertUnwindSafe(|| entry.handler().call(event, &ctx)));
        IN_HANDLER.with(|flag| flag.set(false));

        let diagnostic = match outcome {
            Ok(Ok(())) => {
                debug!(command = %entry.qualified, replies = event.replies().len(), "handled");
                return Dispatch::Handled;
            }
            Ok(Err(err)) => format!("{} {}", entry.qualified, err),
            Err(payload) => {
                let site = PANIC_SITE.with(|slot| slot.borrow_mut().take());
                let report = PanicReport::new(panic_message(payload.as_ref()), site);
                format!("{} {}", entry.qualified, report)
            }
        };

        warn!(command = %entry.qualified, origin = ?event.origin, "{}", diagnostic);
        event.reply(diagnostic);
        event.complete();
        Dispatch::Failed
    }

    /// Parse a line and dispatch it in one step
    pub fn command(&self, text: &str) -> Event {
        let mut event = Event::parse(text);
        self.dispatch(&mut event);
        event
    }
}
