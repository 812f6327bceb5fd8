//! Handler trait, handler context, and handler errors.

use crate::dispatch::event::Event;
use crate::registry::Registry;
use crate::store::VersionedStore;
use std::fmt;
use std::panic::Location;
use std::time::{Duration, Instant};

pub type HandlerResult = Result<(), HandlerError>;

/// A command implementation.
///
/// Implemented for every `Fn(&mut Event, &Context) -> HandlerResult`, so plain
/// functions register directly.
pub trait Handler: Send + Sync {
    fn call(&self, event: &mut Event, ctx: &Context<'_>) -> HandlerResult;
}

impl<F> Handler for F
where
    F: Fn(&mut Event, &Context<'_>) -> HandlerResult + Send + Sync,
{
    fn call(&self, event: &mut Event, ctx: &Context<'_>) -> HandlerResult {
        self(event, ctx)
    }
}

/// Shared state a handler may use while serving one event
pub struct Context<'a> {
    pub store: &'a VersionedStore,
    pub registry: &'a Registry,
    started: Instant,
}

impl<'a> Context<'a> {
    pub fn new(store: &'a VersionedStore, registry: &'a Registry, started: Instant) -> Self {
        Self {
            store,
            registry,
            started,
        }
    }

    /// Time since the dispatcher was created
    pub fn uptime(&self) -> Duration {
        self.started.elapsed()
    }
}

/// Failure raised by a handler, tagged with the source location it came from.
///
/// Any `std::error::Error` converts through `?`, capturing the location of
/// the `?`.
pub struct HandlerError {
    kind: String,
    message: String,
    location: &'static Location<'static>,
}

impl HandlerError {
    /// Ad-hoc failure with a plain message
    #[track_caller]
    pub fn msg(message: impl Into<String>) -> Self {
        Self {
            kind: "Error".to_string(),
            message: message.into(),
            location: Location::caller(),
        }
    }

    pub fn kind(&self) -> &str {
        &self.kind
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    /// `dir/file.rs:line`
    pub fn location(&self) -> String {
        site_label(self.location.file(), self.location.line())
    }
}

impl<E> From<E> for HandlerError
where
    E: std::error::Error + Send + Sync + 'static,
{
    #[track_caller]
    fn from(err: E) -> Self {
        Self {
            kind: short_type_name::<E>(),
            message: err.to_string(),
            location: Location::caller(),
        }
    }
}

impl fmt::Display for HandlerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}: {}", self.location(), self.kind, self.message)
    }
}

impl fmt::Debug for HandlerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HandlerError")
            .field("kind", &self.kind)
            .field("message", &self.message)
            .field("location", &self.location())
            .finish()
    }
}

/// A caught handler panic
pub(crate) struct PanicReport {
    message: String,
    location: Option<(String, u32)>,
}

impl PanicReport {
    pub(crate) fn new(message: String, location: Option<(String, u32)>) -> Self {
        Self { message, location }
    }
}

impl fmt::Display for PanicReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let site = match &self.location {
            Some((file, line)) => site_label(file, *line),
            None => "<unknown>".to_string(),
        };
        write!(f, "{} Panic: {}", site, self.message)
    }
}

/// Last two path components of a source file plus the line number
pub(crate) fn site_label(file: &str, line: u32) -> String {
    let normalized = file.replace('\\', "/");
    let parts: Vec<&str> = normalized.rsplit('/').take(2).collect();
    let short: Vec<&str> = parts.into_iter().rev().collect();
    format!("{}:{}", short.join("/"), line)
}

fn short_type_name<E>() -> String {
    let full = std::any::type_name::<E>();
    let base = full.split('<').next().unwrap_or(full);
    let name = base.rsplit("::").next().unwrap_or(base);
    if name == "Error" {
        // io::Error, fmt::Error and friends: keep the module for context
        let mut segments = base.rsplit("::");
        segments.next();
        match segments.find(|s| *s != "error") {
            Some(module) => format!("{}::Error", module),
            None => name.to_string(),
        }
    } else {
        name.to_string()
    }
}
