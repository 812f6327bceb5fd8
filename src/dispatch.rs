//! Event Dispatch
//!
//! Parses a line of text into an [`Event`], looks the command up in the
//! command whitelist, and runs the handler with a [`Context`] holding the
//! store and registry. Replies accumulate on the event for the transport to
//! drain.

pub mod dispatcher;
pub mod event;
pub mod handler;

pub use dispatcher::{Dispatch, Dispatcher};
pub use event::Event;
pub use handler::{Context, Handler, HandlerError, HandlerResult};
