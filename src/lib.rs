//! satchel: Versioned Attribute Store and Command Dispatch
//!
//! Persists schema-less attribute bags as immutable, timestamped versions in a
//! `type/instance/date/time` directory layout, and routes short textual
//! commands to whitelisted handlers that read and write those bags.

pub mod bag;
pub mod builtin;
pub mod concurrency;
pub mod config;
pub mod dispatch;
pub mod elapsed;
pub mod error;
pub mod logging;
pub mod registry;
pub mod store;
pub mod tooling;
pub mod types;

pub use bag::{AttributeBag, Handle, InstanceId, Value, VersionStamp};
pub use dispatch::{Context, Dispatch, Dispatcher, Event, Handler, HandlerError, HandlerResult};
pub use error::{ApiError, StorageError};
pub use registry::{Module, Registry};
pub use store::{FindOptions, Selector, StoreRoot, TimeWindow, VersionedStore};
