//! Tooling & Integration Layer
//!
//! Thin transports over the dispatcher: the command-line interface and the
//! line-oriented shell it can start.

pub mod cli;
pub mod shell;

pub use cli::{Cli, CliContext, Commands};
pub use shell::ShellStats;
