//! Built-in `cmds` module: log and todo kinds plus the basic commands.

pub mod commands;
pub mod kinds;

use crate::registry::Module;

pub const MODULE_NAME: &str = "cmds";

/// Declaration of the built-in module, ready for
/// [`Registry::scan_module`](crate::registry::Registry::scan_module)
pub fn module() -> Module {
    Module::new(MODULE_NAME)
        .kind(kinds::LOG, kinds::init_text)
        .kind(kinds::TODO, kinds::init_text)
        .command("cmd", commands::cmd)
        .command("log", commands::log)
        .command("tdo", commands::tdo)
        .command("upt", commands::upt)
        .command("fnd", commands::fnd)
        .command("dlt", commands::dlt)
}
