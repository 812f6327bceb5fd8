use super::support::store;
use satchel::builtin;
use satchel::registry::scan_directory;
use satchel::{
    AttributeBag, Context, Dispatch, Dispatcher, Event, HandlerError, HandlerResult, Module,
    Registry,
};
use std::fs;
use std::sync::Arc;

fn todo_init(bag: &mut AttributeBag) {
    bag.set("txt", "");
}

fn cmd(event: &mut Event, ctx: &Context<'_>) -> HandlerResult {
    event.reply(ctx.registry.commands().names().join(","));
    Ok(())
}

fn cbtick(event: &mut Event, _ctx: &Context<'_>) -> HandlerResult {
    event.reply("tick");
    Ok(())
}

fn save_todo(event: &mut Event, ctx: &Context<'_>) -> HandlerResult {
    let mut bag = ctx
        .registry
        .types()
        .construct("bsc.Todo")
        .ok_or_else(|| HandlerError::msg("bsc.Todo is not registered"))?;
    bag.set("txt", event.rest.clone());
    let handle = ctx.store.save(&mut bag)?;
    event.reply(handle.to_string());
    event.ok();
    Ok(())
}

fn read_missing(_event: &mut Event, ctx: &Context<'_>) -> HandlerResult {
    ctx.store.read("bsc.Todo/abc/2024-01-01/00:00:00")?;
    Ok(())
}

fn bsc() -> Module {
    Module::new("bsc")
        .kind("Todo", todo_init)
        .command("cmd", cmd)
        .command("cbtick", cbtick)
        .command("std", save_todo)
        .command("rdm", read_missing)
        .callable("helper", &["seconds"], cmd)
}

fn dispatcher() -> (tempfile::TempDir, Dispatcher) {
    let (temp, registry, store) = store();
    registry.scan_module(&bsc());
    (temp, Dispatcher::new(registry, Arc::new(store)))
}

#[test]
fn test_scan_registers_command_and_type() {
    let registry = Registry::new();
    let report = registry.scan_module(&bsc());
    assert_eq!(report.types, vec!["bsc.Todo".to_string()]);
    assert!(registry.commands().contains("cmd"));
    assert!(registry.types().contains("bsc.Todo"));
    assert!(!registry.commands().contains("cbtick"));
    assert!(!registry.commands().contains("helper"));
}

#[test]
fn test_dispatch_invokes_scanned_handler() {
    let (_temp, dispatcher) = dispatcher();
    let event = dispatcher.command("cmd");
    assert_eq!(event.replies(), ["cmd,rdm,std".to_string()]);
}

#[test]
fn test_handler_saves_through_context() {
    let (_temp, dispatcher) = dispatcher();
    let mut event = Event::parse("std fix the bike");
    assert_eq!(dispatcher.dispatch(&mut event), Dispatch::Handled);
    assert!(event.is_done());
    let handle = event.replies()[0].clone();
    let bag = dispatcher.store().read(&handle).unwrap();
    assert_eq!(bag.kind(), "bsc.Todo");
    assert_eq!(bag.text("txt"), "fix the bike");
}

#[test]
fn test_storage_failure_becomes_diagnostic() {
    let (_temp, dispatcher) = dispatcher();
    let mut event = Event::parse("rdm");
    assert_eq!(dispatcher.dispatch(&mut event), Dispatch::Failed);
    assert_eq!(event.replies().len(), 1);
    let diagnostic = &event.replies()[0];
    assert!(
        diagnostic.starts_with("bsc.rdm integration/scan_dispatch.rs:"),
        "{}",
        diagnostic
    );
    assert!(diagnostic.contains(" StorageError: "), "{}", diagnostic);
}

#[test]
fn test_unknown_command_is_left_to_transport() {
    let (_temp, dispatcher) = dispatcher();
    let mut event = Event::parse("cbtick");
    assert_eq!(dispatcher.dispatch(&mut event), Dispatch::Unknown);
    assert!(event.replies().is_empty());
}

#[test]
fn test_builtin_module_scan() {
    let registry = Registry::new();
    let report = registry.scan_module(&builtin::module());
    assert_eq!(
        report.types,
        vec!["cmds.Log".to_string(), "cmds.Todo".to_string()]
    );
    assert_eq!(
        registry.commands().names(),
        vec!["cmd", "dlt", "fnd", "log", "tdo", "upt"]
    );
    assert_eq!(registry.types().full("todo"), vec!["cmds.Todo".to_string()]);
}

#[test]
fn test_scan_directory_lists_modules() {
    let temp = tempfile::tempdir().unwrap();
    let dir = temp.path().join("mod");
    fs::create_dir_all(dir.join("__pycache__")).unwrap();
    fs::write(dir.join("bsc.rs"), "").unwrap();
    fs::write(dir.join("bsc.rs~"), "").unwrap();
    fs::write(dir.join("irc.rs"), "").unwrap();

    assert_eq!(
        scan_directory(&dir),
        vec![
            ("mod".to_string(), "bsc".to_string()),
            ("mod".to_string(), "irc".to_string())
        ]
    );
}
