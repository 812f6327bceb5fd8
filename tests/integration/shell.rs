use super::support::store;
use satchel::builtin;
use satchel::tooling::shell::{run, ShellStats};
use satchel::Dispatcher;
use std::io::Cursor;
use std::sync::Arc;

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_shell_session_with_builtins() {
    let (_temp, registry, store) = store();
    registry.scan_module(&builtin::module());
    let dispatcher = Arc::new(Dispatcher::new(registry, Arc::new(store)));

    let script = "cmd\nlog buy milk\nbogus\n";
    let mut out = Vec::new();
    let stats = run(Arc::clone(&dispatcher), 2, Cursor::new(script), &mut out)
        .await
        .unwrap();
    let text = String::from_utf8(out).unwrap();
    assert_eq!(
        text,
        "cmd,dlt,fnd,log,tdo,upt\nok\nunknown command: bogus\n"
    );
    assert_eq!(
        stats,
        ShellStats {
            handled: 2,
            failed: 0,
            unknown: 1
        }
    );

    let mut out = Vec::new();
    run(dispatcher, 1, Cursor::new("fnd log txt=milk\n"), &mut out)
        .await
        .unwrap();
    let text = String::from_utf8(out).unwrap();
    assert!(text.starts_with("0 txt=\"buy milk\" "), "{}", text);
}
