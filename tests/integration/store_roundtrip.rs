use super::support::{log, store, ManualClock};
use satchel::store::{FsIndex, VersionIndex};
use satchel::{AttributeBag, StorageError, StoreRoot, Value};
use std::collections::BTreeMap;
use std::fs;
use std::sync::Arc;

#[test]
fn test_round_trip_preserves_fields() {
    let (_temp, _registry, store) = store();
    let mut bag = AttributeBag::new("cmds.Log");
    bag.set("txt", "buy milk");
    bag.set("count", 3);
    bag.set("ratio", 0.5);
    bag.set("done", false);
    bag.set("nothing", Value::Null);
    let mut nested = BTreeMap::new();
    nested.insert("channel".to_string(), Value::from("#dev"));
    bag.set("meta", nested);
    bag.set("tags", vec![Value::from("a"), Value::from(1)]);

    let handle = store.save(&mut bag).unwrap();
    let back = store.read_handle(&handle).unwrap();
    assert_eq!(back.fields(), bag.fields());
    assert_eq!(back.kind(), "cmds.Log");
    assert_eq!(back.instance(), bag.instance());
}

#[test]
fn test_layout_and_artifact_format() {
    let (temp, _registry, store) = store();
    let clock = ManualClock::at((2024, 1, 1), (10, 0, 0));
    let store = store.with_clock(clock.version_clock());

    let mut bag = AttributeBag::new("cmds.Log");
    bag.set("txt", "buy milk");
    let handle = store.save(&mut bag).unwrap();
    assert_eq!(
        handle.to_string(),
        format!("cmds.Log/{}/2024-01-01/10:00:00.000000", bag.instance())
    );
    assert_eq!(bag.instance().as_str().len(), 32);

    let path = temp
        .path()
        .join("cmds.Log")
        .join(bag.instance().as_str())
        .join("2024-01-01")
        .join("10:00:00.000000");
    let text = fs::read_to_string(&path).unwrap();
    assert_eq!(text, "{\n    \"txt\": \"buy milk\"\n}");
}

#[test]
fn test_sequential_saves_are_monotonic() {
    let (_temp, _registry, store) = store();
    let mut bag = AttributeBag::new("cmds.Log");
    let mut handles = Vec::new();
    for n in 0..5 {
        bag.set("n", n);
        handles.push(store.save(&mut bag).unwrap());
    }
    for pair in handles.windows(2) {
        assert_eq!(pair[0].kind, pair[1].kind);
        assert_eq!(pair[0].instance, pair[1].instance);
        assert!(pair[1].version > pair[0].version);
    }
    // every version stays readable with the fields it had
    for (n, handle) in handles.iter().enumerate() {
        let version = store.read_handle(handle).unwrap();
        assert_eq!(version.get("n"), Some(&Value::Int(n as i64)));
    }
}

#[test]
fn test_versions_are_immutable() {
    let (temp, _registry, store) = store();
    let bag = log(&store, "original");
    let handle = bag.handle().unwrap();

    let path = temp.path().join(handle.relative_path(false));
    assert!(fs::metadata(&path).unwrap().permissions().readonly());

    let index = FsIndex::new(Arc::new(StoreRoot::at(temp.path())), false);
    let mut replacement = bag.fields().clone();
    replacement.insert("txt".to_string(), Value::from("tampered"));
    match index.put(&handle, &replacement) {
        Err(StorageError::Write { source, .. }) => {
            assert_eq!(source.kind(), std::io::ErrorKind::AlreadyExists)
        }
        other => panic!("overwrite was not rejected: {:?}", other),
    }
    assert_eq!(store.read_handle(&handle).unwrap().text("txt"), "original");
}

#[test]
fn test_read_accepts_underscore_spelling() {
    let (temp, _registry, store) = store();
    let dir = temp.path().join("cmds.Log/0123abcd/2024-03-05");
    fs::create_dir_all(&dir).unwrap();
    fs::write(dir.join("08_15_00.250000"), "{\"txt\": \"legacy\"}").unwrap();

    let bag = store
        .read(temp.path().join("cmds.Log/0123abcd/2024-03-05/08_15_00.250000"))
        .unwrap();
    assert_eq!(bag.text("txt"), "legacy");
    assert_eq!(
        bag.version().unwrap().to_string(),
        "2024-03-05/08:15:00.250000"
    );
}

#[test]
fn test_invalid_handle() {
    let (_temp, _registry, store) = store();
    assert!(matches!(
        store.read("cmds.Log/only-two"),
        Err(StorageError::InvalidHandle(_))
    ));
    assert!(matches!(
        store.read("cmds.Log/abc/2024-13-45/10:00:00"),
        Err(StorageError::InvalidHandle(_))
    ));
}
