use super::support::store;
use satchel::{AttributeBag, FindOptions};
use std::collections::BTreeSet;
use std::sync::Arc;
use std::thread;

#[test]
fn test_concurrent_saves_of_distinct_instances() {
    let (_temp, _registry, store) = store();
    let store = Arc::new(store);

    let handles: Vec<_> = (0..8)
        .map(|worker| {
            let store = Arc::clone(&store);
            thread::spawn(move || {
                for n in 0..5 {
                    let mut bag = AttributeBag::new("cmds.Log");
                    bag.set("txt", format!("w{} n{}", worker, n));
                    store.save(&mut bag).unwrap();
                }
            })
        })
        .collect();
    for handle in handles {
        handle.join().unwrap();
    }

    let found = store.find("Log", &FindOptions::new()).unwrap();
    assert_eq!(found.len(), 40);
    let texts: BTreeSet<String> = found.iter().map(|b| b.text("txt").to_string()).collect();
    assert_eq!(texts.len(), 40);
    assert!(found
        .windows(2)
        .all(|w| w[0].version() <= w[1].version()));
}

#[test]
fn test_concurrent_saves_of_one_instance_never_collide() {
    let (_temp, _registry, store) = store();
    let store = Arc::new(store);
    let template = AttributeBag::new("cmds.Log");

    let handles: Vec<_> = (0..6)
        .map(|worker| {
            let store = Arc::clone(&store);
            let mut bag = template.clone();
            thread::spawn(move || {
                let mut written = Vec::new();
                for n in 0..5 {
                    bag.set("txt", format!("w{} n{}", worker, n));
                    written.push(store.save(&mut bag).unwrap());
                }
                written
            })
        })
        .collect();

    let mut versions = BTreeSet::new();
    for handle in handles {
        for written in handle.join().unwrap() {
            assert_eq!(&written.instance, template.instance());
            assert!(versions.insert(written.version));
        }
    }
    assert_eq!(versions.len(), 30);

    let current = store
        .current_version("cmds.Log", template.instance())
        .unwrap()
        .unwrap();
    assert_eq!(Some(&current), versions.iter().next_back());
    let found = store.find("Log", &FindOptions::new()).unwrap();
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].version(), Some(current));
}
