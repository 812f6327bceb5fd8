use super::support::{log, store, ManualClock};
use satchel::{AttributeBag, FindOptions, Selector, TimeWindow, VersionStamp};

#[test]
fn test_two_instances_ordered_by_time() {
    let (_temp, _registry, store) = store();
    let clock = ManualClock::at((2024, 1, 1), (10, 0, 0));
    let store = store.with_clock(clock.version_clock());

    let milk = log(&store, "buy milk");
    clock.set((2024, 1, 1), (11, 30, 0));
    let bob = log(&store, "call bob");

    let found = store.find("Log", &FindOptions::new()).unwrap();
    assert_eq!(found.len(), 2);
    assert_eq!(found[0].instance(), milk.instance());
    assert_eq!(found[0].text("txt"), "buy milk");
    assert_eq!(found[1].instance(), bob.instance());
    assert_eq!(found[1].text("txt"), "call bob");
    assert_eq!(
        found[0].handle().unwrap().to_string(),
        format!("cmds.Log/{}/2024-01-01/10:00:00.000000", milk.instance())
    );
}

#[test]
fn test_latest_wins() {
    let (_temp, _registry, store) = store();
    let clock = ManualClock::at((2024, 1, 1), (9, 0, 0));
    let store = store.with_clock(clock.version_clock());

    let mut bag = AttributeBag::new("cmds.Log");
    for (hour, txt) in [(9, "t1"), (10, "t2"), (11, "t3")] {
        clock.set((2024, 1, 1), (hour, 0, 0));
        bag.set("txt", txt);
        store.save(&mut bag).unwrap();
    }

    let latest = store.last("log", &Selector::new()).unwrap().unwrap();
    assert_eq!(latest.text("txt"), "t3");
    assert_eq!(store.find("log", &FindOptions::new()).unwrap().len(), 1);
}

#[test]
fn test_latest_crosses_date_directories() {
    let (_temp, _registry, store) = store();
    let clock = ManualClock::at((2024, 1, 31), (23, 59, 59));
    let store = store.with_clock(clock.version_clock());

    let mut bag = AttributeBag::new("cmds.Log");
    bag.set("txt", "january");
    store.save(&mut bag).unwrap();
    clock.set((2024, 2, 1), (0, 0, 1));
    bag.set("txt", "february");
    store.save(&mut bag).unwrap();

    let latest = store.last("Log", &Selector::new()).unwrap().unwrap();
    assert_eq!(latest.text("txt"), "february");
}

#[test]
fn test_selector_matches_any_field() {
    let (_temp, _registry, store) = store();
    let mut bag = AttributeBag::new("cmds.Log");
    bag.set("a", "foo");
    bag.set("b", "bar");
    store.save(&mut bag).unwrap();

    let selector = Selector::new().with("a", "foo").with("b", "zzz");
    let found = store
        .find("Log", &FindOptions::new().selector(selector))
        .unwrap();
    assert_eq!(found.len(), 1);

    let selector = Selector::new().with("a", "xxx").with("b", "zzz");
    assert!(store
        .find("Log", &FindOptions::new().selector(selector))
        .unwrap()
        .is_empty());
}

#[test]
fn test_time_window_excludes_older_instances() {
    let (_temp, _registry, store) = store();
    let clock = ManualClock::at((2024, 1, 1), (10, 0, 0));
    let store = store.with_clock(clock.version_clock());

    log(&store, "early");
    clock.set((2024, 1, 2), (10, 0, 0));
    let t2 = VersionStamp::parse("2024-01-02/00:00:00").unwrap();
    log(&store, "late");

    let found = store
        .find("Log", &FindOptions::new().window(TimeWindow::since(t2)))
        .unwrap();
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].text("txt"), "late");

    let found = store
        .find("Log", &FindOptions::new().window(TimeWindow::until(t2)))
        .unwrap();
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].text("txt"), "early");
}

#[test]
fn test_unknown_type_is_empty_not_error() {
    let (_temp, _registry, store) = store();
    log(&store, "x");
    assert!(store.find("Nothing", &FindOptions::new()).unwrap().is_empty());
    assert!(store.last("Nothing", &Selector::new()).unwrap().is_none());
}

#[test]
fn test_unregistered_type_found_by_directory_name() {
    let (_temp, _registry, store) = store();
    let mut feed = AttributeBag::new("rss.Feed");
    feed.set("url", "https://example.org/feed");
    store.save(&mut feed).unwrap();

    let found = store.find("feed", &FindOptions::new()).unwrap();
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].kind(), "rss.Feed");
}

#[test]
fn test_unregistered_type_found_by_qualified_name() {
    let (_temp, _registry, store) = store();
    let mut feed = AttributeBag::new("rss.Feed");
    feed.set("url", "https://example.org/feed");
    store.save(&mut feed).unwrap();

    for tag in ["rss.Feed", "RSS.feed", feed.kind()] {
        let found = store.find(tag, &FindOptions::new()).unwrap();
        assert_eq!(found.len(), 1, "{}", tag);
        assert_eq!(found[0].instance(), feed.instance());
    }
    assert!(store.find("rss.Feeds", &FindOptions::new()).unwrap().is_empty());
}
