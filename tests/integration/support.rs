use chrono::{NaiveDate, NaiveDateTime};
use parking_lot::Mutex;
use satchel::store::VersionClock;
use satchel::{AttributeBag, Registry, VersionedStore};
use std::sync::Arc;
use tempfile::TempDir;

/// Settable wall clock shared with a store
#[derive(Clone)]
pub struct ManualClock(Arc<Mutex<NaiveDateTime>>);

fn datetime(date: (i32, u32, u32), time: (u32, u32, u32)) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(date.0, date.1, date.2)
        .unwrap()
        .and_hms_micro_opt(time.0, time.1, time.2, 0)
        .unwrap()
}

impl ManualClock {
    pub fn at(date: (i32, u32, u32), time: (u32, u32, u32)) -> Self {
        ManualClock(Arc::new(Mutex::new(datetime(date, time))))
    }

    pub fn set(&self, date: (i32, u32, u32), time: (u32, u32, u32)) {
        *self.0.lock() = datetime(date, time);
    }

    pub fn version_clock(&self) -> VersionClock {
        let inner = Arc::clone(&self.0);
        VersionClock::from_fn(move || *inner.lock())
    }
}

pub fn log_init(bag: &mut AttributeBag) {
    bag.set("txt", "");
}

/// Store in a fresh temp dir with `cmds.Log` registered
pub fn store() -> (TempDir, Arc<Registry>, VersionedStore) {
    let temp = TempDir::new().unwrap();
    let registry = Arc::new(Registry::new());
    registry.types().add("cmds.Log", log_init);
    let store = VersionedStore::filesystem(
        Arc::new(satchel::StoreRoot::at(temp.path())),
        false,
        Arc::clone(registry.types()),
    );
    (temp, registry, store)
}

pub fn log(store: &VersionedStore, txt: &str) -> AttributeBag {
    let mut bag = AttributeBag::new("cmds.Log");
    bag.set("txt", txt);
    store.save(&mut bag).unwrap();
    bag
}
