//! Version stamp source.

use crate::bag::VersionStamp;
use chrono::{Local, NaiveDateTime};
use parking_lot::Mutex;

type TimeSource = Box<dyn Fn() -> NaiveDateTime + Send + Sync>;

/// Mints version stamps that strictly increase within the process, even when
/// the wall clock stalls or steps backwards.
pub struct VersionClock {
    source: TimeSource,
    last: Mutex<Option<VersionStamp>>,
}

impl VersionClock {
    /// Local wall-clock time
    pub fn system() -> Self {
        Self::from_fn(|| Local::now().naive_local())
    }

    /// Custom time source, mostly for tests
    pub fn from_fn(source: impl Fn() -> NaiveDateTime + Send + Sync + 'static) -> Self {
        Self {
            source: Box::new(source),
            last: Mutex::new(None),
        }
    }

    /// Next stamp, greater than every stamp minted so far and than `floor`
    pub fn next_after(&self, floor: Option<VersionStamp>) -> VersionStamp {
        let mut last = self.last.lock();
        let mut stamp = VersionStamp::from_datetime((self.source)());
        for bound in [*last, floor].into_iter().flatten() {
            if stamp <= bound {
                stamp = bound.next_micro();
            }
        }
        *last = Some(stamp);
        stamp
    }

    pub fn next(&self) -> VersionStamp {
        self.next_after(None)
    }
}

impl Default for VersionClock {
    fn default() -> Self {
        Self::system()
    }
}

impl std::fmt::Debug for VersionClock {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VersionClock")
            .field("last", &*self.last.lock())
            .finish()
    }
}
