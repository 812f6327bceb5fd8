//! Field selectors, time windows, and find options.

use crate::bag::{AttributeBag, VersionStamp};
use crate::types::SelectorMap;

/// Field-substring filter.
///
/// A bag matches when at least one named field is present and its string
/// form contains the wanted substring. An empty selector matches everything.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Selector(SelectorMap);

impl Selector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, field: impl Into<String>, substring: impl Into<String>) -> Self {
        self.0.insert(field.into(), substring.into());
        self
    }

    /// Build from `key=value` tokens; tokens without `=` are ignored
    pub fn from_pairs<'a>(pairs: impl IntoIterator<Item = &'a str>) -> Self {
        let mut map = SelectorMap::new();
        for pair in pairs {
            if let Some((key, value)) = pair.split_once('=') {
                if !key.is_empty() {
                    map.insert(key.to_string(), value.to_string());
                }
            }
        }
        Self(map)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn fields(&self) -> &SelectorMap {
        &self.0
    }

    pub fn matches(&self, bag: &AttributeBag) -> bool {
        if self.0.is_empty() {
            return true;
        }
        self.0.iter().any(|(field, wanted)| {
            bag.get(field)
                .map(|value| value.to_string().contains(wanted.as_str()))
                .unwrap_or(false)
        })
    }
}

impl From<SelectorMap> for Selector {
    fn from(map: SelectorMap) -> Self {
        Self(map)
    }
}

/// Inclusive bounds on version stamps
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TimeWindow {
    pub from: Option<VersionStamp>,
    pub to: Option<VersionStamp>,
}

impl TimeWindow {
    pub fn since(from: VersionStamp) -> Self {
        Self {
            from: Some(from),
            to: None,
        }
    }

    pub fn until(to: VersionStamp) -> Self {
        Self {
            from: None,
            to: Some(to),
        }
    }

    pub fn between(from: VersionStamp, to: VersionStamp) -> Self {
        Self {
            from: Some(from),
            to: Some(to),
        }
    }

    pub fn contains(&self, stamp: VersionStamp) -> bool {
        self.from.map_or(true, |from| stamp >= from) && self.to.map_or(true, |to| stamp <= to)
    }
}

/// Options for [`VersionedStore::find`](crate::store::VersionedStore::find)
#[derive(Debug, Clone, Default)]
pub struct FindOptions {
    pub selector: Selector,
    pub window: TimeWindow,
    /// Drop instances whose latest version is soft-deleted
    pub skip_deleted: bool,
    /// Keep only the n-th result (0-based) after ordering
    pub index: Option<usize>,
}

impl FindOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn selector(mut self, selector: Selector) -> Self {
        self.selector = selector;
        self
    }

    pub fn window(mut self, window: TimeWindow) -> Self {
        self.window = window;
        self
    }

    pub fn skip_deleted(mut self, skip: bool) -> Self {
        self.skip_deleted = skip;
        self
    }

    pub fn index(mut self, index: usize) -> Self {
        self.index = Some(index);
        self
    }
}
