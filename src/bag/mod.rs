//! Attribute Bags
//!
//! Schema-less records persisted by the versioned store. A bag carries its
//! identity (kind, instance id, last persisted version) separately from its
//! fields, so the identity never leaks into the serialized artifact.

pub mod handle;
pub mod stamp;
pub mod value;

pub use handle::{validate_kind, Handle, InstanceId};
pub use stamp::VersionStamp;
pub use value::Value;

use crate::types::{Fields, DELETED_FIELD};

/// A dynamically keyed record with a stable identity.
#[derive(Debug, Clone, PartialEq)]
pub struct AttributeBag {
    kind: String,
    instance: InstanceId,
    version: Option<VersionStamp>,
    fields: Fields,
}

impl AttributeBag {
    /// Create an empty, unsaved bag of the given kind with a fresh instance id
    pub fn new(kind: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            instance: InstanceId::mint(),
            version: None,
            fields: Fields::new(),
        }
    }

    /// Rebuild a bag from a handle and stored fields
    pub(crate) fn restore(handle: &Handle, fields: Fields) -> Self {
        Self {
            kind: handle.kind.clone(),
            instance: handle.instance.clone(),
            version: Some(handle.version),
            fields,
        }
    }

    pub fn kind(&self) -> &str {
        &self.kind
    }

    pub fn instance(&self) -> &InstanceId {
        &self.instance
    }

    /// Stamp of the last persisted version, if the bag was ever saved
    pub fn version(&self) -> Option<VersionStamp> {
        self.version
    }

    pub fn handle(&self) -> Option<Handle> {
        self.version
            .map(|v| Handle::new(self.kind.clone(), self.instance.clone(), v))
    }

    pub(crate) fn set_version(&mut self, version: VersionStamp) {
        self.version = Some(version);
    }

    /// Adopt another instance's identity (used when refreshing in place)
    pub(crate) fn adopt_identity(&mut self, other: &AttributeBag) {
        self.instance = other.instance.clone();
        self.version = other.version;
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.fields.get(key)
    }

    /// String field or `""` when missing or not a string
    pub fn text(&self, key: &str) -> &str {
        self.fields.get(key).and_then(Value::as_str).unwrap_or("")
    }

    pub fn set(&mut self, key: impl Into<String>, value: impl Into<Value>) -> Option<Value> {
        self.fields.insert(key.into(), value.into())
    }

    pub fn remove(&mut self, key: &str) -> Option<Value> {
        self.fields.remove(key)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.fields.contains_key(key)
    }

    pub fn fields(&self) -> &Fields {
        &self.fields
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.fields.keys().map(String::as_str)
    }

    /// Copy every field of `other` into this bag, overwriting on conflict
    pub fn update(&mut self, other: &AttributeBag) {
        self.extend(other.fields.clone());
    }

    pub fn extend(&mut self, fields: Fields) {
        self.fields.extend(fields);
    }

    /// Set fields from `key=value` pairs; entries without `=` are ignored.
    /// Returns the number of fields set.
    pub fn edit<'a>(&mut self, pairs: impl IntoIterator<Item = &'a str>) -> usize {
        let mut count = 0;
        for pair in pairs {
            if let Some((key, value)) = pair.split_once('=') {
                if key.is_empty() {
                    continue;
                }
                self.set(key, value);
                count += 1;
            }
        }
        count
    }

    pub fn is_deleted(&self) -> bool {
        self.fields
            .get(DELETED_FIELD)
            .and_then(Value::as_bool)
            .unwrap_or(false)
    }

    pub(crate) fn mark_deleted(&mut self) {
        self.set(DELETED_FIELD, true);
    }

    /// One-line `key=value` rendering of the public, non-empty fields.
    ///
    /// `keys` restricts and orders the output, `skip` drops names, and `plain`
    /// prints bare values.
    pub fn printable(&self, keys: Option<&[&str]>, skip: &[&str], plain: bool) -> String {
        let selected: Vec<&str> = match keys {
            Some(keys) if !keys.is_empty() => keys.to_vec(),
            _ => self.keys().collect(),
        };
        let mut parts = Vec::new();
        for key in selected {
            if key.starts_with('_') || skip.contains(&key) {
                continue;
            }
            let value = match self.get(key) {
                Some(v) if v.is_truthy() => v,
                _ => continue,
            };
            let part = if plain {
                value.to_string()
            } else {
                match value.as_str() {
                    Some(s) if s.split_whitespace().count() >= 2 => format!("{}=\"{}\"", key, s),
                    _ => format!("{}={}", key, value),
                }
            };
            parts.push(part);
        }
        parts.join(" ")
    }
}
