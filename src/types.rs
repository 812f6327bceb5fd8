//! Core types shared across the store and dispatch layers.

use crate::bag::Value;
use std::collections::BTreeMap;

/// Field map of a bag: field name to value, kept in sorted key order
pub type Fields = BTreeMap<String, Value>;

/// Selector input: field name to expected substring
pub type SelectorMap = BTreeMap<String, String>;

/// Reserved field carrying the soft-delete flag
pub const DELETED_FIELD: &str = "__deleted__";
