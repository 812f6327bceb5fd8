//! Concurrent write safety for stored instances
//!
//! Provides per-instance locking so that saves of the same instance from
//! concurrent handlers inside one process are serialized. Reads take no lock:
//! every version on disk is immutable once it becomes visible.

use crate::bag::InstanceId;
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::Arc;

type InstanceKey = (String, InstanceId);

/// Per-instance lock manager
///
/// Locks are keyed by `(kind, instance)`, so writers of different instances
/// never block each other. Entries are created on first use and dropped by
/// [`release`](Self::release) once no other writer holds them.
pub struct InstanceLockManager {
    locks: Arc<RwLock<HashMap<InstanceKey, Arc<RwLock<()>>>>>,
}

impl InstanceLockManager {
    pub fn new() -> Self {
        Self {
            locks: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// Get or create the lock for one instance
    pub fn get_lock(&self, kind: &str, instance: &InstanceId) -> Arc<RwLock<()>> {
        let key = (kind.to_string(), instance.clone());
        {
            let map = self.locks.read();
            if let Some(lock) = map.get(&key) {
                return lock.clone();
            }
        }

        let mut map = self.locks.write();
        // another thread may have inserted it between the two guards
        map.entry(key)
            .or_insert_with(|| Arc::new(RwLock::new(())))
            .clone()
    }

    /// Return a lock obtained from [`get_lock`](Self::get_lock), removing the
    /// entry when nobody else holds a clone of it
    pub fn release(&self, kind: &str, instance: &InstanceId, lock: Arc<RwLock<()>>) {
        let mut map = self.locks.write();
        let key = (kind.to_string(), instance.clone());
        let idle = match map.get(&key) {
            // the map's copy plus ours
            Some(entry) => Arc::ptr_eq(entry, &lock) && Arc::strong_count(&lock) == 2,
            None => false,
        };
        if idle {
            map.remove(&key);
        }
    }

    /// Number of instances that have a lock entry
    pub fn len(&self) -> usize {
        self.locks.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.locks.read().is_empty()
    }
}

impl Default for InstanceLockManager {
    fn default() -> Self {
        Self::new()
    }
}
