//! Keyed single-flight coordination for cache-miss computations.
//!
//! Concurrent misses on one key serialize behind one async mutex: the leader
//! computes and populates the cache, followers wake up, re-check the cache,
//! and hit. The key map lock is only held to clone or drop the per-key mutex,
//! never across an await point.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::Mutex;

/// Per-key in-flight computation guard map.
#[derive(Default)]
pub struct SingleFlight {
    locks: Mutex<HashMap<String, Arc<tokio::sync::Mutex<()>>>>,
}

impl SingleFlight {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the in-flight lock for `key`, creating it on first use.
    pub fn lock_for(&self, key: &str) -> Arc<tokio::sync::Mutex<()>> {
        let mut locks = self.locks.lock();
        locks
            .entry(key.to_string())
            .or_insert_with(|| Arc::new(tokio::sync::Mutex::new(())))
            .clone()
    }

    /// Drops the map entry for `key` once its computation settled. Waiters
    /// already holding a clone of the lock proceed unaffected.
    pub fn release(&self, key: &str) {
        self.locks.lock().remove(key);
    }

    #[cfg(test)]
    pub fn in_flight(&self) -> usize {
        self.locks.lock().len()
    }
}
