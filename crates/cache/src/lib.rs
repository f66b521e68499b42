//! Tiered read-through cache for analytics query results.
//!
//! Entries are pure functions of an immutable event range, so there is no
//! invalidation path; expiry is the only lifecycle. Backend failures never
//! fail a request: reads degrade to misses and writes are best-effort.

pub mod key;
pub mod single_flight;
pub mod store;
pub mod tier;

pub use key::{generate_key, QueryKind};
pub use single_flight::SingleFlight;
pub use store::{CacheStore, CachedValue, MokaStore};
pub use tier::Tier;

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use serde::de::DeserializeOwned;
use serde::Serialize;
use telemetry::metrics;
use tracing::{debug, warn};

use engine_core::Result;

/// Read-through cache with keyed single-flight stampede protection.
pub struct TieredCache {
    store: Arc<dyn CacheStore>,
    flights: SingleFlight,
}

impl TieredCache {
    pub fn new(store: Arc<dyn CacheStore>) -> Self {
        Self {
            store,
            flights: SingleFlight::new(),
        }
    }

    /// Returns the cached value for `key`, or computes, stores, and returns
    /// it. The boolean is true when the value came from the cache.
    ///
    /// Concurrent misses on one key serialize behind a single in-flight
    /// computation; followers re-check the cache once the leader finishes.
    /// A failed computation is propagated and never written.
    pub async fn read_through<T, F, Fut>(
        &self,
        key: &str,
        ttl: Duration,
        compute: F,
    ) -> Result<(T, bool)>
    where
        T: Serialize + DeserializeOwned,
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        if let Some(hit) = self.lookup(key).await {
            return Ok((hit, true));
        }

        let flight = self.flights.lock_for(key);
        let _guard = flight.lock().await;

        // A leader may have populated the entry while we waited.
        if let Some(hit) = self.lookup(key).await {
            self.flights.release(key);
            return Ok((hit, true));
        }

        let value = match compute().await {
            Ok(value) => value,
            Err(e) => {
                self.flights.release(key);
                return Err(e);
            }
        };

        self.write(key, &value, ttl).await;
        self.flights.release(key);
        Ok((value, false))
    }

    /// Cache read that absorbs backend errors as misses.
    async fn lookup<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        match self.store.get(key).await {
            Ok(Some(entry)) if !entry.is_expired() => {
                match serde_json::from_value(entry.payload) {
                    Ok(value) => {
                        metrics().cache_hits.inc();
                        debug!(key, "cache hit");
                        Some(value)
                    }
                    Err(e) => {
                        warn!(key, error = %e, "cached payload failed to decode, recomputing");
                        None
                    }
                }
            }
            Ok(_) => {
                metrics().cache_misses.inc();
                None
            }
            Err(e) => {
                metrics().cache_read_errors.inc();
                warn!(key, error = %e, "cache read failed, degrading to miss");
                None
            }
        }
    }

    /// Best-effort cache write; failures are logged, not surfaced.
    async fn write<T: Serialize>(&self, key: &str, value: &T, ttl: Duration) {
        let payload = match serde_json::to_value(value) {
            Ok(payload) => payload,
            Err(e) => {
                warn!(key, error = %e, "result not cacheable");
                return;
            }
        };

        if let Err(e) = self
            .store
            .set(key, CachedValue::new(payload, ttl.as_secs()))
            .await
        {
            metrics().cache_write_errors.inc();
            warn!(key, error = %e, "cache write failed");
        }
    }
}
