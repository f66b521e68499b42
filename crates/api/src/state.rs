//! Application state shared across handlers.

use std::sync::Arc;

use analytics::AnalyticsService;
use event_store::EventStore;
use metrics_cache::{CacheStore, MokaStore, TieredCache};

/// Default bound on cached query results.
const CACHE_MAX_CAPACITY: u64 = 10_000;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    /// Query façade over the event store and result cache
    pub service: Arc<AnalyticsService>,
    /// Event store handle, kept for health reporting
    pub store: Arc<dyn EventStore>,
}

impl AppState {
    /// Builds state over the given store with the default moka cache backend.
    pub fn new(store: Arc<dyn EventStore>) -> Self {
        Self::with_cache_store(store, Arc::new(MokaStore::new(CACHE_MAX_CAPACITY)))
    }

    /// Builds state with an explicit cache backend (tests inject fakes here).
    pub fn with_cache_store(store: Arc<dyn EventStore>, cache_store: Arc<dyn CacheStore>) -> Self {
        let cache = Arc::new(TieredCache::new(cache_store));
        Self {
            service: Arc::new(AnalyticsService::new(store.clone(), cache)),
            store,
        }
    }
}
