//! Test environment setup.

use std::sync::Arc;

use api::{router, AppState};
use axum::Router;
use engine_core::Event;
use metrics_cache::CacheStore;

use crate::mocks::MockEventStore;

/// Router plus handles into the mock collaborators behind it.
pub struct TestContext {
    pub router: Router,
    pub store: Arc<MockEventStore>,
}

impl TestContext {
    /// Builds the full production router over a mock event store and the
    /// default moka cache backend.
    pub fn new() -> Self {
        let store = Arc::new(MockEventStore::new());
        let state = AppState::new(store.clone());
        Self {
            router: router(state),
            store,
        }
    }

    /// Same, but with an injected cache backend.
    pub fn with_cache_store(cache_store: Arc<dyn CacheStore>) -> Self {
        let store = Arc::new(MockEventStore::new());
        let state = AppState::with_cache_store(store.clone(), cache_store);
        Self {
            router: router(state),
            store,
        }
    }

    pub fn seed(&self, events: Vec<Event>) {
        self.store.seed(events);
    }
}

impl Default for TestContext {
    fn default() -> Self {
        Self::new()
    }
}
