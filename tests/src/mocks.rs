//! Mock implementations for testing.

use async_trait::async_trait;
use engine_core::{Error, Event, EventFilter, Result};
use event_store::EventStore;
use parking_lot::Mutex;
use std::sync::Arc;

/// Failure behavior injected into the mock store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FailureMode {
    #[default]
    None,
    /// Fail as if the store were unreachable.
    Upstream,
    /// Fail as if the query deadline expired.
    Timeout,
}

/// Mock event store backed by an in-memory event list.
///
/// Implements the same `EventStore` trait as the ClickHouse client, applying
/// the filter in-memory and returning events ordered by timestamp ascending,
/// so tests exercise every production code path except the wire transport.
#[derive(Clone, Default)]
pub struct MockEventStore {
    events: Arc<Mutex<Vec<Event>>>,
    failure: Arc<Mutex<FailureMode>>,
    query_count: Arc<Mutex<u64>>,
}

impl MockEventStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the stored event list.
    pub fn seed(&self, events: Vec<Event>) {
        *self.events.lock() = events;
    }

    pub fn push(&self, event: Event) {
        self.events.lock().push(event);
    }

    pub fn clear(&self) {
        self.events.lock().clear();
    }

    pub fn set_failure(&self, mode: FailureMode) {
        *self.failure.lock() = mode;
    }

    /// Number of queries served (cache hits never reach the store).
    pub fn query_count(&self) -> u64 {
        *self.query_count.lock()
    }

    fn matches(filter: &EventFilter, event: &Event) -> bool {
        if event.timestamp < filter.start || event.timestamp > filter.end {
            return false;
        }
        if let Some(session_hash) = filter.session_hash {
            if event.session_hash != session_hash {
                return false;
            }
        }
        if let Some(ref visitor_hash) = filter.visitor_hash {
            if &event.visitor_hash != visitor_hash {
                return false;
            }
        }
        if let Some(ref user_id) = filter.user_id {
            if event.user_id.as_deref() != Some(user_id.as_str()) {
                return false;
            }
        }
        if let Some(event_type) = filter.event_type {
            if event.event_type != event_type {
                return false;
            }
        }
        if let Some(ref page) = filter.page {
            if &event.page != page {
                return false;
            }
        }
        true
    }
}

#[async_trait]
impl EventStore for MockEventStore {
    async fn fetch_events(&self, filter: &EventFilter) -> Result<Vec<Event>> {
        match *self.failure.lock() {
            FailureMode::Upstream => return Err(Error::upstream("mock store unreachable")),
            FailureMode::Timeout => return Err(Error::timeout("mock query deadline expired")),
            FailureMode::None => {}
        }

        *self.query_count.lock() += 1;

        let mut events: Vec<Event> = self
            .events
            .lock()
            .iter()
            .filter(|e| Self::matches(filter, e))
            .cloned()
            .collect();
        // Stable sort keeps insertion order for timestamp ties, matching the
        // store contract.
        events.sort_by_key(|e| e.timestamp);
        Ok(events)
    }

    fn is_healthy(&self) -> bool {
        *self.failure.lock() == FailureMode::None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures;
    use engine_core::EventType;

    #[tokio::test]
    async fn filters_by_range_and_identity() {
        let store = MockEventStore::new();
        store.seed(vec![
            fixtures::event(EventType::PageView, 1, fixtures::ts(0, 100)),
            fixtures::event(EventType::PageView, 2, fixtures::ts(0, 200)),
            fixtures::event(EventType::PageView, 1, fixtures::ts(40, 0)),
        ]);

        let mut filter = EventFilter {
            start: fixtures::ts(0, 0),
            end: fixtures::ts(1, 0),
            ..EventFilter::default()
        };
        filter.session_hash = Some(1);

        let events = store.fetch_events(&filter).await.unwrap();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].session_hash, 1);
    }

    #[tokio::test]
    async fn failure_modes_map_to_the_error_taxonomy() {
        let store = MockEventStore::new();
        store.set_failure(FailureMode::Timeout);

        let err = store
            .fetch_events(&EventFilter::default())
            .await
            .unwrap_err();
        assert_eq!(err.code(), "UPSTREAM_002");
        assert!(!store.is_healthy());
    }
}
