//! Event store client for the analytics engine.
//!
//! The store is an external collaborator: an append-only event log queried by
//! range filters. The `EventStore` trait is the seam the rest of the engine
//! depends on; production uses the ClickHouse-backed implementation, tests
//! substitute an in-memory double.

pub mod client;
pub mod config;
pub mod health;
pub mod query;

pub use client::StoreClient;
pub use config::StoreConfig;
pub use query::{fetch_events, EventRow};

use std::time::Duration;

use async_trait::async_trait;
use telemetry::metrics;

use engine_core::{Error, Event, EventFilter, Result};

/// Range-filtered access to the append-only event log.
#[async_trait]
pub trait EventStore: Send + Sync {
    /// Fetches events matching the filter, ordered by timestamp ascending.
    ///
    /// Implementations must bound the query by their configured timeout and
    /// surface expiry as `Error::Timeout`.
    async fn fetch_events(&self, filter: &EventFilter) -> Result<Vec<Event>>;

    /// Whether the store is currently reachable.
    fn is_healthy(&self) -> bool {
        true
    }
}

/// ClickHouse-backed event store.
pub struct ClickHouseStore {
    client: StoreClient,
    query_timeout: Duration,
}

impl ClickHouseStore {
    pub fn new(config: StoreConfig) -> Result<Self> {
        let query_timeout = Duration::from_secs(config.query_timeout_secs);
        Ok(Self {
            client: StoreClient::new(config)?,
            query_timeout,
        })
    }

    pub fn client(&self) -> &StoreClient {
        &self.client
    }
}

#[async_trait]
impl EventStore for ClickHouseStore {
    async fn fetch_events(&self, filter: &EventFilter) -> Result<Vec<Event>> {
        metrics().store_queries.inc();
        let started = std::time::Instant::now();

        let events = match tokio::time::timeout(
            self.query_timeout,
            query::fetch_events(&self.client, filter),
        )
        .await
        {
            Ok(Ok(events)) => events,
            Ok(Err(e)) => {
                metrics().store_errors.inc();
                return Err(e);
            }
            Err(_) => {
                metrics().store_timeouts.inc();
                return Err(Error::timeout(format!(
                    "event query exceeded {}s",
                    self.query_timeout.as_secs()
                )));
            }
        };

        metrics()
            .store_latency_ms
            .observe(started.elapsed().as_millis() as u64);
        metrics().events_scanned.inc_by(events.len() as u64);
        Ok(events)
    }
}
