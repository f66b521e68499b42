//! Cache warmup worker.
//!
//! Pre-computes the standard dashboard windows through the same service path
//! interactive queries use, so their cache entries are warm. Purely an
//! optimization: failures are logged and the next tick retries.

use std::sync::Arc;

use chrono::{Duration, Utc};
use tracing::{debug, warn};

use analytics::{AnalyticsService, MetricsRequest};
use engine_core::DateRange;

/// Standard dashboard windows, as trailing day counts ending today.
const WARMUP_WINDOWS_DAYS: [i64; 3] = [1, 7, 30];

pub struct WarmupWorker {
    service: Arc<AnalyticsService>,
}

impl WarmupWorker {
    pub fn new(service: Arc<AnalyticsService>) -> Self {
        Self { service }
    }

    /// Computes each standard window once, populating its cache entry.
    pub async fn run(&self) {
        let today = Utc::now().date_naive();

        for days in WARMUP_WINDOWS_DAYS {
            let range = DateRange {
                start: today - Duration::days(days - 1),
                end: today,
            };

            match self
                .service
                .metrics(MetricsRequest {
                    range,
                    user_id: None,
                    advanced: false,
                    compare: false,
                })
                .await
            {
                Ok(outcome) => {
                    debug!(days, tier = %outcome.tier, cached = outcome.cached, "warmed window");
                }
                Err(e) => {
                    warn!(days, error = %e, "cache warmup window failed");
                }
            }
        }
    }
}
