//! Worker scheduler for background tasks.

use std::sync::Arc;
use std::time::Duration;
use tokio::time::interval;
use tracing::info;

use analytics::AnalyticsService;
use telemetry::metrics;

use crate::warmup::WarmupWorker;

/// Worker scheduler configuration.
#[derive(Debug, Clone)]
pub struct WorkerConfig {
    /// Cache warmup interval
    pub warmup_interval: Duration,
    /// Metrics snapshot log interval
    pub metrics_log_interval: Duration,
    /// Whether the warmup worker runs at all
    pub warmup_enabled: bool,
}

impl Default for WorkerConfig {
    fn default() -> Self {
        Self {
            warmup_interval: Duration::from_secs(240),
            metrics_log_interval: Duration::from_secs(60),
            warmup_enabled: true,
        }
    }
}

/// Background worker scheduler.
pub struct WorkerScheduler {
    config: WorkerConfig,
    service: Arc<AnalyticsService>,
}

impl WorkerScheduler {
    pub fn new(config: WorkerConfig, service: Arc<AnalyticsService>) -> Self {
        Self { config, service }
    }

    /// Starts all background workers.
    pub fn start(self: Arc<Self>) -> Vec<tokio::task::JoinHandle<()>> {
        let mut handles = Vec::new();

        if self.config.warmup_enabled {
            let scheduler = self.clone();
            handles.push(tokio::spawn(async move {
                scheduler.run_warmup_worker().await;
            }));
            info!("Cache warmup worker started");
        }

        let scheduler = self.clone();
        handles.push(tokio::spawn(async move {
            scheduler.run_metrics_log().await;
        }));

        info!("Background workers started");
        handles
    }

    async fn run_warmup_worker(&self) {
        let worker = WarmupWorker::new(self.service.clone());
        let mut ticker = interval(self.config.warmup_interval);

        loop {
            ticker.tick().await;
            worker.run().await;
        }
    }

    async fn run_metrics_log(&self) {
        let mut ticker = interval(self.config.metrics_log_interval);

        loop {
            ticker.tick().await;

            let snapshot = metrics().snapshot();
            info!(
                queries = snapshot.queries_received,
                failed = snapshot.queries_failed,
                cache_hits = snapshot.cache_hits,
                cache_misses = snapshot.cache_misses,
                store_queries = snapshot.store_queries,
                store_timeouts = snapshot.store_timeouts,
                query_latency_mean_ms = snapshot.query_latency_mean_ms,
                "metrics snapshot"
            );
        }
    }
}
