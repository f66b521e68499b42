//! Analytics Aggregation & Funnel Engine
//!
//! Query service turning an append-only stream of storefront interaction
//! events into:
//! - time-bucketed e-commerce and engagement metrics with tiered caching
//! - multi-step conversion-funnel analysis with drop-off attribution
//! - per-visitor journey reconstruction with abandonment detection

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::{Context, Result};
use tokio::signal;
use tracing::{error, info};

use api::{router, AppState};
use event_store::{ClickHouseStore, EventStore, StoreConfig};
use telemetry::{health, init_tracing_from_env};
use worker::{WorkerConfig, WorkerScheduler};

/// Application configuration.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
struct Config {
    #[serde(default = "default_host")]
    host: String,
    #[serde(default = "default_port")]
    port: u16,

    /// Whether the cache warmup worker runs
    #[serde(default = "default_warmup_enabled")]
    warmup_enabled: bool,

    #[serde(default)]
    store: StoreConfig,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

fn default_warmup_enabled() -> bool {
    true
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            warmup_enabled: default_warmup_enabled(),
            store: StoreConfig::default(),
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present
    dotenvy::dotenv().ok();

    // Initialize tracing
    init_tracing_from_env();

    info!(
        "Starting Analytics Engine v{}",
        env!("CARGO_PKG_VERSION")
    );

    // Load configuration
    let config = load_config()?;

    info!(
        store_url = %config.store.url,
        database = %config.store.database,
        "Loaded event store config"
    );

    // Initialize the event store client
    let store = Arc::new(
        ClickHouseStore::new(config.store.clone()).context("Failed to create event store client")?,
    );

    // Check health and update status
    check_health(&store).await;

    let store: Arc<dyn EventStore> = store;

    // Create application state (service + tiered cache)
    let state = AppState::new(store);
    health().cache.set_healthy();

    // Start background workers
    let worker_scheduler = Arc::new(WorkerScheduler::new(
        WorkerConfig {
            warmup_enabled: config.warmup_enabled,
            ..WorkerConfig::default()
        },
        state.service.clone(),
    ));
    let _worker_handles = worker_scheduler.start();

    // Create router
    let app = router(state);

    // Start HTTP server
    let addr: SocketAddr = format!("{}:{}", config.host, config.port)
        .parse()
        .context("Invalid server address")?;

    info!("Listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .context("Failed to bind to address")?;

    // Run server with graceful shutdown
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("Shutdown complete");
    Ok(())
}

/// Load configuration from files and environment.
fn load_config() -> Result<Config> {
    let config = config::Config::builder()
        // Start with defaults
        .add_source(config::Config::try_from(&Config::default())?)
        // Load from config file if exists
        .add_source(
            config::File::with_name("config/default")
                .required(false)
                .format(config::FileFormat::Toml),
        )
        // Override with environment variables
        .add_source(
            config::Environment::default()
                .separator("__")
                .prefix("ANALYTICS")
                .try_parsing(true),
        )
        .build()
        .context("Failed to build configuration")?;

    let mut config: Config = config
        .try_deserialize()
        .context("Failed to deserialize configuration")?;

    // Manual overrides for nested store config from environment
    // The config crate's nested parsing doesn't work reliably with underscored field names
    if let Ok(url) = std::env::var("ANALYTICS_STORE_URL") {
        config.store.url = url;
    }
    if let Ok(database) = std::env::var("ANALYTICS_STORE_DATABASE") {
        config.store.database = database;
    }
    if let Ok(table) = std::env::var("ANALYTICS_STORE_TABLE") {
        config.store.table = table;
    }
    if let Ok(username) = std::env::var("ANALYTICS_STORE_USERNAME") {
        config.store.username = Some(username);
    }
    if let Ok(password) = std::env::var("ANALYTICS_STORE_PASSWORD") {
        config.store.password = Some(password);
    }
    if let Ok(timeout) = std::env::var("ANALYTICS_STORE_QUERY_TIMEOUT_SECS") {
        if let Ok(secs) = timeout.parse() {
            config.store.query_timeout_secs = secs;
        }
    }

    Ok(config)
}

/// Check event store health on startup.
async fn check_health(store: &ClickHouseStore) {
    let connected = event_store::health::check_connection(store.client()).await;

    if connected {
        health().event_store.set_healthy();
        info!("Event store connection: healthy");
    } else {
        health().event_store.set_unhealthy("Connection failed");
        error!("Event store connection: unhealthy");
    }
}

/// Graceful shutdown signal handler.
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("Failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C signal");
        }
        _ = terminate => {
            info!("Received terminate signal");
        }
    }
}
