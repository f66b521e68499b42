//! ClickHouse client wrapper.

use crate::config::StoreConfig;
use clickhouse::Client;
use engine_core::Result;
use tracing::info;

/// ClickHouse client wrapper for the event log.
#[derive(Clone)]
pub struct StoreClient {
    inner: Client,
    config: StoreConfig,
}

impl StoreClient {
    /// Creates a new client from configuration.
    pub fn new(config: StoreConfig) -> Result<Self> {
        let mut client = Client::default()
            .with_url(&config.url)
            .with_database(&config.database);

        if let Some(ref user) = config.username {
            client = client.with_user(user);
        }

        if let Some(ref pass) = config.password {
            client = client.with_password(pass);
        }

        info!(
            url = %config.url,
            database = %config.database,
            table = %config.table,
            "Created event store client"
        );

        Ok(Self {
            inner: client,
            config,
        })
    }

    /// Returns the inner clickhouse client.
    pub fn inner(&self) -> &Client {
        &self.inner
    }

    /// Returns the configuration.
    pub fn config(&self) -> &StoreConfig {
        &self.config
    }
}
