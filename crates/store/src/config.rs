//! Event store configuration.

use serde::{Deserialize, Serialize};

/// ClickHouse event store configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreConfig {
    /// ClickHouse HTTP URL
    pub url: String,
    /// Database name
    #[serde(default = "default_database")]
    pub database: String,
    /// Events table name
    #[serde(default = "default_table")]
    pub table: String,
    /// Username (optional)
    pub username: Option<String>,
    /// Password (optional)
    pub password: Option<String>,
    /// Per-query timeout in seconds
    #[serde(default = "default_query_timeout_secs")]
    pub query_timeout_secs: u64,
}

fn default_database() -> String {
    "analytics".to_string()
}

fn default_table() -> String {
    "events".to_string()
}

fn default_query_timeout_secs() -> u64 {
    10
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            url: "http://localhost:8123".to_string(),
            database: default_database(),
            table: default_table(),
            username: None,
            password: None,
            query_timeout_secs: default_query_timeout_secs(),
        }
    }
}
