//! Cache backend abstraction.
//!
//! The backend is an injected trait object so the service can run against
//! moka in production and tests can substitute fakes with controllable
//! failure behavior.

use async_trait::async_trait;
use chrono::Utc;
use moka::future::Cache;
use serde::{Deserialize, Serialize};

use engine_core::Result;

/// A cached payload with its expiry instant.
///
/// TTL is carried per entry because tiers assign different lifetimes within
/// one backing cache.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CachedValue {
    pub payload: serde_json::Value,
    /// Unix-second instant after which the entry no longer counts as a hit.
    pub expires_at: i64,
}

impl CachedValue {
    pub fn new(payload: serde_json::Value, ttl_secs: u64) -> Self {
        Self {
            payload,
            expires_at: Utc::now().timestamp() + ttl_secs as i64,
        }
    }

    pub fn is_expired(&self) -> bool {
        Utc::now().timestamp() >= self.expires_at
    }
}

/// Cache backend contract.
///
/// Implementations must be safe to call concurrently. Errors are reported,
/// not panicked; the tiered layer absorbs them.
#[async_trait]
pub trait CacheStore: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<CachedValue>>;
    async fn set(&self, key: &str, value: CachedValue) -> Result<()>;
}

/// Production backend over a capacity-bounded moka cache.
#[derive(Clone)]
pub struct MokaStore {
    inner: Cache<String, CachedValue>,
}

impl MokaStore {
    /// Creates a backend holding at most `max_capacity` entries. Entries are
    /// dropped on read once their own expiry passes; moka's TTL is an upper
    /// bound matching the longest tier.
    pub fn new(max_capacity: u64) -> Self {
        Self {
            inner: Cache::builder()
                .max_capacity(max_capacity)
                .time_to_live(std::time::Duration::from_secs(86_400))
                .build(),
        }
    }
}

#[async_trait]
impl CacheStore for MokaStore {
    async fn get(&self, key: &str) -> Result<Option<CachedValue>> {
        match self.inner.get(key).await {
            Some(value) if value.is_expired() => {
                self.inner.invalidate(key).await;
                Ok(None)
            }
            other => Ok(other),
        }
    }

    async fn set(&self, key: &str, value: CachedValue) -> Result<()> {
        self.inner.insert(key.to_string(), value).await;
        Ok(())
    }
}
