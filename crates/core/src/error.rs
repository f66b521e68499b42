//! Unified error types for the analytics engine.
//!
//! Error codes:
//! - VALID_001: malformed or missing query parameters
//! - UPSTREAM_001: event store unreachable
//! - UPSTREAM_002: event store query timed out
//! - CACHE_001: cache backend failure (absorbed, never surfaced to callers)
//! - INTERNAL_001: anything else

use thiserror::Error;

/// Result type alias using our Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Unified error type for the analytics engine.
#[derive(Debug, Error)]
pub enum Error {
    /// Missing or malformed request input.
    #[error("validation error: {0}")]
    Validation(String),

    /// Event store unreachable or returned a failure.
    #[error("event store error: {0}")]
    Upstream(String),

    /// Event store query exceeded the configured deadline.
    #[error("event store timeout: {0}")]
    Timeout(String),

    /// Cache backend failure. The cache layer absorbs these and degrades to
    /// a miss; this variant exists so backends can report what went wrong.
    #[error("cache error: {0}")]
    Cache(String),

    #[error("invalid event type: {0}")]
    InvalidEventType(String),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("internal error: {0}")]
    Internal(String),
}

impl Error {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn upstream(msg: impl Into<String>) -> Self {
        Self::Upstream(msg.into())
    }

    pub fn timeout(msg: impl Into<String>) -> Self {
        Self::Timeout(msg.into())
    }

    pub fn cache(msg: impl Into<String>) -> Self {
        Self::Cache(msg.into())
    }

    pub fn invalid_event_type(name: impl Into<String>) -> Self {
        Self::InvalidEventType(name.into())
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }

    /// Get the stable error code for this error.
    pub fn code(&self) -> &'static str {
        match self {
            Self::Validation(_) | Self::InvalidEventType(_) => "VALID_001",
            Self::Upstream(_) => "UPSTREAM_001",
            Self::Timeout(_) => "UPSTREAM_002",
            Self::Cache(_) => "CACHE_001",
            Self::Serialization(_) | Self::Internal(_) => "INTERNAL_001",
        }
    }

    /// Get the HTTP status code for this error.
    pub fn http_status(&self) -> u16 {
        match self {
            Self::Validation(_) | Self::InvalidEventType(_) => 400,
            Self::Upstream(_) => 502,
            Self::Timeout(_) => 504,
            // Cache errors are absorbed by the cache layer; if one ever
            // escapes it is a bug in the caller, not a client problem.
            Self::Cache(_) => 500,
            Self::Serialization(_) | Self::Internal(_) => 500,
        }
    }
}
