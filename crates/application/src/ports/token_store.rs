//! Token store port
//!
//! A keyed string store with per-entry time-to-live. Expiry is the store's
//! job: an expired entry must read as absent.

use async_trait::async_trait;

/// Errors that can occur while reading or writing the token store.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization error.
    #[error("Serialization error: {0}")]
    Serialization(String),
}

/// Shared token cache.
///
/// Several dispatchers, possibly in different processes, may share one
/// store; it is the single source of truth for cached tokens.
#[async_trait]
pub trait TokenStore: Send + Sync {
    /// Returns true if a non-expired value exists under `key`.
    async fn has(&self, key: &str) -> Result<bool, StoreError>;

    /// Returns the value under `key`, or `None` if absent or expired.
    async fn get(&self, key: &str) -> Result<Option<String>, StoreError>;

    /// Stores `value` under `key` for `ttl_seconds`, replacing any prior value.
    async fn put(&self, key: &str, value: &str, ttl_seconds: u64) -> Result<(), StoreError>;
}
