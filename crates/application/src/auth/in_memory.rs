//! In-memory token storage with expiry tracking.
//!
//! This module provides a thread-safe store for cached tokens. Entries carry
//! their own deadline and read as absent once it has passed.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use ringcentral_domain::expires_after;
use tokio::sync::RwLock;

use crate::ports::{Clock, StoreError, TokenStore};

#[derive(Debug, Clone)]
struct Entry {
    value: String,
    expires_at: DateTime<Utc>,
}

/// Thread-safe in-memory token store.
///
/// Clones share the same underlying map, so one store can back several
/// dispatchers in the same process.
#[derive(Clone, Default)]
pub struct InMemoryTokenStore {
    entries: Arc<RwLock<HashMap<String, Entry>>>,
    clock: Option<Arc<dyn Clock>>,
}

impl InMemoryTokenStore {
    /// Create a new store using the system time.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store that reads time from `clock`.
    #[must_use]
    pub fn with_clock(clock: Arc<dyn Clock>) -> Self {
        Self {
            entries: Arc::new(RwLock::new(HashMap::new())),
            clock: Some(clock),
        }
    }

    fn now(&self) -> DateTime<Utc> {
        self.clock.as_ref().map_or_else(Utc::now, |c| c.now())
    }

    /// Number of live entries.
    pub async fn len(&self) -> usize {
        let now = self.now();
        let entries = self.entries.read().await;
        entries.values().filter(|e| e.expires_at > now).count()
    }

    /// Returns true if no live entry exists.
    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

impl std::fmt::Debug for InMemoryTokenStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InMemoryTokenStore").finish_non_exhaustive()
    }
}

#[async_trait]
impl TokenStore for InMemoryTokenStore {
    async fn has(&self, key: &str) -> Result<bool, StoreError> {
        Ok(self.get(key).await?.is_some())
    }

    async fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        let now = self.now();
        let entries = self.entries.read().await;
        Ok(entries
            .get(key)
            .filter(|e| e.expires_at > now)
            .map(|e| e.value.clone()))
    }

    async fn put(&self, key: &str, value: &str, ttl_seconds: u64) -> Result<(), StoreError> {
        let expires_at = expires_after(self.now(), ttl_seconds);

        let mut entries = self.entries.write().await;
        entries.insert(
            key.to_string(),
            Entry {
                value: value.to_string(),
                expires_at,
            },
        );
        Ok(())
    }
}
