//! TTL cache on top of the `cache` collection.

use desk_core::error::StoreError;
use desk_core::traits::{Clock, SystemClock};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;
use tracing::{debug, warn};

use crate::store::{Collection, PersistentStore};

/// TTL for entries that should never expire in practice (~100 years).
pub const PERMANENT_TTL_MINUTES: i64 = 100 * 365 * 24 * 60;

/// A cached payload with its absolute expiry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CacheEntry {
    pub key: String,
    pub payload: Value,
    /// Expiry (Unix milliseconds)
    pub expiry: i64,
}

impl CacheEntry {
    /// An entry is live strictly before its expiry.
    pub fn is_expired(&self, now_ms: i64) -> bool {
        now_ms >= self.expiry
    }
}

/// Payload cache with per-entry expiry and lazy eviction.
///
/// There is no background sweep: an expired entry is deleted the next time
/// someone asks for it.
#[derive(Clone)]
pub struct TtlCache {
    store: Arc<dyn PersistentStore>,
    clock: Arc<dyn Clock>,
}

impl TtlCache {
    /// Create a cache using the wall clock.
    pub fn new(store: Arc<dyn PersistentStore>) -> Self {
        Self::with_clock(store, Arc::new(SystemClock))
    }

    /// Create a cache with an explicit time source.
    pub fn with_clock(store: Arc<dyn PersistentStore>, clock: Arc<dyn Clock>) -> Self {
        Self { store, clock }
    }

    /// The underlying store.
    pub fn store(&self) -> &Arc<dyn PersistentStore> {
        &self.store
    }

    /// Store `payload` under `key` for `ttl_minutes`.
    pub async fn set_cache<T>(&self, key: &str, payload: &T, ttl_minutes: i64) -> Result<(), StoreError>
    where
        T: Serialize + Sync + ?Sized,
    {
        let expiry = self
            .clock
            .now_ms()
            .saturating_add(ttl_minutes.saturating_mul(60_000));
        let entry = CacheEntry {
            key: key.to_string(),
            payload: serde_json::to_value(payload)?,
            expiry,
        };
        self.store.put_item(Collection::Cache, key, &entry).await
    }

    /// Read the payload under `key`.
    ///
    /// Returns `None` for a missing, expired or malformed entry; the latter
    /// two are deleted on the way out. A live entry whose payload does not
    /// decode as `T` is a miss but stays in place.
    pub async fn get_cache<T>(&self, key: &str) -> Result<Option<T>, StoreError>
    where
        T: DeserializeOwned,
    {
        let Some(raw) = self.store.get(Collection::Cache, key).await? else {
            return Ok(None);
        };

        let entry: CacheEntry = match serde_json::from_value(raw) {
            Ok(entry) => entry,
            Err(e) => {
                warn!(key, error = %e, "Dropping malformed cache entry");
                self.store.delete(Collection::Cache, key).await?;
                return Ok(None);
            }
        };

        if entry.is_expired(self.clock.now_ms()) {
            debug!(key, "Cache entry expired");
            self.store.delete(Collection::Cache, key).await?;
            return Ok(None);
        }

        match serde_json::from_value(entry.payload) {
            Ok(payload) => Ok(Some(payload)),
            Err(e) => {
                debug!(key, error = %e, "Cached payload has a different shape");
                Ok(None)
            }
        }
    }

}
