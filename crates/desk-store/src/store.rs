//! Store trait and collection definitions.

use async_trait::async_trait;
use desk_core::error::StoreError;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;

/// The fixed set of durable collections.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Collection {
    /// Last known quote per watched symbol, keyed by symbol
    Watchlist,
    /// Trade log, keyed by trade id
    Trades,
    /// TTL cache entries, keyed by cache key
    Cache,
}

impl Collection {
    pub const ALL: [Collection; 3] = [Collection::Watchlist, Collection::Trades, Collection::Cache];

    /// Table backing this collection.
    pub fn table(&self) -> &'static str {
        match self {
            Collection::Watchlist => "watchlist",
            Collection::Trades => "trades",
            Collection::Cache => "cache",
        }
    }
}

impl std::fmt::Display for Collection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.table())
    }
}

/// One item read back from a collection.
#[derive(Debug, Clone, PartialEq)]
pub struct StoredRecord {
    pub key: String,
    pub value: Value,
}

/// Durable keyed storage.
///
/// Each call is its own transaction; there is no locking across calls.
/// Failures are possibly transient and callers may retry.
#[async_trait]
pub trait PersistentStore: Send + Sync {
    /// Insert or replace `item` under `key`.
    async fn put(&self, collection: Collection, key: &str, item: Value) -> Result<(), StoreError>;

    /// Read the item under `key`.
    async fn get(&self, collection: Collection, key: &str) -> Result<Option<Value>, StoreError>;

    /// Read every item, in insertion order. Replacing an existing key keeps
    /// its original position.
    async fn get_all(&self, collection: Collection) -> Result<Vec<StoredRecord>, StoreError>;

    /// Delete the item under `key`. Deleting a missing key is not an error.
    async fn delete(&self, collection: Collection, key: &str) -> Result<(), StoreError>;

    /// Delete every item in the collection.
    async fn clear(&self, collection: Collection) -> Result<(), StoreError>;
}

impl dyn PersistentStore {
    /// Serialize and store a typed item.
    pub async fn put_item<T>(&self, collection: Collection, key: &str, item: &T) -> Result<(), StoreError>
    where
        T: Serialize + Sync + ?Sized,
    {
        let value = serde_json::to_value(item)?;
        self.put(collection, key, value).await
    }

    /// Read and deserialize a typed item.
    pub async fn get_item<T>(&self, collection: Collection, key: &str) -> Result<Option<T>, StoreError>
    where
        T: DeserializeOwned,
    {
        match self.get(collection, key).await? {
            Some(value) => Ok(Some(serde_json::from_value(value)?)),
            None => Ok(None),
        }
    }

    /// Read and deserialize every item, in insertion order.
    pub async fn get_all_items<T>(&self, collection: Collection) -> Result<Vec<T>, StoreError>
    where
        T: DeserializeOwned,
    {
        self.get_all(collection)
            .await?
            .into_iter()
            .map(|record| serde_json::from_value(record.value).map_err(StoreError::from))
            .collect()
    }
}
