//! SQLite-backed store.

use async_trait::async_trait;
use desk_core::error::StoreError;
use rusqlite::{params, Connection, ErrorCode, OptionalExtension};
use serde_json::Value;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use tracing::{debug, warn};

use crate::store::{Collection, PersistentStore, StoredRecord};

const IN_MEMORY: &str = ":memory:";

/// SQLite store with one table per collection.
///
/// The connection is opened lazily and dropped on connectivity-class
/// failures, so the next call re-establishes it. Statements run on tokio's
/// blocking pool; the async methods never block the executor.
#[derive(Clone)]
pub struct SqliteStore {
    inner: Arc<Handle>,
}

struct Handle {
    path: PathBuf,
    conn: Mutex<Option<Connection>>,
}

impl SqliteStore {
    /// Open or create the database at `path`.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let path = path.as_ref().to_path_buf();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|e| {
                StoreError::Unavailable(format!("cannot create {}: {e}", parent.display()))
            })?;
        }

        let handle = Handle {
            path,
            conn: Mutex::new(None),
        };
        handle.with_conn(|_| Ok(()))?;
        Ok(Self {
            inner: Arc::new(handle),
        })
    }

    /// Open a private in-memory database (for testing). Its contents do not
    /// survive a reconnect.
    pub fn open_in_memory() -> Result<Self, StoreError> {
        Self::open(IN_MEMORY)
    }

    /// Drop the cached connection. The next call reopens it.
    pub fn invalidate(&self) {
        *self.inner.lock() = None;
    }

    /// Whether a connection is currently held.
    pub fn is_connected(&self) -> bool {
        self.inner.lock().is_some()
    }

    /// Run `op` on the blocking pool.
    async fn run<T, F>(&self, op: F) -> Result<T, StoreError>
    where
        T: Send + 'static,
        F: FnOnce(&mut Connection) -> rusqlite::Result<T> + Send + 'static,
    {
        let handle = Arc::clone(&self.inner);
        tokio::task::spawn_blocking(move || handle.with_conn(op))
            .await
            .map_err(|e| StoreError::Unavailable(format!("store task failed: {e}")))?
    }
}

impl Handle {
    fn lock(&self) -> MutexGuard<'_, Option<Connection>> {
        self.conn.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn connect(path: &Path) -> rusqlite::Result<Connection> {
        let conn = Connection::open(path)?;
        conn.busy_timeout(Duration::from_secs(5))?;
        init_schema(&conn)?;
        debug!(path = %path.display(), "Opened store");
        Ok(conn)
    }

    /// Run `op` against the connection, opening it if needed.
    fn with_conn<T>(
        &self,
        op: impl FnOnce(&mut Connection) -> rusqlite::Result<T>,
    ) -> Result<T, StoreError> {
        let mut guard = self.lock();

        if guard.is_none() {
            let conn = Self::connect(&self.path).map_err(|e| {
                warn!(path = %self.path.display(), error = %e, "Store connection failed");
                StoreError::Unavailable(e.to_string())
            })?;
            *guard = Some(conn);
        }

        let Some(conn) = guard.as_mut() else {
            return Err(StoreError::Unavailable("connection not established".into()));
        };

        op(conn).map_err(|e| {
            if is_connectivity_error(&e) {
                warn!(error = %e, "Store connectivity failure, dropping connection");
                *guard = None;
            }
            StoreError::Unavailable(e.to_string())
        })
    }
}

impl std::fmt::Debug for SqliteStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SqliteStore")
            .field("path", &self.inner.path)
            .field("connected", &self.is_connected())
            .finish()
    }
}

#[async_trait]
impl PersistentStore for SqliteStore {
    async fn put(&self, collection: Collection, key: &str, item: Value) -> Result<(), StoreError> {
        let text = serde_json::to_string(&item)?;
        let key = key.to_string();
        let sql = format!(
            "INSERT INTO {} (key, value) VALUES (?1, ?2)
             ON CONFLICT(key) DO UPDATE SET value = excluded.value",
            collection.table()
        );
        self.run(move |conn| {
            let tx = conn.transaction()?;
            tx.execute(&sql, params![key, text])?;
            tx.commit()
        })
        .await
    }

    async fn get(&self, collection: Collection, key: &str) -> Result<Option<Value>, StoreError> {
        let key = key.to_string();
        let sql = format!("SELECT value FROM {} WHERE key = ?1", collection.table());
        let text: Option<String> = self
            .run(move |conn| {
                conn.query_row(&sql, params![key], |row| row.get(0))
                    .optional()
            })
            .await?;

        match text {
            Some(text) => Ok(Some(serde_json::from_str(&text)?)),
            None => Ok(None),
        }
    }

    async fn get_all(&self, collection: Collection) -> Result<Vec<StoredRecord>, StoreError> {
        let sql = format!("SELECT key, value FROM {} ORDER BY rowid", collection.table());
        let rows: Vec<(String, String)> = self
            .run(move |conn| {
                let mut stmt = conn.prepare(&sql)?;
                let rows = stmt.query_map([], |row| Ok((row.get(0)?, row.get(1)?)))?;
                rows.collect()
            })
            .await?;

        rows.into_iter()
            .map(|(key, text)| {
                Ok(StoredRecord {
                    key,
                    value: serde_json::from_str(&text)?,
                })
            })
            .collect()
    }

    async fn delete(&self, collection: Collection, key: &str) -> Result<(), StoreError> {
        let key = key.to_string();
        let sql = format!("DELETE FROM {} WHERE key = ?1", collection.table());
        self.run(move |conn| {
            let tx = conn.transaction()?;
            tx.execute(&sql, params![key])?;
            tx.commit()
        })
        .await
    }

    async fn clear(&self, collection: Collection) -> Result<(), StoreError> {
        let sql = format!("DELETE FROM {}", collection.table());
        self.run(move |conn| {
            let tx = conn.transaction()?;
            let removed = tx.execute(&sql, [])?;
            tx.commit()?;
            debug!(collection = %collection, removed, "Cleared collection");
            Ok(())
        })
        .await
    }
}

/// Create one table per collection.
fn init_schema(conn: &Connection) -> rusqlite::Result<()> {
    for collection in Collection::ALL {
        conn.execute(
            &format!(
                "CREATE TABLE IF NOT EXISTS {} (
                    key TEXT PRIMARY KEY NOT NULL,
                    value TEXT NOT NULL
                )",
                collection.table()
            ),
            [],
        )?;
    }
    Ok(())
}

/// Failures after which the handle cannot be trusted.
fn is_connectivity_error(e: &rusqlite::Error) -> bool {
    match e {
        rusqlite::Error::SqliteFailure(err, _) => matches!(
            err.code,
            ErrorCode::CannotOpen
                | ErrorCode::SystemIoFailure
                | ErrorCode::NotADatabase
                | ErrorCode::DatabaseCorrupt
                | ErrorCode::DatabaseBusy
                | ErrorCode::DatabaseLocked
                | ErrorCode::PermissionDenied
                | ErrorCode::DiskFull
                | ErrorCode::ReadOnly
        ),
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn temp_store() -> (tempfile::TempDir, SqliteStore) {
        let dir = tempfile::tempdir().unwrap();
        let store = SqliteStore::open(dir.path().join("desk.db")).unwrap();
        (dir, store)
    }

    #[tokio::test]
    async fn test_put_get_delete() {
        let (_dir, store) = temp_store();

        store
            .put(Collection::Trades, "t1", json!({"qty": "10"}))
            .await
            .unwrap();
        let item = store.get(Collection::Trades, "t1").await.unwrap();
        assert_eq!(item, Some(json!({"qty": "10"})));

        store.delete(Collection::Trades, "t1").await.unwrap();
        assert!(store.get(Collection::Trades, "t1").await.unwrap().is_none());

        // Deleting again is fine
        store.delete(Collection::Trades, "t1").await.unwrap();
    }

    #[tokio::test]
    async fn test_collections_are_isolated() {
        let (_dir, store) = temp_store();

        store.put(Collection::Watchlist, "AAPL", json!(1)).await.unwrap();
        assert!(store.get(Collection::Cache, "AAPL").await.unwrap().is_none());
        assert!(store.get_all(Collection::Trades).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_get_all_keeps_insertion_order_on_upsert() {
        let (_dir, store) = temp_store();

        for key in ["c", "a", "b"] {
            store.put(Collection::Trades, key, json!(key)).await.unwrap();
        }
        store.put(Collection::Trades, "c", json!("c2")).await.unwrap();

        let records = store.get_all(Collection::Trades).await.unwrap();
        let keys: Vec<&str> = records.iter().map(|r| r.key.as_str()).collect();
        assert_eq!(keys, vec!["c", "a", "b"]);
        assert_eq!(records[0].value, json!("c2"));
    }

    #[tokio::test]
    async fn test_clear_removes_everything() {
        let (_dir, store) = temp_store();

        store.put(Collection::Trades, "t1", json!(1)).await.unwrap();
        store.put(Collection::Trades, "t2", json!(2)).await.unwrap();
        store.put(Collection::Cache, "k", json!(3)).await.unwrap();

        store.clear(Collection::Trades).await.unwrap();
        assert!(store.get_all(Collection::Trades).await.unwrap().is_empty());
        assert_eq!(store.get_all(Collection::Cache).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_data_survives_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("desk.db");

        {
            let store = SqliteStore::open(&path).unwrap();
            store.put(Collection::Trades, "t1", json!({"id": "t1"})).await.unwrap();
        }

        let store = SqliteStore::open(&path).unwrap();
        assert_eq!(
            store.get(Collection::Trades, "t1").await.unwrap(),
            Some(json!({"id": "t1"}))
        );
    }

    #[tokio::test]
    async fn test_invalidated_handle_reconnects() {
        let (_dir, store) = temp_store();
        store.put(Collection::Cache, "k", json!("v")).await.unwrap();

        store.invalidate();
        assert!(!store.is_connected());

        assert_eq!(store.get(Collection::Cache, "k").await.unwrap(), Some(json!("v")));
        assert!(store.is_connected());
    }

    #[tokio::test]
    async fn test_corrupted_file_drops_handle_then_reconnects() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("desk.db");
        let store = SqliteStore::open(&path).unwrap();
        store.put(Collection::Cache, "k", json!("v")).await.unwrap();
        assert!(store.is_connected());

        // Overwrite the file in place so the open handle sees garbage.
        std::fs::write(&path, vec![0xAB_u8; 8192]).unwrap();

        let result = store.get(Collection::Cache, "k").await;
        assert!(matches!(result, Err(StoreError::Unavailable(_))));
        assert!(!store.is_connected());

        std::fs::remove_file(&path).unwrap();
        store.put(Collection::Cache, "k", json!("fresh")).await.unwrap();
        assert!(store.is_connected());
        assert_eq!(
            store.get(Collection::Cache, "k").await.unwrap(),
            Some(json!("fresh"))
        );
    }

    #[tokio::test]
    async fn test_calls_from_spawned_tasks() {
        let (_dir, store) = temp_store();
        let store = Arc::new(store);

        let writers: Vec<_> = (0..8)
            .map(|i| {
                let store = Arc::clone(&store);
                tokio::spawn(async move {
                    store
                        .put(Collection::Trades, &format!("t{i}"), json!(i))
                        .await
                })
            })
            .collect();
        for writer in writers {
            writer.await.unwrap().unwrap();
        }
        assert_eq!(store.get_all(Collection::Trades).await.unwrap().len(), 8);
    }

    #[test]
    fn test_open_failure_is_unavailable() {
        let dir = tempfile::tempdir().unwrap();
        // A directory cannot be opened as a database file.
        let result = SqliteStore::open(dir.path());
        assert!(matches!(result, Err(StoreError::Unavailable(_))));
    }

    #[test]
    fn test_connectivity_classification() {
        let cant_open = rusqlite::Error::SqliteFailure(
            rusqlite::ffi::Error::new(rusqlite::ffi::SQLITE_CANTOPEN),
            None,
        );
        assert!(is_connectivity_error(&cant_open));

        let constraint = rusqlite::Error::SqliteFailure(
            rusqlite::ffi::Error::new(rusqlite::ffi::SQLITE_CONSTRAINT),
            None,
        );
        assert!(!is_connectivity_error(&constraint));
        assert!(!is_connectivity_error(&rusqlite::Error::QueryReturnedNoRows));
    }

    #[tokio::test]
    async fn test_typed_helpers() {
        let (_dir, store) = temp_store();
        let store: &dyn PersistentStore = &store;

        store
            .put_item(Collection::Cache, "list", &vec!["AAPL", "MSFT"])
            .await
            .unwrap();
        let list: Option<Vec<String>> = store.get_item(Collection::Cache, "list").await.unwrap();
        assert_eq!(list, Some(vec!["AAPL".to_string(), "MSFT".to_string()]));

        let all: Vec<Vec<String>> = store.get_all_items(Collection::Cache).await.unwrap();
        assert_eq!(all.len(), 1);
    }
}
