//! Durable keyed storage for paperdesk.
//!
//! Named collections live behind the [`PersistentStore`] trait; the
//! [`TtlCache`] layer stores payloads with an absolute expiry on top of the
//! `cache` collection and evicts them lazily on read.

mod sqlite;
mod store;
mod ttl_cache;

pub use sqlite::SqliteStore;
pub use store::{Collection, PersistentStore, StoredRecord};
pub use ttl_cache::{CacheEntry, TtlCache, PERMANENT_TTL_MINUTES};
