//! User-curated watchlist.
//!
//! The registry holds the set of symbols that drive periodic quote refresh.
//! It is persisted as one full snapshot in the TTL cache with an effectively
//! permanent lifetime.

mod registry;

pub use registry::{WatchlistRegistry, WATCHLIST_CACHE_KEY};
