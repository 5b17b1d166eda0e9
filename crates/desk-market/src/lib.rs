//! Market data cache.
//!
//! Keeps the latest [`Quote`](desk_core::Quote) per watched symbol in memory,
//! refreshes it on a fixed interval, persists it opportunistically and tracks
//! the health of the feed as a [`MarketStatus`](desk_core::MarketStatus).

mod cache;
mod refresh;

pub use cache::MarketDataCache;
pub use refresh::RefreshLoop;
