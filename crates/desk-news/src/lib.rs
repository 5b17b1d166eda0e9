//! News aggregation.
//!
//! Fans a request out to every enabled provider, merges the answers by URL
//! (earlier providers win), sorts newest first and caches non-empty results
//! for a few minutes.

mod aggregator;
mod key;

pub use aggregator::{NewsAggregator, DEFAULT_NEWS_TTL_MINUTES};
pub use key::cache_key;
