//! Market data provider contracts.
//!
//! Adapters turn raw provider payloads into [`Quote`] and [`NewsItem`]
//! values exactly once; nothing downstream sees a provider-specific shape.

use crate::error::ProviderError;
use crate::types::{NewsItem, NewsQuery, Quote};
use async_trait::async_trait;

/// Trait for batched quote sources.
#[async_trait]
pub trait QuoteProvider: Send + Sync {
    /// Fetch quotes for a batch of symbols.
    ///
    /// An empty vector is a valid "no data" answer, not an error. Transport
    /// faults are reported as [`ProviderError::Unavailable`].
    async fn fetch_quotes(&self, symbols: &[String]) -> Result<Vec<Quote>, ProviderError>;

    /// Get the provider name.
    fn name(&self) -> &str;
}

/// Trait for news sources.
#[async_trait]
pub trait NewsProvider: Send + Sync {
    /// Fetch news for the optional tickers in `query`, at most `query.limit` items.
    async fn fetch_news(&self, query: &NewsQuery) -> Result<Vec<NewsItem>, ProviderError>;

    /// Whether the provider can be called. Providers whose credential is
    /// missing report `false` and are skipped.
    fn is_enabled(&self) -> bool {
        true
    }

    /// Get the provider name.
    fn name(&self) -> &str;
}
