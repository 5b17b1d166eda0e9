//! Fan-out, merge and cache.

use desk_core::traits::NewsProvider;
use desk_core::types::{NewsItem, NewsQuery};
use desk_store::TtlCache;
use futures::future::join_all;
use std::collections::HashSet;
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::key::cache_key;

/// How long a merged feed stays cached.
pub const DEFAULT_NEWS_TTL_MINUTES: i64 = 3;

/// News feed over an ordered list of providers.
///
/// Registration order is priority order: when two providers return the same
/// URL, the earlier provider's version is kept.
pub struct NewsAggregator {
    providers: Vec<Arc<dyn NewsProvider>>,
    cache: TtlCache,
    ttl_minutes: i64,
}

impl NewsAggregator {
    pub fn new(cache: TtlCache) -> Self {
        Self {
            providers: Vec::new(),
            cache,
            ttl_minutes: DEFAULT_NEWS_TTL_MINUTES,
        }
    }

    /// Create an aggregator over `providers`, highest priority first.
    pub fn with_providers(cache: TtlCache, providers: Vec<Arc<dyn NewsProvider>>) -> Self {
        Self {
            providers,
            ..Self::new(cache)
        }
    }

    pub fn with_ttl_minutes(mut self, ttl_minutes: i64) -> Self {
        self.ttl_minutes = ttl_minutes;
        self
    }

    /// Names of the providers that will be called, in priority order.
    pub fn enabled_providers(&self) -> Vec<&str> {
        self.providers
            .iter()
            .filter(|p| p.is_enabled())
            .map(|p| p.name())
            .collect()
    }

    /// Fetch news for `tickers` (general news when `None`).
    pub async fn get_news(
        &self,
        tickers: Option<Vec<String>>,
        limit: usize,
        force_refresh: bool,
    ) -> Vec<NewsItem> {
        self.get_news_for(&NewsQuery::new(tickers, limit), force_refresh)
            .await
    }

    /// Fetch news for a prepared query.
    ///
    /// Unless `force_refresh`, a non-empty cached feed is returned as is.
    /// Otherwise every enabled provider is called concurrently; failures are
    /// logged and contribute nothing. The merged feed is cached only when it
    /// is non-empty.
    pub async fn get_news_for(&self, query: &NewsQuery, force_refresh: bool) -> Vec<NewsItem> {
        let key = cache_key(query);

        if !force_refresh {
            match self.cache.get_cache::<Vec<NewsItem>>(&key).await {
                Ok(Some(items)) if !items.is_empty() => {
                    debug!(%key, count = items.len(), "News cache hit");
                    return items;
                }
                Ok(_) => {}
                Err(e) => warn!(%key, error = %e, "News cache read failed"),
            }
        }

        let batches = self.fan_out(query).await;
        let items = merge(batches, query.limit);

        if items.is_empty() {
            info!(tickers = ?query.tickers(), "No news returned by any provider");
        } else if let Err(e) = self.cache.set_cache(&key, &items, self.ttl_minutes).await {
            warn!(%key, error = %e, "News cache write failed");
        }

        items
    }

    /// Call every enabled provider, keeping priority order in the output.
    async fn fan_out(&self, query: &NewsQuery) -> Vec<Vec<NewsItem>> {
        let calls = self.providers.iter().filter(|p| p.is_enabled()).map(|provider| {
            let provider = Arc::clone(provider);
            async move {
                match provider.fetch_news(query).await {
                    Ok(items) => {
                        debug!(provider = provider.name(), count = items.len(), "News fetched");
                        items
                    }
                    Err(e) => {
                        warn!(provider = provider.name(), error = %e, "News provider failed");
                        Vec::new()
                    }
                }
            }
        });

        join_all(calls).await
    }
}

impl std::fmt::Debug for NewsAggregator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let names: Vec<&str> = self.providers.iter().map(|p| p.name()).collect();
        f.debug_struct("NewsAggregator")
            .field("providers", &names)
            .field("ttl_minutes", &self.ttl_minutes)
            .finish()
    }
}

/// Dedupe by URL keeping the first occurrence, sort newest first, cap at
/// `limit` (zero means no cap).
fn merge(batches: Vec<Vec<NewsItem>>, limit: usize) -> Vec<NewsItem> {
    let mut seen = HashSet::new();
    let mut items: Vec<NewsItem> = batches
        .into_iter()
        .flatten()
        .filter(|item| seen.insert(item.url.clone()))
        .collect();

    // Stable, so equal timestamps keep provider order.
    items.sort_by(|a, b| b.published_at.cmp(&a.published_at));
    if limit > 0 {
        items.truncate(limit);
    }
    items
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use desk_core::error::ProviderError;
    use desk_core::traits::ManualClock;
    use desk_store::{Collection, PersistentStore, SqliteStore};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    struct StubProvider {
        name: &'static str,
        items: Mutex<Vec<NewsItem>>,
        enabled: bool,
        fail: bool,
        calls: AtomicUsize,
    }

    impl StubProvider {
        fn build(name: &'static str, items: Vec<NewsItem>, enabled: bool, fail: bool) -> Arc<Self> {
            Arc::new(Self {
                name,
                items: Mutex::new(items),
                enabled,
                fail,
                calls: AtomicUsize::new(0),
            })
        }

        fn new(name: &'static str, items: Vec<NewsItem>) -> Arc<Self> {
            Self::build(name, items, true, false)
        }

        fn disabled(name: &'static str, items: Vec<NewsItem>) -> Arc<Self> {
            Self::build(name, items, false, false)
        }

        fn failing(name: &'static str) -> Arc<Self> {
            Self::build(name, Vec::new(), true, true)
        }

        fn set_items(&self, items: Vec<NewsItem>) {
            *self.items.lock().unwrap() = items;
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl NewsProvider for StubProvider {
        async fn fetch_news(&self, _query: &NewsQuery) -> Result<Vec<NewsItem>, ProviderError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                return Err(ProviderError::unavailable(self.name, "HTTP 503"));
            }
            Ok(self.items.lock().unwrap().clone())
        }

        fn is_enabled(&self) -> bool {
            self.enabled
        }

        fn name(&self) -> &str {
            self.name
        }
    }

    fn item(url: &str, title: &str, published_at: i64) -> NewsItem {
        NewsItem::new(url, title, published_at)
    }

    struct Fixture {
        _dir: tempfile::TempDir,
        store: Arc<dyn PersistentStore>,
        clock: Arc<ManualClock>,
    }

    impl Fixture {
        fn new() -> Self {
            let dir = tempfile::tempdir().unwrap();
            let store: Arc<dyn PersistentStore> =
                Arc::new(SqliteStore::open(dir.path().join("news.db")).unwrap());
            Self {
                _dir: dir,
                store,
                clock: Arc::new(ManualClock::new(1_700_000_000_000)),
            }
        }

        fn aggregator(&self, providers: Vec<Arc<StubProvider>>) -> NewsAggregator {
            let cache = TtlCache::with_clock(Arc::clone(&self.store), self.clock.clone());
            NewsAggregator::with_providers(
                cache,
                providers
                    .into_iter()
                    .map(|p| p as Arc<dyn NewsProvider>)
                    .collect(),
            )
        }
    }

    #[tokio::test]
    async fn test_dedupe_keeps_higher_priority_version() {
        let fx = Fixture::new();
        let a = StubProvider::new(
            "a",
            vec![item("url1", "A one", 100), item("url2", "A two", 200)],
        );
        let b = StubProvider::new(
            "b",
            vec![item("url2", "B two", 250), item("url3", "B three", 300)],
        );
        let news = fx.aggregator(vec![a, b]);

        let items = news.get_news(None, 20, false).await;
        assert_eq!(items.len(), 3);

        let urls: Vec<&str> = items.iter().map(|i| i.url.as_str()).collect();
        assert_eq!(urls, vec!["url3", "url2", "url1"]);
        let url2 = items.iter().find(|i| i.url == "url2").unwrap();
        assert_eq!(url2.title, "A two");
        assert_eq!(url2.published_at, 200);
    }

    #[tokio::test]
    async fn test_cached_feed_is_served_until_expiry() {
        let fx = Fixture::new();
        let a = StubProvider::new("a", vec![item("url1", "first", 1)]);
        let news = fx.aggregator(vec![Arc::clone(&a)]);

        let first = news.get_news(Some(vec!["aapl".into()]), 10, false).await;
        a.set_items(vec![item("url9", "fresh", 2)]);

        // Same query in a different spelling hits the cache.
        let cached = news.get_news(Some(vec!["AAPL".into()]), 10, false).await;
        assert_eq!(cached, first);
        assert_eq!(a.calls(), 1);

        fx.clock.advance_minutes(DEFAULT_NEWS_TTL_MINUTES);
        let refreshed = news.get_news(Some(vec!["AAPL".into()]), 10, false).await;
        assert_eq!(refreshed[0].url, "url9");
        assert_eq!(a.calls(), 2);
    }

    #[tokio::test]
    async fn test_force_refresh_bypasses_cache() {
        let fx = Fixture::new();
        let a = StubProvider::new("a", vec![item("url1", "first", 1)]);
        let news = fx.aggregator(vec![Arc::clone(&a)]);

        news.get_news(None, 10, false).await;
        a.set_items(vec![item("url2", "second", 2)]);
        let items = news.get_news(None, 10, true).await;

        assert_eq!(items[0].url, "url2");
        assert_eq!(a.calls(), 2);
    }

    #[tokio::test]
    async fn test_empty_result_is_not_cached() {
        let fx = Fixture::new();
        let a = StubProvider::new("a", Vec::new());
        let news = fx.aggregator(vec![Arc::clone(&a)]);

        assert!(news.get_news(None, 10, false).await.is_empty());
        assert!(fx.store.get_all(Collection::Cache).await.unwrap().is_empty());

        a.set_items(vec![item("url1", "late", 5)]);
        let items = news.get_news(None, 10, false).await;
        assert_eq!(items.len(), 1);
        assert_eq!(a.calls(), 2);
    }

    #[tokio::test]
    async fn test_failing_provider_is_isolated() {
        let fx = Fixture::new();
        let broken = StubProvider::failing("broken");
        let ok = StubProvider::new("ok", vec![item("url1", "still here", 1)]);
        let news = fx.aggregator(vec![Arc::clone(&broken), ok]);

        let items = news.get_news(None, 10, false).await;
        assert_eq!(items.len(), 1);
        assert_eq!(broken.calls(), 1);
    }

    #[tokio::test]
    async fn test_disabled_provider_is_skipped() {
        let fx = Fixture::new();
        let keyless = StubProvider::new("keyless", vec![item("url1", "one", 1)]);
        let keyed = StubProvider::disabled("keyed", vec![item("url2", "two", 2)]);
        let news = fx.aggregator(vec![keyless, Arc::clone(&keyed)]);

        assert_eq!(news.enabled_providers(), vec!["keyless"]);
        let items = news.get_news(None, 10, false).await;
        assert_eq!(items.len(), 1);
        assert_eq!(keyed.calls(), 0);
    }

    #[tokio::test]
    async fn test_result_is_truncated_to_limit() {
        let fx = Fixture::new();
        let a = StubProvider::new(
            "a",
            (0..10)
                .map(|i| item(&format!("url{i}"), "headline", i))
                .collect(),
        );
        let news = fx.aggregator(vec![a]);

        let items = news.get_news(None, 4, false).await;
        let stamps: Vec<i64> = items.iter().map(|i| i.published_at).collect();
        assert_eq!(stamps, vec![9, 8, 7, 6]);
    }

    #[test]
    fn test_merge_equal_timestamps_keep_provider_order() {
        let merged = merge(
            vec![
                vec![item("a", "a", 10)],
                vec![item("b", "b", 10), item("a", "dup", 99)],
            ],
            0,
        );
        let urls: Vec<&str> = merged.iter().map(|i| i.url.as_str()).collect();
        assert_eq!(urls, vec!["a", "b"]);
    }
}
