//! Component wiring shared by the commands.

use anyhow::{Context, Result};
use desk_config::AppConfig;
use desk_core::traits::QuoteBook;
use desk_ledger::LedgerEngine;
use desk_market::MarketDataCache;
use desk_news::NewsAggregator;
use desk_providers::{build_news_providers, Fetcher, HttpFetcher, ProviderKeys, YahooQuoteProvider};
use desk_store::{PersistentStore, SqliteStore, TtlCache};
use desk_watchlist::WatchlistRegistry;
use std::sync::Arc;
use tracing::{debug, info};

/// Every component, constructed once and passed by handle.
pub struct Desk {
    pub config: AppConfig,
    pub watchlist: Arc<WatchlistRegistry>,
    pub market: Arc<MarketDataCache>,
    pub ledger: LedgerEngine,
    pub news: NewsAggregator,
}

impl Desk {
    /// Open the store and restore persisted state.
    pub async fn open(config: AppConfig) -> Result<Self> {
        let store: Arc<dyn PersistentStore> = Arc::new(
            SqliteStore::open(&config.storage.path)
                .with_context(|| format!("Failed to open store at {}", config.storage.path))?,
        );
        let cache = TtlCache::new(Arc::clone(&store));

        let watchlist = Arc::new(WatchlistRegistry::new(
            cache.clone(),
            config.market.default_watchlist.as_slice(),
        ));
        watchlist.load().await;

        let fetcher: Arc<dyn Fetcher> = Arc::new(
            HttpFetcher::new(config.providers.timeout()).context("Failed to build HTTP client")?,
        );
        let market = Arc::new(MarketDataCache::new(
            Arc::new(YahooQuoteProvider::new(Arc::clone(&fetcher))),
            Arc::clone(&watchlist),
            Arc::clone(&store),
        ));
        let restored = market.load_persisted().await;
        debug!(restored, "Market cache warmed");

        let ledger = LedgerEngine::new(
            Arc::clone(&store),
            Arc::clone(&market) as Arc<dyn QuoteBook>,
        )
        .with_seed_cash(config.ledger.seed_cash);

        let keys = ProviderKeys::from_env(
            &config.providers.alphavantage_api_key_env,
            &config.providers.finnhub_api_key_env,
        );
        let news = NewsAggregator::with_providers(cache, build_news_providers(fetcher, &keys))
            .with_ttl_minutes(config.news.ttl_minutes);

        info!(
            store = %config.storage.path,
            symbols = watchlist.len(),
            news_providers = ?news.enabled_providers(),
            "Desk ready"
        );

        Ok(Self {
            config,
            watchlist,
            market,
            ledger,
            news,
        })
    }
}
