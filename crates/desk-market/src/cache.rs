//! Quote map and market status state machine.

use chrono::{DateTime, Utc};
use desk_core::error::{ProviderError, StoreError};
use desk_core::observer::{Observers, Subscription};
use desk_core::traits::{QuoteBook, QuoteProvider};
use desk_core::types::{normalize_symbol, MarketStatus, Quote};
use desk_store::{Collection, PersistentStore};
use desk_watchlist::WatchlistRegistry;
use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};
use tracing::{debug, info, warn};

/// Latest quote per symbol plus the status of the feed.
///
/// Refreshes are not serialized: the periodic loop and explicit calls may
/// overlap, and the last completing write for a symbol wins.
pub struct MarketDataCache {
    provider: Arc<dyn QuoteProvider>,
    watchlist: Arc<WatchlistRegistry>,
    store: Arc<dyn PersistentStore>,
    quotes: RwLock<HashMap<String, Quote>>,
    status: RwLock<MarketStatus>,
    last_refreshed: RwLock<Option<DateTime<Utc>>>,
    observers: Observers,
}

impl MarketDataCache {
    /// Create an empty cache in the `Loading` state.
    pub fn new(
        provider: Arc<dyn QuoteProvider>,
        watchlist: Arc<WatchlistRegistry>,
        store: Arc<dyn PersistentStore>,
    ) -> Self {
        Self {
            provider,
            watchlist,
            store,
            quotes: RwLock::new(HashMap::new()),
            status: RwLock::new(MarketStatus::Loading),
            last_refreshed: RwLock::new(None),
            observers: Observers::new(),
        }
    }

    /// The watchlist driving refreshes.
    pub fn watchlist(&self) -> &Arc<WatchlistRegistry> {
        &self.watchlist
    }

    /// Current feed status.
    pub fn status(&self) -> MarketStatus {
        *self.status.read().unwrap_or_else(PoisonError::into_inner)
    }

    /// When the last refresh settled.
    pub fn last_refreshed(&self) -> Option<DateTime<Utc>> {
        *self.last_refreshed.read().unwrap_or_else(PoisonError::into_inner)
    }

    /// Last known quote for `symbol`. Never touches the network.
    pub fn get_quote(&self, symbol: &str) -> Option<Quote> {
        let symbol = normalize_symbol(symbol)?;
        self.quotes
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&symbol)
            .cloned()
    }

    /// Quotes for the watched symbols that have one, in watchlist order.
    pub fn quotes(&self) -> Vec<Quote> {
        let symbols = self.watchlist.symbols();
        let quotes = self.quotes.read().unwrap_or_else(PoisonError::into_inner);
        symbols
            .iter()
            .filter_map(|s| quotes.get(s).cloned())
            .collect()
    }

    /// Register a change callback, invoked after every refresh and watchlist
    /// change made through this cache.
    pub fn subscribe<F>(&self, callback: F) -> Subscription
    where
        F: Fn() + Send + Sync + 'static,
    {
        self.observers.subscribe(callback)
    }

    /// Seed the in-memory map from quotes persisted by earlier runs.
    ///
    /// Entries already in memory are kept. Returns the number of quotes
    /// loaded; store failures are logged and count as zero.
    pub async fn load_persisted(&self) -> usize {
        let persisted: Vec<Quote> = match self.store.get_all_items(Collection::Watchlist).await {
            Ok(quotes) => quotes,
            Err(e) => {
                warn!(error = %e, "Failed to load persisted quotes");
                return 0;
            }
        };

        let loaded = {
            let mut quotes = self.quotes.write().unwrap_or_else(PoisonError::into_inner);
            let mut loaded = 0;
            for quote in persisted {
                if let std::collections::hash_map::Entry::Vacant(slot) =
                    quotes.entry(quote.symbol.clone())
                {
                    slot.insert(quote);
                    loaded += 1;
                }
            }
            loaded
        };

        if loaded > 0 {
            debug!(loaded, "Restored persisted quotes");
            self.observers.notify();
        }
        loaded
    }

    /// Fetch quotes for every watched symbol and settle the status.
    ///
    /// Provider failures never reach the caller; they show up as
    /// `Unavailable` (zero rows) or `Error` (transport fault). Subscribers
    /// are notified exactly once.
    pub async fn refresh(&self) -> MarketStatus {
        let symbols = self.watchlist.symbols();

        let status = if symbols.is_empty() {
            MarketStatus::Live
        } else {
            match self.provider.fetch_quotes(&symbols).await {
                Err(e) => {
                    warn!(provider = self.provider.name(), error = %e, "Quote refresh failed");
                    MarketStatus::Error
                }
                Ok(quotes) if quotes.is_empty() => {
                    warn!(
                        provider = self.provider.name(),
                        requested = symbols.len(),
                        "Quote refresh returned no rows"
                    );
                    MarketStatus::Unavailable
                }
                Ok(quotes) => {
                    debug!(received = quotes.len(), requested = symbols.len(), "Quotes refreshed");
                    for quote in quotes {
                        self.store_quote(quote).await;
                    }
                    MarketStatus::Live
                }
            }
        };

        self.settle(status);
        self.observers.notify();
        status
    }

    /// Validate `raw` with a single-symbol round-trip and start watching it.
    ///
    /// Fails with `TickerNotFound` when the provider has no data for it. On
    /// success the quote is cached, persisted and returned.
    pub async fn add_to_watchlist(&self, raw: &str) -> Result<Quote, ProviderError> {
        let symbol =
            normalize_symbol(raw).ok_or_else(|| ProviderError::TickerNotFound(raw.to_string()))?;

        let mut found = self.provider.fetch_quotes(std::slice::from_ref(&symbol)).await?;
        if found.is_empty() {
            info!(%symbol, "Ticker not found");
            return Err(ProviderError::TickerNotFound(symbol));
        }
        let index = found
            .iter()
            .position(|q| normalize_symbol(&q.symbol).as_deref() == Some(symbol.as_str()))
            .unwrap_or(0);
        let quote = found.swap_remove(index);

        self.store_quote(quote.clone()).await;
        if let Err(e) = self.watchlist.add_symbol(&symbol).await {
            warn!(%symbol, error = %e, "Watchlist snapshot not persisted");
        }
        self.observers.notify();

        Ok(quote)
    }

    /// Stop watching `symbol` and forget its quote.
    ///
    /// Returns whether the symbol was watched. The persisted quote is
    /// removed on a best-effort basis.
    pub async fn remove_from_watchlist(&self, symbol: &str) -> Result<bool, StoreError> {
        let removed = self.watchlist.remove_symbol(symbol).await;

        if let Some(symbol) = normalize_symbol(symbol) {
            self.quotes
                .write()
                .unwrap_or_else(PoisonError::into_inner)
                .remove(&symbol);
            if let Err(e) = self.store.delete(Collection::Watchlist, &symbol).await {
                debug!(%symbol, error = %e, "Persisted quote not removed");
            }
        }

        self.observers.notify();
        removed
    }

    /// Replace the quote wholesale in memory, then persist it. Write failures
    /// are swallowed.
    async fn store_quote(&self, mut quote: Quote) {
        if let Some(symbol) = normalize_symbol(&quote.symbol) {
            quote.symbol = symbol;
        }

        self.quotes
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(quote.symbol.clone(), quote.clone());

        if let Err(e) = self
            .store
            .put_item(Collection::Watchlist, &quote.symbol, &quote)
            .await
        {
            debug!(symbol = %quote.symbol, error = %e, "Quote not persisted");
        }
    }

    fn settle(&self, status: MarketStatus) {
        let previous = std::mem::replace(
            &mut *self.status.write().unwrap_or_else(PoisonError::into_inner),
            status,
        );
        *self.last_refreshed.write().unwrap_or_else(PoisonError::into_inner) = Some(Utc::now());

        if previous != status {
            info!(from = %previous, to = %status, "Market status changed");
        }
    }
}

impl QuoteBook for MarketDataCache {
    fn quote(&self, symbol: &str) -> Option<Quote> {
        self.get_quote(symbol)
    }
}

impl std::fmt::Debug for MarketDataCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MarketDataCache")
            .field("provider", &self.provider.name())
            .field("status", &self.status())
            .field(
                "quotes",
                &self.quotes.read().unwrap_or_else(PoisonError::into_inner).len(),
            )
            .finish()
    }
}
