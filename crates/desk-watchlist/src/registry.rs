//! Watchlist registry.

use desk_core::error::StoreError;
use desk_core::observer::{Observers, Subscription};
use desk_core::types::normalize_symbol;
use desk_store::{TtlCache, PERMANENT_TTL_MINUTES};
use std::sync::{Arc, PoisonError, RwLock};
use tracing::{debug, info, warn};

/// Cache key of the persisted snapshot.
pub const WATCHLIST_CACHE_KEY: &str = "watchlist:symbols";

/// Durable, observable set of watched symbols.
///
/// Symbols are normalized (trimmed, upper-case) and kept in insertion order.
/// No tradability check happens here.
pub struct WatchlistRegistry {
    symbols: RwLock<Vec<String>>,
    cache: TtlCache,
    observers: Observers,
}

impl WatchlistRegistry {
    /// Create a registry seeded with `defaults`. Call [`load`](Self::load)
    /// to replace the seed with the persisted snapshot.
    pub fn new<S: AsRef<str>>(cache: TtlCache, defaults: &[S]) -> Self {
        let mut symbols: Vec<String> = Vec::with_capacity(defaults.len());
        for symbol in defaults.iter().filter_map(|s| normalize_symbol(s.as_ref())) {
            if !symbols.contains(&symbol) {
                symbols.push(symbol);
            }
        }

        Self {
            symbols: RwLock::new(symbols),
            cache,
            observers: Observers::new(),
        }
    }

    /// Replace the in-memory set with the persisted snapshot, if any.
    ///
    /// Returns `true` when a snapshot was loaded. Store failures are logged
    /// and the seed is kept.
    pub async fn load(&self) -> bool {
        match self.cache.get_cache::<Vec<String>>(WATCHLIST_CACHE_KEY).await {
            Ok(Some(persisted)) => {
                let mut loaded: Vec<String> = Vec::with_capacity(persisted.len());
                for symbol in persisted.iter().filter_map(|s| normalize_symbol(s)) {
                    if !loaded.contains(&symbol) {
                        loaded.push(symbol);
                    }
                }
                info!(count = loaded.len(), "Loaded watchlist");
                *self.symbols.write().unwrap_or_else(PoisonError::into_inner) = loaded;
                self.observers.notify();
                true
            }
            Ok(None) => {
                debug!("No persisted watchlist, keeping defaults");
                false
            }
            Err(e) => {
                warn!(error = %e, "Failed to load watchlist, keeping defaults");
                false
            }
        }
    }

    /// Snapshot of the current symbols, in insertion order.
    pub fn symbols(&self) -> Vec<String> {
        self.symbols
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Case-insensitive membership test.
    pub fn has_symbol(&self, symbol: &str) -> bool {
        match normalize_symbol(symbol) {
            Some(symbol) => self
                .symbols
                .read()
                .unwrap_or_else(PoisonError::into_inner)
                .contains(&symbol),
            None => false,
        }
    }

    pub fn len(&self) -> usize {
        self.symbols.read().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Add a symbol.
    ///
    /// Returns `Ok(false)` if it was already present (or blank). On insert the
    /// snapshot is persisted and subscribers are notified; a persistence
    /// failure is returned after notifying, the in-memory insert stands.
    pub async fn add_symbol(&self, raw: &str) -> Result<bool, StoreError> {
        let Some(symbol) = normalize_symbol(raw) else {
            return Ok(false);
        };

        let snapshot = {
            let mut symbols = self.symbols.write().unwrap_or_else(PoisonError::into_inner);
            if symbols.contains(&symbol) {
                return Ok(false);
            }
            symbols.push(symbol.clone());
            symbols.clone()
        };

        info!(%symbol, "Added to watchlist");
        self.persist_and_notify(snapshot).await.map(|_| true)
    }

    /// Remove a symbol. Returns `Ok(false)` if it was not present.
    pub async fn remove_symbol(&self, symbol: &str) -> Result<bool, StoreError> {
        let Some(symbol) = normalize_symbol(symbol) else {
            return Ok(false);
        };

        let snapshot = {
            let mut symbols = self.symbols.write().unwrap_or_else(PoisonError::into_inner);
            let before = symbols.len();
            symbols.retain(|s| *s != symbol);
            if symbols.len() == before {
                return Ok(false);
            }
            symbols.clone()
        };

        info!(%symbol, "Removed from watchlist");
        self.persist_and_notify(snapshot).await.map(|_| true)
    }

    /// Register a change callback. It is invoked once immediately with the
    /// current state, then after every change.
    pub fn subscribe<F>(&self, callback: F) -> Subscription
    where
        F: Fn() + Send + Sync + 'static,
    {
        let callback = Arc::new(callback);
        let registered = Arc::clone(&callback);
        let subscription = self.observers.subscribe(move || registered());
        callback();
        subscription
    }

    async fn persist_and_notify(&self, snapshot: Vec<String>) -> Result<(), StoreError> {
        let persisted = self
            .cache
            .set_cache(WATCHLIST_CACHE_KEY, &snapshot, PERMANENT_TTL_MINUTES)
            .await;
        if let Err(e) = &persisted {
            warn!(error = %e, "Failed to persist watchlist");
        }
        self.observers.notify();
        persisted
    }
}

impl std::fmt::Debug for WatchlistRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WatchlistRegistry")
            .field("symbols", &self.symbols())
            .finish()
    }
}
