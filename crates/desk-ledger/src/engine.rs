//! Trade execution against the append-only log.

use desk_core::error::{StoreError, TradeError};
use desk_core::observer::{Observers, Subscription};
use desk_core::traits::{Clock, QuoteBook, SystemClock};
use desk_core::types::{normalize_symbol, PortfolioState, Side, TradeRecord};
use desk_store::{Collection, PersistentStore};
use rust_decimal::Decimal;
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::replay::{replay, SEED_CASH};
use crate::valuation::PortfolioValuation;

/// Result of a successful trade.
#[derive(Debug, Clone, PartialEq)]
pub struct TradeConfirmation {
    pub record: TradeRecord,
    /// Human-readable summary, e.g. `Bought 10 AAPL @ 150.00`
    pub message: String,
}

/// Paper-trading ledger.
///
/// Validation reads a fresh replay of the log and the append happens
/// afterwards, with no lock in between. Two concurrent trades can therefore
/// both pass validation against the same snapshot and over-spend or
/// over-sell; callers that need strict ordering must serialize trades
/// themselves.
pub struct LedgerEngine {
    store: Arc<dyn PersistentStore>,
    quotes: Arc<dyn QuoteBook>,
    clock: Arc<dyn Clock>,
    seed_cash: Decimal,
    observers: Observers,
}

impl LedgerEngine {
    /// Create a ledger seeded with [`SEED_CASH`].
    pub fn new(store: Arc<dyn PersistentStore>, quotes: Arc<dyn QuoteBook>) -> Self {
        Self {
            store,
            quotes,
            clock: Arc::new(SystemClock),
            seed_cash: SEED_CASH,
            observers: Observers::new(),
        }
    }

    /// Set the starting cash.
    pub fn with_seed_cash(mut self, seed_cash: Decimal) -> Self {
        self.seed_cash = seed_cash;
        self
    }

    /// Set the time source used to stamp trades.
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn seed_cash(&self) -> Decimal {
        self.seed_cash
    }

    pub fn subscribe<F>(&self, callback: F) -> Subscription
    where
        F: Fn() + Send + Sync + 'static,
    {
        self.observers.subscribe(callback)
    }

    async fn trade_log(&self) -> Result<Vec<TradeRecord>, StoreError> {
        self.store.get_all_items(Collection::Trades).await
    }

    /// Cash and holdings, replayed from the full log on every call.
    pub async fn get_portfolio(&self) -> Result<PortfolioState, StoreError> {
        let log = self.trade_log().await?;
        Ok(replay(self.seed_cash, &log))
    }

    /// The trade log, newest first.
    pub async fn history(&self) -> Result<Vec<TradeRecord>, StoreError> {
        let mut log = self.trade_log().await?;
        log.sort_by_key(|t| t.timestamp);
        log.reverse();
        Ok(log)
    }

    /// Current portfolio valued at the last known quotes.
    pub async fn valuation(&self) -> Result<PortfolioValuation, StoreError> {
        let portfolio = self.get_portfolio().await?;
        Ok(PortfolioValuation::compute(&portfolio, self.quotes.as_ref()))
    }

    /// Validate and record a trade at the current quote.
    pub async fn execute_trade(
        &self,
        symbol: &str,
        side: Side,
        qty: Decimal,
        note: Option<String>,
    ) -> Result<TradeConfirmation, TradeError> {
        if qty <= Decimal::ZERO {
            return Err(TradeError::InvalidQuantity(qty));
        }
        let symbol =
            normalize_symbol(symbol).ok_or_else(|| TradeError::ProviderUnavailable(symbol.to_string()))?;

        let price = match self.quotes.quote(&symbol) {
            Some(quote) if quote.is_tradable() => quote.price,
            _ => {
                warn!(%symbol, "Trade rejected: no usable quote");
                return Err(TradeError::ProviderUnavailable(symbol));
            }
        };

        let Some(required) = qty.checked_mul(price) else {
            warn!(%symbol, %qty, %price, "Trade rejected: notional out of range");
            return Err(TradeError::InvalidQuantity(qty));
        };

        let portfolio = self.get_portfolio().await?;
        match side {
            Side::Buy => {
                if portfolio.cash < required {
                    warn!(%symbol, %required, available = %portfolio.cash, "Trade rejected: insufficient funds");
                    return Err(TradeError::InsufficientFunds {
                        required,
                        available: portfolio.cash,
                    });
                }
            }
            Side::Sell => {
                let held = portfolio.held_qty(&symbol);
                if held < qty {
                    warn!(%symbol, requested = %qty, %held, "Trade rejected: insufficient holdings");
                    return Err(TradeError::InsufficientHoldings {
                        symbol,
                        requested: qty,
                        held,
                    });
                }
            }
        }

        let record = TradeRecord::new(&symbol, side, qty, price, self.clock.now_ms(), note);
        self.store
            .put_item(Collection::Trades, &record.id, &record)
            .await?;

        let verb = match side {
            Side::Buy => "Bought",
            Side::Sell => "Sold",
        };
        let message = format!("{verb} {} {symbol} @ {price:.2}", qty.normalize());
        info!(id = %record.id, %side, %symbol, %qty, %price, "Trade recorded");

        self.observers.notify();
        Ok(TradeConfirmation { record, message })
    }

    /// Delete the whole trade log, returning the account to seed cash.
    pub async fn reset_account(&self) -> Result<(), StoreError> {
        self.store.clear(Collection::Trades).await?;
        info!(seed_cash = %self.seed_cash, "Account reset");
        self.observers.notify();
        Ok(())
    }

    /// Number of recorded trades.
    pub async fn trade_count(&self) -> Result<usize, StoreError> {
        let count = self.store.get_all(Collection::Trades).await?.len();
        debug!(count, "Counted trades");
        Ok(count)
    }
}

impl std::fmt::Debug for LedgerEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LedgerEngine")
            .field("seed_cash", &self.seed_cash)
            .finish()
    }
}
