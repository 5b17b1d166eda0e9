//! Derived portfolio state.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Quantity and average entry price of one symbol.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Holding {
    pub qty: Decimal,
    pub avg_price: Decimal,
}

impl Holding {
    pub fn new(qty: Decimal, avg_price: Decimal) -> Self {
        Self { qty, avg_price }
    }

    /// Cost basis (qty * avg_price), saturating.
    pub fn cost_basis(&self) -> Decimal {
        self.qty.saturating_mul(self.avg_price)
    }
}

/// Cash and holdings derived from the trade log. Never persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PortfolioState {
    /// Available cash
    pub cash: Decimal,
    /// Open holdings keyed by symbol
    pub holdings: BTreeMap<String, Holding>,
}

impl PortfolioState {
    /// An empty portfolio holding only cash.
    pub fn with_cash(cash: Decimal) -> Self {
        Self {
            cash,
            holdings: BTreeMap::new(),
        }
    }

    pub fn holding(&self, symbol: &str) -> Option<&Holding> {
        self.holdings.get(symbol)
    }

    /// Quantity held of a symbol, zero when absent.
    pub fn held_qty(&self, symbol: &str) -> Decimal {
        self.holdings
            .get(symbol)
            .map(|h| h.qty)
            .unwrap_or(Decimal::ZERO)
    }
}
