//! Trade log records.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Trade side.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Side {
    Buy,
    Sell,
}

impl std::fmt::Display for Side {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Side::Buy => write!(f, "BUY"),
            Side::Sell => write!(f, "SELL"),
        }
    }
}

/// One entry of the append-only trade log. Immutable once created.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TradeRecord {
    /// Unique trade id (UUID v4)
    pub id: String,
    /// Symbol
    pub symbol: String,
    /// Buy or sell
    pub side: Side,
    /// Quantity, always positive
    pub qty: Decimal,
    /// Execution price, always positive
    pub price: Decimal,
    /// Execution time (Unix milliseconds)
    pub timestamp: i64,
    /// Free-form user note
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

impl TradeRecord {
    /// Create a record with a fresh id.
    pub fn new(
        symbol: impl Into<String>,
        side: Side,
        qty: Decimal,
        price: Decimal,
        timestamp: i64,
        note: Option<String>,
    ) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            symbol: symbol.into(),
            side,
            qty,
            price,
            timestamp,
            note,
        }
    }

    /// Notional value of the trade (qty * price), saturating at the
    /// decimal range.
    pub fn cost(&self) -> Decimal {
        self.qty.saturating_mul(self.price)
    }
}
