//! Paper-trading ledger.
//!
//! The trade log is append-only. Cash and holdings are never stored; they are
//! re-derived by [`replay`] every time they are asked for.

mod engine;
mod replay;
mod valuation;

pub use engine::{LedgerEngine, TradeConfirmation};
pub use replay::{replay, SEED_CASH};
pub use valuation::{PortfolioValuation, PositionValuation};
