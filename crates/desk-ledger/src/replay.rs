//! Portfolio replay.

use desk_core::types::{PortfolioState, Side, TradeRecord};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

/// Starting cash of a fresh account.
pub const SEED_CASH: Decimal = dec!(10000);

/// Fold a trade log into cash and holdings.
///
/// Trades are applied in ascending timestamp order; equal timestamps keep
/// their order in `trades`. The fold is pure, so replaying the same log
/// always yields the same state. Records are never rejected here: a sell
/// without a holding is applied against an empty one and the resulting
/// non-positive position is dropped. Arithmetic saturates, so a log
/// written outside [`LedgerEngine`](crate::LedgerEngine) cannot panic the
/// fold.
pub fn replay(seed_cash: Decimal, trades: &[TradeRecord]) -> PortfolioState {
    let mut ordered: Vec<&TradeRecord> = trades.iter().collect();
    // Stable, so ties keep log order.
    ordered.sort_by_key(|t| t.timestamp);

    let mut state = PortfolioState::with_cash(seed_cash);
    for trade in ordered {
        apply(&mut state, trade);
    }
    state
}

fn apply(state: &mut PortfolioState, trade: &TradeRecord) {
    let cost = trade.cost();
    match trade.side {
        Side::Buy => {
            state.cash = state.cash.saturating_sub(cost);
            let holding = state.holdings.entry(trade.symbol.clone()).or_default();
            let qty = holding.qty.saturating_add(trade.qty);
            holding.avg_price = (holding.cost_basis().saturating_add(cost))
                .checked_div(qty)
                .unwrap_or(Decimal::ZERO);
            holding.qty = qty;
            if holding.qty <= Decimal::ZERO {
                state.holdings.remove(&trade.symbol);
            }
        }
        Side::Sell => {
            state.cash = state.cash.saturating_add(cost);
            let holding = state.holdings.entry(trade.symbol.clone()).or_default();
            holding.qty = holding.qty.saturating_sub(trade.qty);
            if holding.qty <= Decimal::ZERO {
                state.holdings.remove(&trade.symbol);
            }
        }
    }
}
