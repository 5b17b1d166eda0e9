//! Mark-to-market view of a portfolio.

use desk_core::traits::QuoteBook;
use desk_core::types::PortfolioState;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// One holding valued at the last known price.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PositionValuation {
    pub symbol: String,
    pub qty: Decimal,
    pub avg_price: Decimal,
    /// Last known price, or the average price when no quote is cached
    pub mark_price: Decimal,
    /// Whether `mark_price` came from a quote
    pub quoted: bool,
    pub market_value: Decimal,
    pub unrealized_pnl: Decimal,
}

/// Portfolio totals at last known prices.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PortfolioValuation {
    pub cash: Decimal,
    pub market_value: Decimal,
    /// Cash plus market value
    pub equity: Decimal,
    pub positions: Vec<PositionValuation>,
}

impl PortfolioValuation {
    /// Value `portfolio` against `quotes`. Holdings without a usable quote
    /// are carried at cost.
    pub fn compute(portfolio: &PortfolioState, quotes: &dyn QuoteBook) -> Self {
        let positions: Vec<PositionValuation> = portfolio
            .holdings
            .iter()
            .map(|(symbol, holding)| {
                let mark = quotes
                    .quote(symbol)
                    .filter(|q| q.is_tradable())
                    .map(|q| q.price);
                let mark_price = mark.unwrap_or(holding.avg_price);
                let market_value = holding.qty.saturating_mul(mark_price);
                PositionValuation {
                    symbol: symbol.clone(),
                    qty: holding.qty,
                    avg_price: holding.avg_price,
                    mark_price,
                    quoted: mark.is_some(),
                    market_value,
                    unrealized_pnl: market_value.saturating_sub(holding.cost_basis()),
                }
            })
            .collect();

        let market_value = positions
            .iter()
            .fold(Decimal::ZERO, |acc, p| acc.saturating_add(p.market_value));
        Self {
            cash: portfolio.cash,
            market_value,
            equity: portfolio.cash.saturating_add(market_value),
            positions,
        }
    }

    pub fn unrealized_pnl(&self) -> Decimal {
        self.positions
            .iter()
            .fold(Decimal::ZERO, |acc, p| acc.saturating_add(p.unrealized_pnl))
    }
}
