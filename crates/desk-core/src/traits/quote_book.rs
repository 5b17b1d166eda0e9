//! Read access to current quotes.

use crate::types::Quote;

/// Anything that can answer "what is the current quote for this symbol".
///
/// The ledger validates trades against this; the market data cache
/// implements it.
pub trait QuoteBook: Send + Sync {
    /// Current quote for `symbol`, if one has ever been fetched.
    fn quote(&self, symbol: &str) -> Option<Quote>;
}

impl QuoteBook for std::collections::HashMap<String, Quote> {
    fn quote(&self, symbol: &str) -> Option<Quote> {
        self.get(symbol).cloned()
    }
}
