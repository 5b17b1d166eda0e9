//! Provider adapters.
//!
//! Each adapter calls a [`Fetcher`] for raw JSON and converts the payload
//! into [`Quote`](desk_core::Quote) or [`NewsItem`](desk_core::NewsItem)
//! values. Nothing outside this crate sees a provider-specific shape.

mod alphavantage;
mod fetcher;
mod finnhub;
mod registry;
mod yahoo;

#[cfg(test)]
mod testing;

pub use alphavantage::AlphaVantageNewsProvider;
pub use fetcher::{FetchError, Fetcher, HttpFetcher};
pub use finnhub::FinnhubNewsProvider;
pub use registry::{build_news_providers, ProviderKeys};
pub use yahoo::{YahooNewsProvider, YahooQuoteProvider};

use rust_decimal::Decimal;

/// Convert a provider float to a decimal, dropping float noise.
///
/// Returns `None` for NaN and infinities.
pub(crate) fn to_decimal(value: f64) -> Option<Decimal> {
    if !value.is_finite() {
        return None;
    }
    Decimal::from_f64_retain(value).map(|d| d.round_dp(6).normalize())
}
