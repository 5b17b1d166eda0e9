//! Core data types for paperdesk.

mod news;
mod portfolio;
mod quote;
mod status;
mod trade;

pub use news::{NewsItem, NewsQuery};
pub use portfolio::{Holding, PortfolioState};
pub use quote::{normalize_symbol, Quote};
pub use status::MarketStatus;
pub use trade::{Side, TradeRecord};
