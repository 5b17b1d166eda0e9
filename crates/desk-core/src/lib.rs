//! Core types and traits for paperdesk.
//!
//! This crate provides the building blocks shared by every component:
//! - Value types (Quote, TradeRecord, PortfolioState, NewsItem, MarketStatus)
//! - The error taxonomy
//! - Provider and quote-lookup traits
//! - The observer registry used for change notification
//! - A clock abstraction for timestamps and cache expiry

pub mod error;
pub mod observer;
pub mod traits;
pub mod types;

pub use error::{DeskError, DeskResult};
pub use observer::{Observers, Subscription};
pub use traits::*;
pub use types::*;
