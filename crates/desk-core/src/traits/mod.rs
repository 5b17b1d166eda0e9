//! Core traits for paperdesk.

mod clock;
mod provider;
mod quote_book;

pub use clock::{Clock, ManualClock, SystemClock};
pub use provider::{NewsProvider, QuoteProvider};
pub use quote_book::QuoteBook;
