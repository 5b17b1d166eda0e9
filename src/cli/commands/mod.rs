//! CLI command implementations.

pub mod market;
pub mod news;
pub mod portfolio;
pub mod trade;
pub mod validate;
pub mod watch;
pub mod watchlist;
