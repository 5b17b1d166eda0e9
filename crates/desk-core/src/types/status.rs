//! Market data status.

use serde::{Deserialize, Serialize};

/// Health of the quote feed as observed by the last refresh.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "UPPERCASE")]
pub enum MarketStatus {
    /// No refresh has settled yet
    #[default]
    Loading,
    /// Last refresh succeeded, or there was nothing to fetch
    Live,
    /// Provider reachable but returned no rows
    Unavailable,
    /// Last refresh failed with a transport fault
    Error,
}

impl std::fmt::Display for MarketStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MarketStatus::Loading => write!(f, "LOADING"),
            MarketStatus::Live => write!(f, "LIVE"),
            MarketStatus::Unavailable => write!(f, "UNAVAILABLE"),
            MarketStatus::Error => write!(f, "ERROR"),
        }
    }
}
