//! Error types for paperdesk.

use rust_decimal::Decimal;
use thiserror::Error;

/// Top-level error.
#[derive(Error, Debug)]
pub enum DeskError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    #[error("Provider error: {0}")]
    Provider(#[from] ProviderError),

    #[error("Trade error: {0}")]
    Trade(#[from] TradeError),
}

/// Durable store errors.
#[derive(Error, Debug)]
pub enum StoreError {
    /// The durable layer could not be reached. Possibly transient; the
    /// next call re-establishes the connection.
    #[error("Store unavailable: {0}")]
    Unavailable(String),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl From<serde_json::Error> for StoreError {
    fn from(e: serde_json::Error) -> Self {
        StoreError::Serialization(e.to_string())
    }
}

/// Market data provider errors.
#[derive(Error, Debug)]
pub enum ProviderError {
    /// Network or API degraded, or zero rows for a non-empty request.
    #[error("Provider unavailable ({provider}): {message}")]
    Unavailable { provider: String, message: String },

    /// A single-symbol lookup returned nothing.
    #[error("Ticker not found: {0}")]
    TickerNotFound(String),

    #[error("Malformed payload from {provider}: {message}")]
    Parse { provider: String, message: String },

    #[error("Missing credential for {0}")]
    MissingCredential(String),
}

impl ProviderError {
    pub fn unavailable(provider: impl Into<String>, message: impl Into<String>) -> Self {
        ProviderError::Unavailable {
            provider: provider.into(),
            message: message.into(),
        }
    }

    pub fn parse(provider: impl Into<String>, message: impl Into<String>) -> Self {
        ProviderError::Parse {
            provider: provider.into(),
            message: message.into(),
        }
    }
}

/// Trade validation errors. These always reach the caller.
#[derive(Error, Debug)]
pub enum TradeError {
    #[error("Quantity must be positive, got {0}")]
    InvalidQuantity(Decimal),

    #[error("No usable quote for {0}")]
    ProviderUnavailable(String),

    #[error("Insufficient funds: required {required}, available {available}")]
    InsufficientFunds { required: Decimal, available: Decimal },

    #[error("Insufficient holdings of {symbol}: requested {requested}, held {held}")]
    InsufficientHoldings {
        symbol: String,
        requested: Decimal,
        held: Decimal,
    },

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Result type alias for paperdesk operations.
pub type DeskResult<T> = Result<T, DeskError>;
