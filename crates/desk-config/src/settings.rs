//! Configuration structures.

use desk_core::{DeskError, DeskResult};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Main application configuration.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub app: AppSettings,
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default)]
    pub storage: StorageSettings,
    #[serde(default)]
    pub market: MarketSettings,
    #[serde(default)]
    pub ledger: LedgerSettings,
    #[serde(default)]
    pub news: NewsSettings,
    #[serde(default)]
    pub providers: ProviderSettings,
}

impl AppConfig {
    /// Reject settings the components cannot run with.
    pub fn validate(&self) -> DeskResult<()> {
        if self.market.refresh_interval_secs == 0 {
            return Err(DeskError::Config(
                "market.refresh_interval_secs must be greater than zero".into(),
            ));
        }
        if self.news.ttl_minutes <= 0 {
            return Err(DeskError::Config(format!(
                "news.ttl_minutes must be greater than zero, got {}",
                self.news.ttl_minutes
            )));
        }
        if self.ledger.seed_cash <= Decimal::ZERO {
            return Err(DeskError::Config(format!(
                "ledger.seed_cash must be positive, got {}",
                self.ledger.seed_cash
            )));
        }
        if !matches!(self.logging.format.as_str(), "pretty" | "json") {
            return Err(DeskError::Config(format!(
                "logging.format must be \"pretty\" or \"json\", got {:?}",
                self.logging.format
            )));
        }
        if self.storage.path.trim().is_empty() {
            return Err(DeskError::Config("storage.path must not be empty".into()));
        }
        Ok(())
    }

    /// Render the effective configuration as TOML.
    pub fn to_toml_string(&self) -> Result<String, toml::ser::Error> {
        toml::to_string_pretty(self)
    }
}

/// General app settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AppSettings {
    pub name: String,
    pub environment: String,
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            name: "paperdesk".to_string(),
            environment: "development".to_string(),
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    pub format: String,
    pub file: Option<String>,
}

impl LoggingConfig {
    pub fn is_json(&self) -> bool {
        self.format == "json"
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "pretty".to_string(),
            file: None,
        }
    }
}

/// Durable store location.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageSettings {
    /// SQLite database file
    pub path: String,
}

impl Default for StorageSettings {
    fn default() -> Self {
        Self {
            path: "data/paperdesk.db".to_string(),
        }
    }
}

/// Quote refresh settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MarketSettings {
    pub refresh_interval_secs: u64,
    /// Symbols watched on a cold start
    pub default_watchlist: Vec<String>,
}

impl MarketSettings {
    pub fn refresh_interval(&self) -> Duration {
        Duration::from_secs(self.refresh_interval_secs)
    }
}

impl Default for MarketSettings {
    fn default() -> Self {
        Self {
            refresh_interval_secs: 15,
            default_watchlist: ["AAPL", "MSFT", "NVDA", "GOOGL", "AMZN", "TSLA"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
        }
    }
}

/// Paper account settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LedgerSettings {
    pub seed_cash: Decimal,
}

impl Default for LedgerSettings {
    fn default() -> Self {
        Self {
            seed_cash: dec!(10000),
        }
    }
}

/// News feed settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct NewsSettings {
    pub ttl_minutes: i64,
    pub default_limit: usize,
}

impl Default for NewsSettings {
    fn default() -> Self {
        Self {
            ttl_minutes: 3,
            default_limit: 20,
        }
    }
}

/// Provider transport and credentials.
///
/// Keys are never stored in the file, only the names of the environment
/// variables that hold them.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ProviderSettings {
    pub timeout_secs: u64,
    pub alphavantage_api_key_env: String,
    pub finnhub_api_key_env: String,
}

impl ProviderSettings {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs.max(1))
    }
}

impl Default for ProviderSettings {
    fn default() -> Self {
        Self {
            timeout_secs: 10,
            alphavantage_api_key_env: "ALPHAVANTAGE_API_KEY".to_string(),
            finnhub_api_key_env: "FINNHUB_API_KEY".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let config = AppConfig::default();
        config.validate().unwrap();
        assert_eq!(config.market.refresh_interval(), Duration::from_secs(15));
        assert_eq!(config.news.ttl_minutes, 3);
        assert_eq!(config.ledger.seed_cash, dec!(10000));
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let mut config = AppConfig::default();
        config.market.refresh_interval_secs = 0;
        assert!(matches!(config.validate(), Err(DeskError::Config(_))));

        let mut config = AppConfig::default();
        config.news.ttl_minutes = 0;
        assert!(matches!(config.validate(), Err(DeskError::Config(m)) if m.contains("ttl_minutes")));

        let mut config = AppConfig::default();
        config.ledger.seed_cash = dec!(-1);
        assert!(config.validate().is_err());

        let mut config = AppConfig::default();
        config.logging.format = "xml".into();
        assert!(config.validate().is_err());

        let mut config = AppConfig::default();
        config.storage.path = " ".into();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_renders_as_toml() {
        let rendered = AppConfig::default().to_toml_string().unwrap();
        assert!(rendered.contains("refresh_interval_secs = 15"));
    }
}
