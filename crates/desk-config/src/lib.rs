//! Configuration management.

mod settings;

pub use settings::{
    AppConfig, AppSettings, LedgerSettings, LoggingConfig, MarketSettings, NewsSettings,
    ProviderSettings, StorageSettings,
};

use config::{Config, ConfigError, Environment, File};
use std::path::Path;

/// Environment variable prefix for overrides.
pub const ENV_PREFIX: &str = "PAPERDESK";

/// Load configuration from file and environment.
pub fn load_config(path: &Path) -> Result<AppConfig, ConfigError> {
    let config = Config::builder()
        .add_source(File::from(path).required(true))
        .add_source(
            Environment::with_prefix(ENV_PREFIX)
                .separator("__")
                .try_parsing(true),
        )
        .build()?;

    config.try_deserialize()
}
