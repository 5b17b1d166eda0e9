//! Validate configuration command.

use anyhow::Result;
use desk_config::load_config;
use std::path::Path;

pub async fn run(config_path: &Path) -> Result<()> {
    println!("Validating configuration: {:?}", config_path);

    let config = match load_config(config_path) {
        Ok(config) => config,
        Err(e) => {
            println!("Configuration error: {}", e);
            return Err(e.into());
        }
    };

    if let Err(e) = config.validate() {
        println!("Configuration error: {}", e);
        return Err(e.into());
    }

    println!("Configuration is valid!");
    println!();
    println!("App: {}", config.app.name);
    println!("Environment: {}", config.app.environment);
    println!("Log level: {}", config.logging.level);
    println!("Store: {}", config.storage.path);
    println!("Refresh interval: {}s", config.market.refresh_interval_secs);
    println!("Default watchlist: {}", config.market.default_watchlist.join(", "));
    println!("Seed cash: {}", config.ledger.seed_cash);
    println!("News cache TTL: {} min", config.news.ttl_minutes);

    for (provider, var) in [
        ("Alpha Vantage", &config.providers.alphavantage_api_key_env),
        ("Finnhub", &config.providers.finnhub_api_key_env),
    ] {
        let state = match std::env::var(var) {
            Ok(v) if !v.trim().is_empty() => "enabled",
            _ => "disabled (key not set)",
        };
        println!("{provider} news ({var}): {state}");
    }

    println!();
    println!("Effective configuration:");
    println!("{}", config.to_toml_string()?);

    Ok(())
}
