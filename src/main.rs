//! Paper-trading desk CLI application.

mod cli;

use anyhow::{Context, Result};
use clap::Parser;
use cli::commands::{market, news, portfolio, trade, validate, watch, watchlist};
use cli::context::Desk;
use cli::{Cli, Commands};
use desk_config::load_config;
use desk_core::types::Side;
use desk_monitor::setup_logging;
use std::path::Path;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    if matches!(cli.command, Commands::ValidateConfig) {
        return validate::run(&cli.config).await;
    }

    let config = load_config(&cli.config)
        .with_context(|| format!("Failed to load configuration from {:?}", cli.config))?;
    config.validate()?;

    // Setup logging
    let level = cli
        .log_level
        .map(|l| l.as_str().to_string())
        .unwrap_or_else(|| config.logging.level.clone());
    let _log_guard = setup_logging(
        &level,
        cli.json_logs || config.logging.is_json(),
        config.logging.file.as_deref().map(Path::new),
    );

    let desk = Desk::open(config).await?;

    // Execute command
    match cli.command {
        Commands::Watch(args) => watch::run(args, &desk).await,
        Commands::Refresh => market::refresh(&desk).await,
        Commands::Quote(args) => market::quote(args, &desk).await,
        Commands::Watchlist(command) => watchlist::run(command, &desk).await,
        Commands::Buy(args) => trade::run(Side::Buy, args, &desk).await,
        Commands::Sell(args) => trade::run(Side::Sell, args, &desk).await,
        Commands::Portfolio(args) => portfolio::portfolio(args, &desk).await,
        Commands::History(args) => portfolio::history(args, &desk).await,
        Commands::Reset(args) => portfolio::reset(args, &desk).await,
        Commands::News(args) => news::run(args, &desk).await,
        Commands::ValidateConfig => validate::run(&cli.config).await,
    }
}
