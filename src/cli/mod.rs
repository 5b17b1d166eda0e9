//! CLI definitions.

pub mod commands;
pub mod context;

use clap::{Parser, Subcommand, ValueEnum};
use rust_decimal::Decimal;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "paperdesk")]
#[command(author, version, about = "Market watchlist, paper-trading ledger and news feed")]
pub struct Cli {
    /// Configuration file path
    #[arg(short, long, default_value = "config/default.toml")]
    pub config: PathBuf,

    /// Log level (defaults to logging.level from the config file)
    #[arg(short, long)]
    pub log_level: Option<LogLevel>,

    /// Enable JSON log format
    #[arg(long)]
    pub json_logs: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Clone, Copy, ValueEnum)]
pub enum LogLevel {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
}

impl LogLevel {
    pub fn as_str(self) -> &'static str {
        match self {
            LogLevel::Trace => "trace",
            LogLevel::Debug => "debug",
            LogLevel::Info => "info",
            LogLevel::Warn => "warn",
            LogLevel::Error => "error",
        }
    }
}

#[derive(Subcommand)]
pub enum Commands {
    /// Refresh quotes on the configured interval until Ctrl-C
    Watch(WatchArgs),
    /// Refresh quotes once and print them
    Refresh,
    /// Show the last known quote for a symbol
    Quote(SymbolArgs),
    /// Manage the watchlist
    #[command(subcommand)]
    Watchlist(WatchlistCommand),
    /// Buy at the current quote
    Buy(TradeArgs),
    /// Sell at the current quote
    Sell(TradeArgs),
    /// Show cash, holdings and valuation
    Portfolio(OutputArgs),
    /// Show the trade log, newest first
    History(OutputArgs),
    /// Delete every trade and return to the seed cash
    Reset(ResetArgs),
    /// Show aggregated news
    News(NewsArgs),
    /// Validate configuration
    ValidateConfig,
}

#[derive(clap::Args)]
pub struct WatchArgs {
    /// Refresh interval in seconds (defaults to market.refresh_interval_secs)
    #[arg(short, long)]
    pub interval: Option<u64>,
}

#[derive(clap::Args)]
pub struct SymbolArgs {
    /// Ticker symbol (case-insensitive)
    pub symbol: String,
}

#[derive(Subcommand)]
pub enum WatchlistCommand {
    /// List watched symbols
    List,
    /// Validate a symbol with the quote provider and start watching it
    Add(SymbolArgs),
    /// Stop watching a symbol
    Remove(SymbolArgs),
}

#[derive(clap::Args)]
pub struct TradeArgs {
    /// Ticker symbol (case-insensitive)
    pub symbol: String,

    /// Quantity
    pub qty: Decimal,

    /// Free-form note stored with the trade
    #[arg(short, long)]
    pub note: Option<String>,
}

#[derive(clap::Args)]
pub struct OutputArgs {
    /// Output format (text, json)
    #[arg(long, default_value = "text")]
    pub output: String,
}

#[derive(clap::Args)]
pub struct ResetArgs {
    /// Confirm deleting every trade
    #[arg(short, long)]
    pub yes: bool,
}

#[derive(clap::Args)]
pub struct NewsArgs {
    /// Tickers to filter on (comma-separated); general news when omitted
    #[arg(short, long, value_delimiter = ',')]
    pub tickers: Vec<String>,

    /// Maximum number of items (defaults to news.default_limit)
    #[arg(short = 'n', long)]
    pub limit: Option<usize>,

    /// Bypass the cache
    #[arg(short, long)]
    pub force: bool,
}
