//! Quote commands.

use anyhow::{bail, Result};
use desk_core::types::{MarketStatus, Quote};
use desk_market::MarketDataCache;

use crate::cli::context::Desk;
use crate::cli::SymbolArgs;

/// Refresh once and print the watchlist quotes.
pub async fn refresh(desk: &Desk) -> Result<()> {
    let status = desk.market.refresh().await;
    print_quotes(&desk.market);

    if status != MarketStatus::Live {
        bail!("Quote refresh finished with status {status}");
    }
    Ok(())
}

/// Print the last known quote for one symbol.
pub async fn quote(args: SymbolArgs, desk: &Desk) -> Result<()> {
    match desk.market.get_quote(&args.symbol) {
        Some(quote) => {
            println!("{}", format_quote(&quote));
            if let Some(sector) = &quote.sector {
                println!("  Sector: {sector}");
            }
            Ok(())
        }
        None => bail!(
            "No quote for {}. Add it with `watchlist add` or run `refresh`.",
            args.symbol.trim().to_uppercase()
        ),
    }
}

/// Status line plus one row per watched symbol with a quote.
pub fn print_quotes(market: &MarketDataCache) {
    let updated = market
        .last_refreshed()
        .map(|t| t.format("%H:%M:%S UTC").to_string())
        .unwrap_or_else(|| "never".to_string());
    println!("Market: {} (updated {})", market.status(), updated);

    let quotes = market.quotes();
    if quotes.is_empty() {
        println!("  No quotes yet");
        return;
    }
    for quote in &quotes {
        println!("  {}", format_quote(quote));
    }
}

fn format_quote(quote: &Quote) -> String {
    format!(
        "{:<8} {:>12.2} {:>+8.2}%  {}{}",
        quote.symbol,
        quote.price,
        quote.change_percent,
        quote.display_name,
        quote
            .currency
            .as_deref()
            .map(|c| format!(" ({c})"))
            .unwrap_or_default(),
    )
}
