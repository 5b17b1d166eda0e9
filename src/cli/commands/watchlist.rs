//! Watchlist commands.

use anyhow::{bail, Result};
use desk_core::error::ProviderError;
use tracing::warn;

use crate::cli::context::Desk;
use crate::cli::WatchlistCommand;

pub async fn run(command: WatchlistCommand, desk: &Desk) -> Result<()> {
    match command {
        WatchlistCommand::List => {
            let symbols = desk.watchlist.symbols();
            if symbols.is_empty() {
                println!("Watchlist is empty");
            }
            for symbol in symbols {
                match desk.market.get_quote(&symbol) {
                    Some(quote) => println!("{:<8} {:>12.2}  {}", symbol, quote.price, quote.display_name),
                    None => println!("{symbol:<8} {:>12}", "-"),
                }
            }
        }
        WatchlistCommand::Add(args) => {
            if desk.watchlist.has_symbol(&args.symbol) {
                println!("{} is already watched", args.symbol.trim().to_uppercase());
                return Ok(());
            }
            match desk.market.add_to_watchlist(&args.symbol).await {
                Ok(quote) => println!(
                    "Watching {} ({}) at {:.2}",
                    quote.symbol, quote.display_name, quote.price
                ),
                Err(ProviderError::TickerNotFound(symbol)) => {
                    bail!("Ticker not found: {symbol}")
                }
                Err(e) => return Err(e.into()),
            }
        }
        WatchlistCommand::Remove(args) => {
            match desk.market.remove_from_watchlist(&args.symbol).await {
                Ok(true) => println!("Removed {}", args.symbol.trim().to_uppercase()),
                Ok(false) => println!("{} was not watched", args.symbol.trim().to_uppercase()),
                Err(e) => {
                    warn!(error = %e, "Watchlist change not persisted");
                    println!("Removed {} (not saved: {e})", args.symbol.trim().to_uppercase());
                }
            }
        }
    }
    Ok(())
}
