//! Buy and sell commands.

use anyhow::{bail, Result};
use desk_core::error::TradeError;
use desk_core::types::{MarketStatus, Side};
use tracing::warn;

use crate::cli::context::Desk;
use crate::cli::TradeArgs;

pub async fn run(side: Side, args: TradeArgs, desk: &Desk) -> Result<()> {
    // Trade at a fresh price when the feed allows it.
    let status = desk.market.refresh().await;
    if status != MarketStatus::Live {
        warn!(%status, "Trading against the last known quotes");
    }

    match desk
        .ledger
        .execute_trade(&args.symbol, side, args.qty, args.note)
        .await
    {
        Ok(confirmation) => {
            println!("{}", confirmation.message);
            let portfolio = desk.ledger.get_portfolio().await?;
            println!("Cash: {:.2}", portfolio.cash);
            Ok(())
        }
        Err(TradeError::ProviderUnavailable(symbol)) => {
            bail!("No usable quote for {symbol}. Add it with `watchlist add {symbol}` first.")
        }
        Err(e) => Err(e.into()),
    }
}
