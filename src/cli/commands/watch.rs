//! Continuous quote refresh.

use anyhow::{Context, Result};
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

use crate::cli::commands::market::print_quotes;
use crate::cli::context::Desk;
use crate::cli::WatchArgs;

pub async fn run(args: WatchArgs, desk: &Desk) -> Result<()> {
    let period = args
        .interval
        .map(Duration::from_secs)
        .unwrap_or_else(|| desk.config.market.refresh_interval());

    let market = Arc::downgrade(&desk.market);
    let subscription = desk.market.subscribe(move || {
        if let Some(market) = market.upgrade() {
            print_quotes(&market);
        }
    });

    info!(symbols = ?desk.watchlist.symbols(), "Watching quotes, press Ctrl-C to stop");
    let refresh = desk.market.spawn_refresh_loop(period);

    tokio::signal::ctrl_c()
        .await
        .context("Failed to listen for Ctrl-C")?;

    refresh.stop();
    subscription.unsubscribe();
    info!("Stopped watching");
    Ok(())
}
