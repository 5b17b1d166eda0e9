//! Portfolio, history and reset commands.

use anyhow::{bail, Result};
use chrono::{DateTime, Utc};

use crate::cli::context::Desk;
use crate::cli::{OutputArgs, ResetArgs};

pub async fn portfolio(args: OutputArgs, desk: &Desk) -> Result<()> {
    let valuation = desk.ledger.valuation().await?;

    if args.output == "json" {
        println!("{}", serde_json::to_string_pretty(&valuation)?);
        return Ok(());
    }

    println!("Cash:         {:>14.2}", valuation.cash);
    println!("Market value: {:>14.2}", valuation.market_value);
    println!("Equity:       {:>14.2}", valuation.equity);
    println!("Unrealized:   {:>+14.2}", valuation.unrealized_pnl());

    if valuation.positions.is_empty() {
        println!();
        println!("No open positions");
        return Ok(());
    }

    println!();
    println!(
        "{:<8} {:>12} {:>12} {:>12} {:>14} {:>12}",
        "Symbol", "Qty", "Avg", "Mark", "Value", "P&L"
    );
    for position in &valuation.positions {
        let mark = if position.quoted {
            format!("{:.2}", position.mark_price)
        } else {
            format!("{:.2}*", position.mark_price)
        };
        println!(
            "{:<8} {:>12} {:>12.2} {:>12} {:>14.2} {:>+12.2}",
            position.symbol,
            position.qty.normalize(),
            position.avg_price,
            mark,
            position.market_value,
            position.unrealized_pnl,
        );
    }
    if valuation.positions.iter().any(|p| !p.quoted) {
        println!("* no quote cached, carried at cost");
    }
    Ok(())
}

pub async fn history(args: OutputArgs, desk: &Desk) -> Result<()> {
    let trades = desk.ledger.history().await?;

    if args.output == "json" {
        println!("{}", serde_json::to_string_pretty(&trades)?);
        return Ok(());
    }

    if trades.is_empty() {
        println!("No trades recorded");
        return Ok(());
    }

    for trade in &trades {
        let when = DateTime::<Utc>::from_timestamp_millis(trade.timestamp)
            .map(|t| t.format("%Y-%m-%d %H:%M:%S").to_string())
            .unwrap_or_else(|| trade.timestamp.to_string());
        println!(
            "{}  {:<4} {:>10} {:<8} @ {:>10.2}  {:>12.2}{}",
            when,
            trade.side.to_string(),
            trade.qty.normalize(),
            trade.symbol,
            trade.price,
            trade.cost(),
            trade
                .note
                .as_deref()
                .map(|n| format!("  {n}"))
                .unwrap_or_default(),
        );
    }
    println!("{} trade(s)", trades.len());
    Ok(())
}

pub async fn reset(args: ResetArgs, desk: &Desk) -> Result<()> {
    if !args.yes {
        bail!("Reset deletes every trade. Re-run with --yes to confirm.");
    }

    let count = desk.ledger.trade_count().await?;
    desk.ledger.reset_account().await?;
    println!(
        "Deleted {count} trade(s). Cash is back to {:.2}",
        desk.ledger.seed_cash()
    );
    Ok(())
}
