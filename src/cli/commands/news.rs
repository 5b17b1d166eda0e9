//! News command.

use anyhow::Result;
use chrono::{DateTime, Utc};

use crate::cli::context::Desk;
use crate::cli::NewsArgs;

pub async fn run(args: NewsArgs, desk: &Desk) -> Result<()> {
    let tickers = if args.tickers.is_empty() {
        None
    } else {
        Some(args.tickers)
    };
    let limit = args.limit.unwrap_or(desk.config.news.default_limit);

    let items = desk.news.get_news(tickers, limit, args.force).await;
    if items.is_empty() {
        println!("No news available");
        return Ok(());
    }

    for item in &items {
        let when = DateTime::<Utc>::from_timestamp_millis(item.published_at)
            .map(|t| t.format("%Y-%m-%d %H:%M").to_string())
            .unwrap_or_default();
        let source = item.source.as_deref().unwrap_or("unknown");
        println!("{when}  [{source}] {}", item.title);
        if !item.tickers.is_empty() {
            println!("    {}", item.tickers.join(", "));
        }
        println!("    {}", item.url);
    }
    Ok(())
}
