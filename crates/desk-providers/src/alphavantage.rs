//! Alpha Vantage news and sentiment feed.

use async_trait::async_trait;
use chrono::NaiveDateTime;
use desk_core::error::ProviderError;
use desk_core::traits::NewsProvider;
use desk_core::types::{normalize_symbol, NewsItem, NewsQuery};
use serde::Deserialize;
use std::sync::Arc;

use crate::fetcher::Fetcher;

const BASE_URL: &str = "https://www.alphavantage.co/query";

/// Alpha Vantage `NEWS_SENTIMENT` provider.
///
/// - **Requires**: API key. Without one the provider reports itself
///   disabled and is skipped.
/// - **Free tier**: 25 requests/day; throttled answers come back as a
///   200 with an `Information` or `Note` field and are reported as
///   unavailable.
pub struct AlphaVantageNewsProvider {
    fetcher: Arc<dyn Fetcher>,
    api_key: Option<String>,
}

impl AlphaVantageNewsProvider {
    pub const NAME: &'static str = "Alpha Vantage";

    pub fn new(fetcher: Arc<dyn Fetcher>, api_key: Option<String>) -> Self {
        Self {
            fetcher,
            api_key: api_key.filter(|k| !k.trim().is_empty()),
        }
    }
}

// ── Alpha Vantage API response types ────────────────────────────────

#[derive(Deserialize)]
struct NewsResponse {
    feed: Option<Vec<Article>>,
    #[serde(rename = "Information")]
    information: Option<String>,
    #[serde(rename = "Note")]
    note: Option<String>,
}

#[derive(Deserialize)]
struct Article {
    title: Option<String>,
    url: Option<String>,
    /// `YYYYMMDDTHHMMSS`, UTC
    time_published: Option<String>,
    summary: Option<String>,
    banner_image: Option<String>,
    source: Option<String>,
    #[serde(default)]
    ticker_sentiment: Vec<TickerSentiment>,
}

#[derive(Deserialize)]
struct TickerSentiment {
    ticker: String,
}

impl Article {
    fn into_item(self) -> Option<NewsItem> {
        let url = self.url.filter(|u| !u.is_empty())?;
        let title = self.title.filter(|t| !t.is_empty())?;
        let published_at = self
            .time_published
            .as_deref()
            .and_then(parse_time_published)
            .unwrap_or(0);

        let mut item = NewsItem::new(url, title, published_at);
        item.summary = self.summary.filter(|s| !s.is_empty());
        item.source = self.source;
        item.image_url = self.banner_image.filter(|s| !s.is_empty());
        item.tickers = self
            .ticker_sentiment
            .iter()
            .filter_map(|t| normalize_symbol(&t.ticker))
            .collect();
        Some(item)
    }
}

fn parse_time_published(raw: &str) -> Option<i64> {
    NaiveDateTime::parse_from_str(raw, "%Y%m%dT%H%M%S")
        .ok()
        .map(|dt| dt.and_utc().timestamp_millis())
}

#[async_trait]
impl NewsProvider for AlphaVantageNewsProvider {
    async fn fetch_news(&self, query: &NewsQuery) -> Result<Vec<NewsItem>, ProviderError> {
        let api_key = self
            .api_key
            .as_ref()
            .ok_or_else(|| ProviderError::MissingCredential(Self::NAME.to_string()))?;

        let mut params = vec![
            ("function", "NEWS_SENTIMENT".to_string()),
            ("sort", "LATEST".to_string()),
            ("limit", query.limit.max(1).to_string()),
            ("apikey", api_key.clone()),
        ];
        if !query.tickers().is_empty() {
            params.push(("tickers", query.tickers().join(",")));
        }

        let raw = self
            .fetcher
            .get_json(BASE_URL, &params)
            .await
            .map_err(|e| ProviderError::unavailable(Self::NAME, e.to_string()))?;

        let response: NewsResponse = serde_json::from_value(raw)
            .map_err(|e| ProviderError::parse(Self::NAME, e.to_string()))?;

        if let Some(message) = response.information.or(response.note) {
            return Err(ProviderError::unavailable(Self::NAME, message));
        }

        Ok(response
            .feed
            .unwrap_or_default()
            .into_iter()
            .filter_map(Article::into_item)
            .collect())
    }

    fn is_enabled(&self) -> bool {
        self.api_key.is_some()
    }

    fn name(&self) -> &str {
        Self::NAME
    }
}
