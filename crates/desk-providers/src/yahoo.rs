//! Yahoo Finance adapters. No API key required.

use async_trait::async_trait;
use desk_core::error::ProviderError;
use desk_core::traits::{NewsProvider, QuoteProvider};
use desk_core::types::{normalize_symbol, NewsItem, NewsQuery, Quote};
use serde::Deserialize;
use std::sync::Arc;
use tracing::debug;

use crate::fetcher::Fetcher;
use crate::to_decimal;

const QUOTE_URL: &str = "https://query1.finance.yahoo.com/v7/finance/quote";
const SEARCH_URL: &str = "https://query2.finance.yahoo.com/v1/finance/search";
const GENERAL_QUERY: &str = "stock market";

// ── Yahoo response types ────────────────────────────────────────────

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct QuoteEnvelope {
    quote_response: QuoteResponse,
}

#[derive(Deserialize)]
struct QuoteResponse {
    #[serde(default)]
    result: Vec<YahooQuote>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct YahooQuote {
    symbol: String,
    short_name: Option<String>,
    long_name: Option<String>,
    regular_market_price: Option<f64>,
    regular_market_change_percent: Option<f64>,
    currency: Option<String>,
    sector: Option<String>,
}

impl YahooQuote {
    /// `None` when the row has no usable price.
    fn into_quote(self) -> Option<Quote> {
        let symbol = normalize_symbol(&self.symbol)?;
        let price = self.regular_market_price.and_then(to_decimal)?;
        let change = self
            .regular_market_change_percent
            .and_then(to_decimal)
            .unwrap_or_default();
        let name = self
            .long_name
            .or(self.short_name)
            .unwrap_or_else(|| symbol.clone());

        let mut quote = Quote::new(symbol, name, price, change);
        quote.currency = self.currency;
        quote.sector = self.sector;
        Some(quote)
    }
}

#[derive(Deserialize)]
struct SearchResponse {
    #[serde(default)]
    news: Vec<YahooArticle>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct YahooArticle {
    title: Option<String>,
    link: Option<String>,
    publisher: Option<String>,
    /// Unix seconds
    provider_publish_time: Option<i64>,
    thumbnail: Option<Thumbnail>,
    #[serde(default)]
    related_tickers: Vec<String>,
}

#[derive(Deserialize)]
struct Thumbnail {
    #[serde(default)]
    resolutions: Vec<Resolution>,
}

#[derive(Deserialize)]
struct Resolution {
    url: String,
}

impl YahooArticle {
    fn into_item(self) -> Option<NewsItem> {
        let url = self.link.filter(|u| !u.is_empty())?;
        let title = self.title.filter(|t| !t.is_empty())?;
        let published_at = self.provider_publish_time.unwrap_or(0).saturating_mul(1000);
        let mut item = NewsItem::new(url, title, published_at);
        item.source = self.publisher;
        item.image_url = self
            .thumbnail
            .and_then(|t| t.resolutions.into_iter().next())
            .map(|r| r.url);
        item.tickers = self
            .related_tickers
            .iter()
            .filter_map(|t| normalize_symbol(t))
            .collect();
        Some(item)
    }
}

// ── Quotes ──────────────────────────────────────────────────────────

/// Batched quotes from the Yahoo v7 quote endpoint.
pub struct YahooQuoteProvider {
    fetcher: Arc<dyn Fetcher>,
}

impl YahooQuoteProvider {
    pub const NAME: &'static str = "Yahoo Finance";

    pub fn new(fetcher: Arc<dyn Fetcher>) -> Self {
        Self { fetcher }
    }
}

#[async_trait]
impl QuoteProvider for YahooQuoteProvider {
    async fn fetch_quotes(&self, symbols: &[String]) -> Result<Vec<Quote>, ProviderError> {
        if symbols.is_empty() {
            return Ok(Vec::new());
        }

        let raw = self
            .fetcher
            .get_json(QUOTE_URL, &[("symbols", symbols.join(","))])
            .await
            .map_err(|e| ProviderError::unavailable(Self::NAME, e.to_string()))?;

        let envelope: QuoteEnvelope = serde_json::from_value(raw)
            .map_err(|e| ProviderError::parse(Self::NAME, e.to_string()))?;

        let quotes: Vec<Quote> = envelope
            .quote_response
            .result
            .into_iter()
            .filter_map(YahooQuote::into_quote)
            .collect();

        debug!(requested = symbols.len(), received = quotes.len(), "Yahoo quotes");
        Ok(quotes)
    }

    fn name(&self) -> &str {
        Self::NAME
    }
}

// ── News ────────────────────────────────────────────────────────────

/// Headlines from the Yahoo search endpoint.
pub struct YahooNewsProvider {
    fetcher: Arc<dyn Fetcher>,
}

impl YahooNewsProvider {
    pub const NAME: &'static str = "Yahoo Finance News";

    pub fn new(fetcher: Arc<dyn Fetcher>) -> Self {
        Self { fetcher }
    }
}

#[async_trait]
impl NewsProvider for YahooNewsProvider {
    async fn fetch_news(&self, query: &NewsQuery) -> Result<Vec<NewsItem>, ProviderError> {
        let search = if query.tickers().is_empty() {
            GENERAL_QUERY.to_string()
        } else {
            query.tickers().join(" ")
        };

        let raw = self
            .fetcher
            .get_json(
                SEARCH_URL,
                &[
                    ("q", search),
                    ("newsCount", query.limit.max(1).to_string()),
                    ("quotesCount", "0".to_string()),
                ],
            )
            .await
            .map_err(|e| ProviderError::unavailable(Self::NAME, e.to_string()))?;

        let response: SearchResponse = serde_json::from_value(raw)
            .map_err(|e| ProviderError::parse(Self::NAME, e.to_string()))?;

        Ok(response
            .news
            .into_iter()
            .filter_map(YahooArticle::into_item)
            .collect())
    }

    fn name(&self) -> &str {
        Self::NAME
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::CannedFetcher;
    use rust_decimal_macros::dec;
    use serde_json::json;

    #[tokio::test]
    async fn test_quotes_are_normalized() {
        let fetcher = CannedFetcher::ok(json!({
            "quoteResponse": {
                "result": [
                    {
                        "symbol": "AAPL",
                        "shortName": "Apple",
                        "longName": "Apple Inc.",
                        "regularMarketPrice": 189.25,
                        "regularMarketChangePercent": -0.42,
                        "currency": "USD"
                    },
                    { "symbol": "NOPE", "shortName": "No price" }
                ],
                "error": null
            }
        }));
        let provider = YahooQuoteProvider::new(fetcher.clone());

        let quotes = provider
            .fetch_quotes(&["AAPL".to_string(), "NOPE".to_string()])
            .await
            .unwrap();

        assert_eq!(fetcher.param("symbols").as_deref(), Some("AAPL,NOPE"));
        assert_eq!(quotes.len(), 1);
        assert_eq!(quotes[0].display_name, "Apple Inc.");
        assert_eq!(quotes[0].price, dec!(189.25));
        assert_eq!(quotes[0].change_percent, dec!(-0.42));
        assert_eq!(quotes[0].currency.as_deref(), Some("USD"));
    }

    #[tokio::test]
    async fn test_empty_result_is_not_an_error() {
        let fetcher = CannedFetcher::ok(json!({ "quoteResponse": { "result": [] } }));
        let provider = YahooQuoteProvider::new(fetcher);
        let quotes = provider.fetch_quotes(&["ZZZZ".to_string()]).await.unwrap();
        assert!(quotes.is_empty());
    }

    #[tokio::test]
    async fn test_transport_failure_is_unavailable() {
        let provider = YahooQuoteProvider::new(CannedFetcher::status(429));
        let result = provider.fetch_quotes(&["AAPL".to_string()]).await;
        assert!(matches!(result, Err(ProviderError::Unavailable { .. })));
    }

    #[tokio::test]
    async fn test_unexpected_shape_is_parse_error() {
        let provider = YahooQuoteProvider::new(CannedFetcher::ok(json!({ "finance": null })));
        let result = provider.fetch_quotes(&["AAPL".to_string()]).await;
        assert!(matches!(result, Err(ProviderError::Parse { .. })));
    }

    #[tokio::test]
    async fn test_news_items_are_normalized() {
        let fetcher = CannedFetcher::ok(json!({
            "news": [
                {
                    "uuid": "1",
                    "title": "Apple beats estimates",
                    "publisher": "Reuters",
                    "link": "https://example.com/apple",
                    "providerPublishTime": 1700000000,
                    "thumbnail": { "resolutions": [ { "url": "https://img/1.jpg", "width": 140 } ] },
                    "relatedTickers": ["aapl"]
                },
                { "uuid": "2", "title": "No link" },
                { "uuid": "3", "link": "https://example.com/untitled" }
            ]
        }));
        let provider = YahooNewsProvider::new(fetcher.clone());

        let items = provider
            .fetch_news(&NewsQuery::new(Some(vec!["AAPL".into()]), 5))
            .await
            .unwrap();

        assert_eq!(fetcher.param("q").as_deref(), Some("AAPL"));
        assert_eq!(fetcher.param("newsCount").as_deref(), Some("5"));
        assert_eq!(items.len(), 1);
        let item = &items[0];
        assert_eq!(item.id, "https://example.com/apple");
        assert_eq!(item.published_at, 1_700_000_000_000);
        assert_eq!(item.source.as_deref(), Some("Reuters"));
        assert_eq!(item.image_url.as_deref(), Some("https://img/1.jpg"));
        assert_eq!(item.tickers, vec!["AAPL".to_string()]);
    }

    #[tokio::test]
    async fn test_general_news_query() {
        let fetcher = CannedFetcher::ok(json!({ "news": [] }));
        let provider = YahooNewsProvider::new(fetcher.clone());
        provider.fetch_news(&NewsQuery::general(10)).await.unwrap();
        assert_eq!(fetcher.param("q").as_deref(), Some(GENERAL_QUERY));
    }
}
