//! Finnhub market and company news.

use async_trait::async_trait;
use chrono::{Duration, Utc};
use desk_core::error::ProviderError;
use desk_core::traits::NewsProvider;
use desk_core::types::{normalize_symbol, NewsItem, NewsQuery};
use futures::future::join_all;
use serde::Deserialize;
use std::sync::Arc;
use tracing::warn;

use crate::fetcher::Fetcher;

const GENERAL_URL: &str = "https://finnhub.io/api/v1/news";
const COMPANY_URL: &str = "https://finnhub.io/api/v1/company-news";

/// How far back company news is requested.
const COMPANY_LOOKBACK_DAYS: i64 = 7;

/// Finnhub news provider. Requires an API token; without one the provider
/// reports itself disabled.
///
/// Company news is per symbol, so a ticker query issues one request per
/// ticker. A failing ticker is logged and skipped unless every ticker fails.
pub struct FinnhubNewsProvider {
    fetcher: Arc<dyn Fetcher>,
    api_key: Option<String>,
}

impl FinnhubNewsProvider {
    pub const NAME: &'static str = "Finnhub";

    pub fn new(fetcher: Arc<dyn Fetcher>, api_key: Option<String>) -> Self {
        Self {
            fetcher,
            api_key: api_key.filter(|k| !k.trim().is_empty()),
        }
    }

    async fn fetch(&self, url: &str, params: Vec<(&str, String)>) -> Result<Vec<NewsItem>, ProviderError> {
        let raw = self
            .fetcher
            .get_json(url, &params)
            .await
            .map_err(|e| ProviderError::unavailable(Self::NAME, e.to_string()))?;

        let articles: Vec<Article> = serde_json::from_value(raw)
            .map_err(|e| ProviderError::parse(Self::NAME, e.to_string()))?;

        Ok(articles.into_iter().filter_map(Article::into_item).collect())
    }
}

#[derive(Deserialize)]
struct Article {
    headline: Option<String>,
    url: Option<String>,
    /// Unix seconds
    datetime: Option<i64>,
    summary: Option<String>,
    image: Option<String>,
    source: Option<String>,
    /// Comma-separated symbols
    related: Option<String>,
}

impl Article {
    fn into_item(self) -> Option<NewsItem> {
        let url = self.url.filter(|u| !u.is_empty())?;
        let title = self.headline.filter(|t| !t.is_empty())?;
        let published_at = self.datetime.unwrap_or(0).saturating_mul(1000);

        let mut item = NewsItem::new(url, title, published_at);
        item.summary = self.summary.filter(|s| !s.is_empty());
        item.source = self.source;
        item.image_url = self.image.filter(|s| !s.is_empty());
        item.tickers = self
            .related
            .as_deref()
            .unwrap_or_default()
            .split(',')
            .filter_map(normalize_symbol)
            .collect();
        Some(item)
    }
}

#[async_trait]
impl NewsProvider for FinnhubNewsProvider {
    async fn fetch_news(&self, query: &NewsQuery) -> Result<Vec<NewsItem>, ProviderError> {
        let token = self
            .api_key
            .as_ref()
            .ok_or_else(|| ProviderError::MissingCredential(Self::NAME.to_string()))?;

        let mut items = if query.tickers().is_empty() {
            self.fetch(
                GENERAL_URL,
                vec![("category", "general".to_string()), ("token", token.clone())],
            )
            .await?
        } else {
            let today = Utc::now().date_naive();
            let from = (today - Duration::days(COMPANY_LOOKBACK_DAYS)).to_string();
            let to = today.to_string();

            let calls = query.tickers().iter().map(|symbol| {
                self.fetch(
                    COMPANY_URL,
                    vec![
                        ("symbol", symbol.clone()),
                        ("from", from.clone()),
                        ("to", to.clone()),
                        ("token", token.clone()),
                    ],
                )
            });

            let mut merged = Vec::new();
            let mut last_error = None;
            for (symbol, result) in query.tickers().iter().zip(join_all(calls).await) {
                match result {
                    Ok(batch) => merged.extend(batch),
                    Err(e) => {
                        warn!(%symbol, error = %e, "Finnhub company news failed");
                        last_error = Some(e);
                    }
                }
            }
            match last_error {
                Some(e) if merged.is_empty() => return Err(e),
                _ => merged,
            }
        };

        if query.limit > 0 {
            items.truncate(query.limit);
        }
        Ok(items)
    }

    fn is_enabled(&self) -> bool {
        self.api_key.is_some()
    }

    fn name(&self) -> &str {
        Self::NAME
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::CannedFetcher;
    use serde_json::json;

    fn payload() -> serde_json::Value {
        json!([
            {
                "category": "company",
                "datetime": 1700000000,
                "headline": "Tesla recalls vehicles",
                "id": 1,
                "image": "",
                "related": "TSLA",
                "source": "Yahoo",
                "summary": "Details.",
                "url": "https://example.com/tsla"
            },
            {
                "datetime": 1700000100,
                "headline": "No url",
                "url": ""
            }
        ])
    }

    #[tokio::test]
    async fn test_general_news() {
        let fetcher = CannedFetcher::ok(payload());
        let provider = FinnhubNewsProvider::new(fetcher.clone(), Some("tok".into()));

        let items = provider.fetch_news(&NewsQuery::general(10)).await.unwrap();

        assert_eq!(fetcher.last_url().as_deref(), Some(GENERAL_URL));
        assert_eq!(fetcher.param("category").as_deref(), Some("general"));
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].published_at, 1_700_000_000_000);
        assert_eq!(items[0].tickers, vec!["TSLA".to_string()]);
        assert!(items[0].image_url.is_none());
    }

    #[tokio::test]
    async fn test_company_news_one_request_per_ticker() {
        let fetcher = CannedFetcher::ok(payload());
        let provider = FinnhubNewsProvider::new(fetcher.clone(), Some("tok".into()));

        let query = NewsQuery::new(Some(vec!["TSLA".into(), "F".into()]), 10);
        let items = provider.fetch_news(&query).await.unwrap();

        assert_eq!(fetcher.call_count(), 2);
        assert_eq!(fetcher.last_url().as_deref(), Some(COMPANY_URL));
        assert!(fetcher.param("from").is_some());
        // Same canned article for both tickers; dedupe happens downstream.
        assert_eq!(items.len(), 2);
    }

    #[tokio::test]
    async fn test_all_tickers_failing_is_an_error() {
        let provider = FinnhubNewsProvider::new(CannedFetcher::status(500), Some("tok".into()));
        let query = NewsQuery::new(Some(vec!["TSLA".into()]), 10);
        let result = provider.fetch_news(&query).await;
        assert!(matches!(result, Err(ProviderError::Unavailable { .. })));
    }

    #[tokio::test]
    async fn test_missing_key_disables_provider() {
        let provider = FinnhubNewsProvider::new(CannedFetcher::ok(payload()), None);
        assert!(!provider.is_enabled());
        assert!(matches!(
            provider.fetch_news(&NewsQuery::general(5)).await,
            Err(ProviderError::MissingCredential(_))
        ));
    }
}
