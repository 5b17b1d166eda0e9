//! News types.

use serde::{Deserialize, Serialize};

use super::normalize_symbol;

/// A normalized news article. `id` is the source URL and doubles as the
/// dedupe key.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewsItem {
    pub id: String,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    pub url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
    /// Publication time (Unix milliseconds)
    pub published_at: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    #[serde(default)]
    pub tickers: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ai_summary: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ai_watch_next: Option<String>,
}

impl NewsItem {
    /// Create an item keyed by its URL.
    pub fn new(url: impl Into<String>, title: impl Into<String>, published_at: i64) -> Self {
        let url = url.into();
        Self {
            id: url.clone(),
            title: title.into(),
            summary: None,
            url,
            source: None,
            published_at,
            image_url: None,
            tickers: Vec::new(),
            ai_summary: None,
            ai_watch_next: None,
        }
    }
}

/// A news request. Construct through [`NewsQuery::new`] so tickers are
/// normalized, sorted and deduplicated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewsQuery {
    pub tickers: Option<Vec<String>>,
    pub limit: usize,
}

impl NewsQuery {
    pub fn new(tickers: Option<Vec<String>>, limit: usize) -> Self {
        let tickers = tickers
            .map(|list| {
                let mut list: Vec<String> =
                    list.iter().filter_map(|t| normalize_symbol(t)).collect();
                list.sort();
                list.dedup();
                list
            })
            .filter(|list| !list.is_empty());
        Self { tickers, limit }
    }

    /// General market news, no ticker filter.
    pub fn general(limit: usize) -> Self {
        Self::new(None, limit)
    }

    pub fn tickers(&self) -> &[String] {
        self.tickers.as_deref().unwrap_or(&[])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_news_query_normalizes_tickers() {
        let query = NewsQuery::new(
            Some(vec!["msft".into(), " AAPL".into(), "MSFT".into()]),
            10,
        );
        assert_eq!(query.tickers(), &["AAPL".to_string(), "MSFT".to_string()]);
    }

    #[test]
    fn test_news_query_empty_tickers_is_general() {
        let query = NewsQuery::new(Some(vec!["  ".into()]), 5);
        assert_eq!(query, NewsQuery::general(5));
    }

    #[test]
    fn test_news_item_id_is_url() {
        let item = NewsItem::new("https://example.com/a", "Headline", 42);
        assert_eq!(item.id, item.url);
    }
}
