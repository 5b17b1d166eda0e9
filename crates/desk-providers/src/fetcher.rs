//! Raw JSON transport.

use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;
use std::time::Duration;
use thiserror::Error;
use tracing::debug;

const USER_AGENT: &str = concat!("paperdesk/", env!("CARGO_PKG_VERSION"));

/// Transport failures. Messages never include query strings, which may
/// carry credentials.
#[derive(Error, Debug)]
pub enum FetchError {
    #[error("request failed: {0}")]
    Transport(String),

    #[error("HTTP {status} from {url}")]
    Status { status: u16, url: String },

    #[error("invalid JSON from {url}: {message}")]
    Decode { url: String, message: String },
}

/// Black-box fetch primitive: GET `url` with `query` and return the decoded
/// JSON body.
#[async_trait]
pub trait Fetcher: Send + Sync {
    async fn get_json(&self, url: &str, query: &[(&str, String)]) -> Result<Value, FetchError>;
}

/// [`Fetcher`] over a shared `reqwest` client.
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    /// Build a client with `timeout` and the paperdesk user agent.
    pub fn new(timeout: Duration) -> Result<Self, FetchError> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(USER_AGENT)
            .build()
            .map_err(|e| FetchError::Transport(redact(&e.to_string())))?;
        Ok(Self { client })
    }
}

#[async_trait]
impl Fetcher for HttpFetcher {
    async fn get_json(&self, url: &str, query: &[(&str, String)]) -> Result<Value, FetchError> {
        debug!(url, params = query.len(), "GET");

        let resp = self
            .client
            .get(url)
            .query(query)
            .send()
            .await
            .map_err(|e| FetchError::Transport(redact(&e.without_url().to_string())))?;

        let status = resp.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                status: status.as_u16(),
                url: redact(url),
            });
        }

        resp.json().await.map_err(|e| FetchError::Decode {
            url: redact(url),
            message: redact(&e.without_url().to_string()),
        })
    }
}

/// Strip anything after the first `?`.
fn redact(text: &str) -> String {
    match text.find('?') {
        Some(idx) => format!("{}?<query redacted>", &text[..idx]),
        None => text.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_redact_strips_query() {
        assert_eq!(
            redact("https://example.com/query?apikey=secret&symbol=AAPL"),
            "https://example.com/query?<query redacted>"
        );
        assert_eq!(redact("https://example.com/x"), "https://example.com/x");
    }

    #[test]
    fn test_client_builds_with_timeout() {
        let fetcher = HttpFetcher::new(Duration::from_secs(3));
        assert!(fetcher.is_ok());
    }

    #[test]
    fn test_status_error_hides_credentials() {
        let err = FetchError::Status {
            status: 401,
            url: redact("https://finnhub.io/api/v1/news?token=abc"),
        };
        assert!(!err.to_string().contains("abc"));
        assert!(err.to_string().contains("401"));
    }
}
