//! Test doubles shared by the adapter tests.

use async_trait::async_trait;
use serde_json::Value;
use std::sync::{Arc, Mutex};

use crate::fetcher::{FetchError, Fetcher};

/// Returns a canned payload and records the last request.
pub(crate) struct CannedFetcher {
    response: Result<Value, u16>,
    calls: Mutex<Vec<(String, Vec<(String, String)>)>>,
}

impl CannedFetcher {
    pub(crate) fn ok(body: Value) -> Arc<Self> {
        Arc::new(Self {
            response: Ok(body),
            calls: Mutex::new(Vec::new()),
        })
    }

    pub(crate) fn status(code: u16) -> Arc<Self> {
        Arc::new(Self {
            response: Err(code),
            calls: Mutex::new(Vec::new()),
        })
    }

    pub(crate) fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    pub(crate) fn last_url(&self) -> Option<String> {
        self.calls.lock().unwrap().last().map(|(url, _)| url.clone())
    }

    /// Value of `name` in the most recent request.
    pub(crate) fn param(&self, name: &str) -> Option<String> {
        let calls = self.calls.lock().unwrap();
        let (_, params) = calls.last()?;
        params.iter().find(|(k, _)| k == name).map(|(_, v)| v.clone())
    }
}

#[async_trait]
impl Fetcher for CannedFetcher {
    async fn get_json(&self, url: &str, query: &[(&str, String)]) -> Result<Value, FetchError> {
        self.calls.lock().unwrap().push((
            url.to_string(),
            query.iter().map(|(k, v)| (k.to_string(), v.clone())).collect(),
        ));
        match &self.response {
            Ok(body) => Ok(body.clone()),
            Err(status) => Err(FetchError::Status {
                status: *status,
                url: url.to_string(),
            }),
        }
    }
}
