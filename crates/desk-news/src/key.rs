//! Cache keys for news requests.

use desk_core::types::NewsQuery;
use sha2::{Digest, Sha256};

const PREFIX: &str = "news:";

/// Cache key for `query`: `news:` followed by the SHA-256 of its JSON form.
///
/// Queries are normalized on construction, so equivalent requests
/// (different ticker case or order) share a key.
pub fn cache_key(query: &NewsQuery) -> String {
    let canonical = serde_json::to_string(query).unwrap_or_default();
    let mut hasher = Sha256::new();
    hasher.update(canonical.as_bytes());
    format!("{PREFIX}{:x}", hasher.finalize())
}
