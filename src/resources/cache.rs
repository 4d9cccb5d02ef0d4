use std::time::Duration;

use bytes::Bytes;
use moka::future::Cache;

use crate::middleware::HttpMethod;

const MAX_ENTRIES: u64 = 10_000;

/// Rendered response bodies of one resource, expiring after a fixed TTL.
#[derive(Clone)]
pub struct ResponseCache {
    inner: Cache<String, Bytes>,
    ttl: Duration,
}

impl ResponseCache {
    pub fn new(ttl: Duration) -> Self {
        Self {
            inner: Cache::builder()
                .max_capacity(MAX_ENTRIES)
                .time_to_live(ttl)
                .build(),
            ttl,
        }
    }

    /// Key for one view of a resource; parameter order does not matter.
    ///
    /// Pairs are percent-encoded so a value holding `&` or `=` cannot read
    /// as extra parameters.
    pub fn key(resource: &str, view: &str, method: HttpMethod, params: &[(String, String)]) -> String {
        let mut params = params.to_vec();
        params.sort();
        let query = serde_urlencoded::to_string(&params).unwrap_or_else(|_| format!("{params:?}"));
        format!("{resource}:{view}:{method}:{query}")
    }

    pub async fn get(&self, key: &str) -> Option<Bytes> {
        self.inner.get(key).await
    }

    pub async fn insert(&self, key: String, body: Bytes) {
        self.inner.insert(key, body).await;
    }

    /// `Cache-Control` value for responses served under this cache.
    pub fn cache_control(&self) -> String {
        let secs = self.ttl.as_secs();
        format!("max-age={secs}, s-maxage={secs}")
    }
}
