//! Read-through query cache.
//!
//! Entries are keyed by a segmented [`QueryKey`] such as `orders/42` and
//! hold the JSON form of the last successful read. Mutations never patch an
//! entry; they invalidate a key prefix so the next read goes to the server.

use crate::api::ApiError;
use crate::observability::api_metrics;
use moka::future::Cache;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fmt;
use std::future::Future;
use std::time::Duration;
use tracing::debug;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct QueryKey(Vec<String>);

impl QueryKey {
    pub fn new<I, S>(segments: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self(segments.into_iter().map(Into::into).collect())
    }

    pub fn starts_with(&self, prefix: &QueryKey) -> bool {
        self.0.starts_with(&prefix.0)
    }

    pub fn orders() -> Self {
        Self::new(["orders"])
    }

    /// Every order list query lives under `orders/list`, apart from details.
    pub fn order_lists() -> Self {
        Self::new(["orders", "list"])
    }

    pub fn order_list(segment: &str) -> Self {
        Self::new(["orders", "list", segment])
    }

    pub fn order(id: &str) -> Self {
        Self::new(["orders", id])
    }

    pub fn beans() -> Self {
        Self::new(["beans"])
    }

    pub fn bean(id: u64) -> Self {
        Self::new(["beans".to_string(), id.to_string()])
    }

    pub fn forms() -> Self {
        Self::new(["forms"])
    }

    pub fn form(id: u64) -> Self {
        Self::new(["forms".to_string(), id.to_string()])
    }

    pub fn products() -> Self {
        Self::new(["products"])
    }

    pub fn product_list(segment: &str) -> Self {
        Self::new(["products", "list", segment])
    }

    pub fn product(id: u64) -> Self {
        Self::new(["products".to_string(), id.to_string()])
    }

    pub fn profile() -> Self {
        Self::new(["profile"])
    }
}

impl fmt::Display for QueryKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0.join("/"))
    }
}

#[derive(Debug, Clone)]
pub struct QueryCache {
    entries: Cache<QueryKey, serde_json::Value>,
}

impl QueryCache {
    pub fn new(max_capacity: u64, ttl: Duration) -> Self {
        let entries = Cache::builder()
            .max_capacity(max_capacity)
            .time_to_live(ttl)
            .build();

        Self { entries }
    }

    pub async fn get<T: DeserializeOwned>(&self, key: &QueryKey) -> Option<T> {
        let cached = self.entries.get(key).await?;
        match serde_json::from_value(cached) {
            Ok(value) => Some(value),
            Err(e) => {
                // Shape changed under us; treat as a miss and drop the entry.
                debug!(key = %key, error = %e, "Discarding undecodable cache entry");
                self.entries.invalidate(key).await;
                None
            }
        }
    }

    pub async fn insert<T: Serialize>(&self, key: QueryKey, value: &T) {
        match serde_json::to_value(value) {
            Ok(json) => {
                debug!(key = %key, "Caching query result");
                self.entries.insert(key, json).await;
            }
            Err(e) => debug!(key = %key, error = %e, "Query result not cacheable"),
        }
    }

    /// Serve `key` from cache, or run `fetch` and remember its result.
    /// Failed fetches are never cached.
    pub async fn fetch<T, F, Fut>(&self, key: QueryKey, fetch: F) -> Result<T, ApiError>
    where
        T: Serialize + DeserializeOwned,
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, ApiError>>,
    {
        if let Some(value) = self.get(&key).await {
            debug!(key = %key, "Cache hit");
            api_metrics().record_cache_hit();
            return Ok(value);
        }

        api_metrics().record_cache_miss();
        let value = fetch().await?;
        self.insert(key, &value).await;
        Ok(value)
    }

    /// Drop every entry whose key starts with `prefix`. Returns how many
    /// entries were removed.
    pub async fn invalidate(&self, prefix: &QueryKey) -> usize {
        let stale: Vec<QueryKey> = self
            .entries
            .iter()
            .filter(|(key, _)| key.starts_with(prefix))
            .map(|(key, _)| key.as_ref().clone())
            .collect();

        for key in &stale {
            self.entries.invalidate(key).await;
        }

        api_metrics().record_invalidation();
        debug!(prefix = %prefix, removed = stale.len(), "Invalidated cache entries");
        stale.len()
    }

    pub fn clear(&self) {
        self.entries.invalidate_all();
    }
}
