//! response cache
//!
//! the keyed store consulted by cached calls, and a bounded in-memory
//! implementation.

use crate::error::Result;
use crate::response::HttpResponse;
use async_trait::async_trait;
use reqwest::header::CACHE_CONTROL;
use std::collections::HashMap;
use std::time::{Duration, Instant};
use tokio::sync::RwLock;

/// keyed store of response snapshots
///
/// expiry is the store's business; the client only encodes the ttl into the
/// snapshot's cache-control header.
#[async_trait]
pub trait ResponseCache: Send + Sync {
    /// fetch the snapshot stored under `key`
    async fn lookup(&self, key: &str) -> Result<Option<HttpResponse>>;
    /// store a snapshot under `key`, replacing any previous one
    async fn put(&self, key: &str, response: HttpResponse) -> Result<()>;
}

struct CacheEntry {
    response: HttpResponse,
    expires_at: Option<Instant>,
    last_accessed: Instant,
}

impl CacheEntry {
    fn is_expired(&self, now: Instant) -> bool {
        self.expires_at.is_some_and(|at| now >= at)
    }
}

/// in-memory cache with lru eviction
///
/// entries expire after the `max-age` of the last cache-control directive on
/// the stored snapshot; snapshots without one never expire.
pub struct MemoryCache {
    entries: RwLock<HashMap<String, CacheEntry>>,
    max_entries: usize,
}

impl MemoryCache {
    /// create a cache holding at most `max_entries` snapshots
    pub fn new(max_entries: usize) -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
            max_entries: max_entries.max(1),
        }
    }

    /// number of live entries
    pub async fn len(&self) -> usize {
        let now = Instant::now();
        self.entries
            .read()
            .await
            .values()
            .filter(|entry| !entry.is_expired(now))
            .count()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    /// drop the entry under `key`
    pub async fn remove(&self, key: &str) -> bool {
        self.entries.write().await.remove(key).is_some()
    }

    pub async fn clear(&self) {
        self.entries.write().await.clear();
    }

    fn evict_if_needed(&self, entries: &mut HashMap<String, CacheEntry>, now: Instant) {
        entries.retain(|_, entry| !entry.is_expired(now));
        while entries.len() >= self.max_entries {
            let oldest = entries
                .iter()
                .min_by_key(|(_, entry)| entry.last_accessed)
                .map(|(key, _)| key.clone());
            match oldest {
                Some(key) => {
                    entries.remove(&key);
                }
                None => break,
            }
        }
    }
}

impl Default for MemoryCache {
    fn default() -> Self {
        Self::new(1024)
    }
}

#[async_trait]
impl ResponseCache for MemoryCache {
    async fn lookup(&self, key: &str) -> Result<Option<HttpResponse>> {
        let now = Instant::now();
        let mut entries = self.entries.write().await;
        let expired = match entries.get_mut(key) {
            Some(entry) if !entry.is_expired(now) => {
                entry.last_accessed = now;
                return Ok(Some(entry.response.clone()));
            }
            Some(_) => true,
            None => false,
        };
        if expired {
            entries.remove(key);
        }
        Ok(None)
    }

    async fn put(&self, key: &str, response: HttpResponse) -> Result<()> {
        let now = Instant::now();
        let expires_at = max_age(&response).map(|age| now + age);
        let mut entries = self.entries.write().await;
        entries.remove(key);
        self.evict_if_needed(&mut entries, now);
        entries.insert(
            key.to_string(),
            CacheEntry {
                response,
                expires_at,
                last_accessed: now,
            },
        );
        Ok(())
    }
}

/// `max-age` of the last cache-control directive that carries one
pub(crate) fn max_age(response: &HttpResponse) -> Option<Duration> {
    response
        .headers()
        .get_all(CACHE_CONTROL)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(','))
        .filter_map(|directive| {
            let (name, value) = directive.trim().split_once('=')?;
            if name.trim().eq_ignore_ascii_case("max-age") {
                value.trim().trim_matches('"').parse::<u64>().ok()
            } else {
                None
            }
        })
        .last()
        .map(Duration::from_secs)
}
