use std::sync::Arc;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use dashmap::DashMap;
use rendora_types::{CacheKey, RenderedPage};
use tracing::debug;

use crate::CacheBackend;

type Entries = Arc<DashMap<String, (RenderedPage, Instant)>>;

/// `cache.type: local` — an in-process keyed store with a per-entry TTL and
/// a coarse background sweep (spec.md §4.2). No size bound, per the
/// Non-goals — entries only leave through expiry or the sweep.
pub struct MemoryCache {
    entries: Entries,
    ttl: Duration,
}

const SWEEP_INTERVAL: Duration = Duration::from_secs(4 * 60);

impl MemoryCache {
    pub fn new(ttl: Duration) -> Self {
        let entries: Entries = Arc::new(DashMap::new());
        spawn_sweeper(entries.clone(), ttl);
        Self { entries, ttl }
    }

    fn is_expired(&self, inserted_at: Instant) -> bool {
        inserted_at.elapsed() >= self.ttl
    }
}

fn spawn_sweeper(entries: Entries, ttl: Duration) {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(SWEEP_INTERVAL);
        loop {
            interval.tick().await;
            let before = entries.len();
            entries.retain(|_, (_, inserted_at)| inserted_at.elapsed() < ttl);
            let removed = before - entries.len();
            if removed > 0 {
                debug!(removed, "swept expired in-process cache entries");
            }
        }
    });
}

#[async_trait]
impl CacheBackend for MemoryCache {
    async fn get(&self, key: &CacheKey) -> Option<RenderedPage> {
        let entry = self.entries.get(key.as_str())?;
        let (page, inserted_at) = entry.value();
        if self.is_expired(*inserted_at) {
            drop(entry);
            self.entries.remove(key.as_str());
            return None;
        }
        Some(page.clone())
    }

    async fn set(&self, key: &CacheKey, page: &RenderedPage) {
        self.entries
            .insert(key.as_str().to_string(), (page.clone(), Instant::now()));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[tokio::test]
    async fn round_trips_a_value() {
        let cache = MemoryCache::new(Duration::from_secs(60));
        let key = CacheKey::new("p", "/x");
        let page = RenderedPage::new(200, "<html></html>", HashMap::new(), 1.0);

        cache.set(&key, &page).await;
        let got = cache.get(&key).await.expect("hit");
        assert_eq!(got.content, page.content);
    }

    #[tokio::test]
    async fn expired_entries_are_not_returned() {
        let cache = MemoryCache::new(Duration::from_millis(10));
        let key = CacheKey::new("p", "/x");
        let page = RenderedPage::new(200, "<html></html>", HashMap::new(), 1.0);

        cache.set(&key, &page).await;
        tokio::time::sleep(Duration::from_millis(30)).await;
        assert!(cache.get(&key).await.is_none());
    }

    #[tokio::test]
    async fn misses_are_plain_none_not_an_error() {
        let cache = MemoryCache::new(Duration::from_secs(60));
        let key = CacheKey::new("p", "/missing");
        assert!(cache.get(&key).await.is_none());
    }
}
