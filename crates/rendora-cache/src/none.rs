use async_trait::async_trait;
use rendora_types::{CacheKey, RenderedPage};

use crate::CacheBackend;

/// `cache.type: none` — every read is a miss, every write a no-op.
pub struct NoCache;

#[async_trait]
impl CacheBackend for NoCache {
    async fn get(&self, _key: &CacheKey) -> Option<RenderedPage> {
        None
    }

    async fn set(&self, _key: &CacheKey, _page: &RenderedPage) {}
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[tokio::test]
    async fn never_caches_anything() {
        let cache = NoCache;
        let key = CacheKey::new("p", "/x");
        let page = RenderedPage::new(200, "<html></html>", HashMap::new(), 1.0);

        cache.set(&key, &page).await;
        assert!(cache.get(&key).await.is_none());
    }
}
