use std::collections::HashMap;

use rendora_cache::{CacheBackend, RedisCache};
use rendora_config::CacheConfig;
use rendora_types::{CacheKey, RenderedPage};

fn test_config() -> CacheConfig {
    let mut cfg = CacheConfig::default();
    cfg.redis.address = "redis://127.0.0.1:6379".to_string();
    cfg.timeout_secs = 60;
    cfg
}

#[tokio::test]
#[ignore = "Requires a local Redis instance on 127.0.0.1:6379"]
async fn round_trips_through_redis() {
    let cache = RedisCache::connect(&test_config()).await.expect("connect");
    let key = CacheKey::new("__:::rendora:test:", "/redis-roundtrip");
    let page = RenderedPage::new(200, "<html>redis</html>", HashMap::new(), 4.0);

    cache.set(&key, &page).await;
    let got = cache.get(&key).await.expect("hit");
    assert_eq!(got.content, page.content);
}

#[tokio::test]
#[ignore = "Requires a local Redis instance on 127.0.0.1:6379"]
async fn second_writer_does_not_clobber_the_first() {
    let cache = RedisCache::connect(&test_config()).await.expect("connect");
    let key = CacheKey::new("__:::rendora:test:", "/redis-nx");
    let first = RenderedPage::new(200, "<html>first</html>", HashMap::new(), 1.0);
    let second = RenderedPage::new(200, "<html>second</html>", HashMap::new(), 2.0);

    cache.set(&key, &first).await;
    cache.set(&key, &second).await;

    let got = cache.get(&key).await.expect("hit");
    assert_eq!(got.content, first.content);
}
