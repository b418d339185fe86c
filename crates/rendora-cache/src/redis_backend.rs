use async_trait::async_trait;
use rendora_config::CacheConfig;
use rendora_types::{CacheKey, RendoraError, RenderedPage};
use redis::aio::MultiplexedConnection;
use redis::AsyncCommands;
use tracing::warn;

use crate::CacheBackend;

/// `cache.type: redis` — `SET key value NX EX ttl` on write (first writer
/// wins; losers proceed without erroring, per spec.md §4.2), plain `GET` +
/// JSON decode on read. `MultiplexedConnection` is cheap to clone and safe
/// to share across tasks, so one lives on the struct rather than behind a
/// pool.
pub struct RedisCache {
    conn: MultiplexedConnection,
    ttl_secs: u64,
}

impl RedisCache {
    pub async fn connect(config: &CacheConfig) -> Result<Self, RendoraError> {
        let client = redis::Client::open(config.redis.address.as_str())
            .map_err(|e| RendoraError::ConfigError(format!("invalid redis address: {e}")))?;
        let conn = client
            .get_multiplexed_tokio_connection()
            .await
            .map_err(|e| RendoraError::CacheError(e.to_string()))?;

        Ok(Self {
            conn,
            ttl_secs: config.timeout_secs as u64,
        })
    }
}

#[async_trait]
impl CacheBackend for RedisCache {
    async fn get(&self, key: &CacheKey) -> Option<RenderedPage> {
        let mut conn = self.conn.clone();
        let raw: Option<String> = match conn.get(key.as_str()).await {
            Ok(v) => v,
            Err(e) => {
                warn!(error = %e, key = %key, "redis cache read failed, treating as miss");
                return None;
            }
        };

        raw.and_then(|s| match serde_json::from_str(&s) {
            Ok(page) => Some(page),
            Err(e) => {
                warn!(error = %e, key = %key, "redis cache entry was not valid JSON");
                None
            }
        })
    }

    async fn set(&self, key: &CacheKey, page: &RenderedPage) {
        let encoded = match serde_json::to_string(page) {
            Ok(s) => s,
            Err(e) => {
                warn!(error = %e, key = %key, "failed to encode page for redis cache");
                return;
            }
        };

        let mut conn = self.conn.clone();
        // NX: first writer wins; a losing concurrent render still succeeds,
        // it just doesn't overwrite the value already in place.
        let result: Result<bool, redis::RedisError> = redis::cmd("SET")
            .arg(key.as_str())
            .arg(encoded)
            .arg("NX")
            .arg("EX")
            .arg(self.ttl_secs)
            .query_async(&mut conn)
            .await;

        if let Err(e) = result {
            warn!(error = %e, key = %key, "redis cache write failed");
        }
    }
}
