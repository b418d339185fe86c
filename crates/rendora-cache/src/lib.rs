//! Result cache backends — spec.md §4.2.
//!
//! Every backend is reached exclusively through [`CacheBackend`]; the Render
//! Engine never knows which one is wired in.

mod memory;
mod none;
mod redis_backend;

pub use memory::MemoryCache;
pub use none::NoCache;
pub use redis_backend::RedisCache;

use async_trait::async_trait;
use rendora_types::{CacheKey, RendoraError, RenderedPage};

/// `get`/`set` contract shared by all three backends. A read error is never
/// fatal to the caller — the Engine treats any non-hit as "go to the
/// browser" (spec.md §4.2's failure semantics) — so `get` returns a plain
/// `Option`, swallowing backend errors internally and logging them.
#[async_trait]
pub trait CacheBackend: Send + Sync {
    async fn get(&self, key: &CacheKey) -> Option<RenderedPage>;

    /// Write errors are logged by the implementation and never propagated;
    /// the served response is unaffected either way.
    async fn set(&self, key: &CacheKey, page: &RenderedPage);
}

/// Builds a backend from the `cache.type` choice in configuration. Async
/// because the Redis backend needs a connection up front.
pub async fn build_backend(
    config: &rendora_config::CacheConfig,
) -> Result<Box<dyn CacheBackend>, RendoraError> {
    use rendora_config::CacheBackendKind;

    Ok(match config.kind {
        CacheBackendKind::Local => Box::new(MemoryCache::new(std::time::Duration::from_secs(
            config.timeout_secs as u64,
        ))),
        CacheBackendKind::Redis => Box::new(RedisCache::connect(config).await?),
        CacheBackendKind::None => Box::new(NoCache),
    })
}
