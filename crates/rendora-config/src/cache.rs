//! `cache.*` configuration — spec.md §4.2.

use rendora_types::RendoraError;
use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CacheBackendKind {
    Local,
    Redis,
    None,
}

impl Default for CacheBackendKind {
    fn default() -> Self {
        CacheBackendKind::Local
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct RedisConfig {
    pub address: String,
    pub password: String,
    pub db: i64,
    pub key_prefix: String,
}

impl Default for RedisConfig {
    fn default() -> Self {
        Self {
            address: "redis://127.0.0.1:6379".to_string(),
            password: String::new(),
            db: 0,
            key_prefix: "__:::rendora:".to_string(),
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    #[serde(rename = "type")]
    pub kind: CacheBackendKind,
    /// TTL applied to every entry, seconds.
    pub timeout_secs: u32,
    pub redis: RedisConfig,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            kind: CacheBackendKind::Local,
            timeout_secs: 60 * 60,
            redis: RedisConfig::default(),
        }
    }
}

impl CacheConfig {
    pub fn validate(&self) -> Result<(), RendoraError> {
        if self.timeout_secs == 0 {
            return Err(RendoraError::ConfigError(
                "cache.timeout must be at least 1 second".into(),
            ));
        }
        if !(0..=15).contains(&self.redis.db) {
            return Err(RendoraError::ConfigError(format!(
                "cache.redis.db must be in 0..=15, got {}",
                self.redis.db
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_timeout_is_rejected() {
        let mut cfg = CacheConfig::default();
        cfg.timeout_secs = 0;
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn redis_db_out_of_range_is_rejected() {
        let mut cfg = CacheConfig::default();
        cfg.redis.db = 16;
        assert!(cfg.validate().is_err());
    }
}
