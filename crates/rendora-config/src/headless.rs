//! `headless.*` configuration — spec.md §4.3, §6.

use rendora_types::RendoraError;
use serde::{Deserialize, Serialize};

/// Only the internal mode (Rendora owns the websocket connection) is
/// implemented; `external` is accepted for forward config compatibility and
/// currently behaves identically.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HeadlessMode {
    Internal,
    External,
}

impl Default for HeadlessMode {
    fn default() -> Self {
        HeadlessMode::Internal
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct PoolConfig {
    pub enabled: bool,
    pub initial_capacity: usize,
    pub max_capacity: usize,
    /// Idle sessions older than this are closed by the reaper task.
    pub idle_timeout_secs: u64,
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            initial_capacity: 1,
            max_capacity: 4,
            idle_timeout_secs: 300,
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct HeadlessConfig {
    pub mode: HeadlessMode,
    /// DevTools HTTP endpoint, e.g. `http://localhost:9222`.
    pub url: String,
    pub auth_token: Option<String>,
    pub blocked_urls: Vec<String>,
    /// Per-render deadline, seconds. Valid range: 5..=60 (spec widens the
    /// original's 5..=30 slightly to match spec.md §4.3's documented range).
    pub timeout_secs: u16,
    /// Extra delay after `Page.domContentEventFired`, milliseconds.
    pub wait_after_dom_load_ms: u16,
    /// Disables the headless browser's own HTTP cache.
    pub cache_disabled: bool,
    /// Overrides the UA the headless browser presents to the origin.
    pub user_agent_override: Option<String>,
    /// CSS selector whose presence in the DOM signals readiness, used
    /// instead of (or alongside) the DOM/load event race.
    pub wait_ready_selector: Option<String>,
    pub pool: PoolConfig,
}

impl Default for HeadlessConfig {
    fn default() -> Self {
        Self {
            mode: HeadlessMode::Internal,
            url: "http://localhost:9222".to_string(),
            auth_token: None,
            blocked_urls: default_blocked_urls(),
            timeout_secs: 15,
            wait_after_dom_load_ms: 0,
            cache_disabled: false,
            user_agent_override: None,
            wait_ready_selector: None,
            pool: PoolConfig::default(),
        }
    }
}

/// Common asset/tracker hosts that add nothing to the rendered DOM.
fn default_blocked_urls() -> Vec<String> {
    vec![
        "*.png", "*.jpg", "*.jpeg", "*.webp", "*.gif", "*.css", "*.woff2", "*.svg", "*.woff",
        "*.ttf", "*.ico", "https://www.youtube.com/*", "https://www.google-analytics.com/*",
        "https://fonts.googleapis.com/*",
    ]
    .into_iter()
    .map(String::from)
    .collect()
}

impl HeadlessConfig {
    pub fn validate(&self) -> Result<(), RendoraError> {
        if !(5..=60).contains(&self.timeout_secs) {
            return Err(RendoraError::ConfigError(format!(
                "headless.timeout must be in 5..=60, got {}",
                self.timeout_secs
            )));
        }
        if self.wait_after_dom_load_ms > 5000 {
            return Err(RendoraError::ConfigError(format!(
                "headless.waitAfterDOMLoad must be in 0..=5000, got {}",
                self.wait_after_dom_load_ms
            )));
        }
        if self.pool.enabled && self.pool.max_capacity < self.pool.initial_capacity {
            return Err(RendoraError::ConfigError(
                "headless.pool.maxCapacity must be >= initialCapacity".into(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_timeout_is_within_range() {
        assert!(HeadlessConfig::default().validate().is_ok());
    }

    #[test]
    fn timeout_below_five_seconds_is_rejected() {
        let mut cfg = HeadlessConfig::default();
        cfg.timeout_secs = 4;
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn wait_after_dom_load_above_5000_is_rejected() {
        let mut cfg = HeadlessConfig::default();
        cfg.wait_after_dom_load_ms = 5001;
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn pool_max_below_initial_is_rejected() {
        let mut cfg = HeadlessConfig::default();
        cfg.pool.enabled = true;
        cfg.pool.initial_capacity = 4;
        cfg.pool.max_capacity = 2;
        assert!(cfg.validate().is_err());
    }
}
