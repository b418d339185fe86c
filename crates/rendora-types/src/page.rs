//! `RenderedPage` and `CacheKey` — spec.md §3.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// The captured result of one render. Immutable after construction: every
/// field is set once in the constructor and there are no `&mut self`
/// methods, so every reader observes the same value (spec.md §3 invariant).
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RenderedPage {
    pub status: u16,
    pub content: String,
    pub headers: HashMap<String, String>,
    pub latency_ms: f64,
}

impl RenderedPage {
    pub fn new(
        status: u16,
        content: impl Into<String>,
        headers: HashMap<String, String>,
        latency_ms: f64,
    ) -> Self {
        Self {
            status,
            content: content.into(),
            headers,
            latency_ms,
        }
    }

    pub fn content_type(&self) -> &str {
        self.headers
            .get("content-type")
            .or_else(|| self.headers.get("Content-Type"))
            .map(String::as_str)
            .unwrap_or("text/html; charset=utf-8")
    }
}

/// Stable string key derived from a configured prefix and the request URI
/// exactly as presented on the wire. Wrapping it in a newtype keeps
/// "prefix:uri" construction in one place (spec.md §3).
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CacheKey(String);

impl CacheKey {
    pub fn new(prefix: &str, uri: &str) -> Self {
        Self(format!("{prefix}:{uri}"))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for CacheKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cache_key_joins_prefix_and_uri() {
        let key = CacheKey::new("__:::rendora:", "/foo?bar=1");
        assert_eq!(key.as_str(), "__:::rendora::/foo?bar=1");
    }

    #[test]
    fn rendered_page_defaults_content_type() {
        let page = RenderedPage::new(200, "<html></html>", HashMap::new(), 12.0);
        assert_eq!(page.content_type(), "text/html; charset=utf-8");
    }
}
