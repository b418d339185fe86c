//! `RenderEngine` — spec.md §4.4's `get_ssr`/`render_by_uri` orchestration.
//!
//! Splits the abstract `get_ssr(request) -> Response` contract across two
//! layers the way this workspace splits everything else: this crate decides
//! mobile classification, cache key, deadline, minification and metrics and
//! hands back a `RenderedPage`; turning that into an HTTP response (and
//! choosing between render/proxy/static) is the HTTP Front's job.

use std::sync::Arc;
use std::time::Duration;

use rendora_cache::CacheBackend;
use rendora_config::RendoraConfig;
use rendora_headless::{HeadlessDriver, RECURSION_GUARD_HEADER, RECURSION_GUARD_VALUE};
use rendora_types::{CacheKey, RendoraError, RenderedPage};
use tracing::warn;

use crate::metrics::RendoraMetrics;
use crate::minify;

pub struct RenderEngine {
    cache: Arc<dyn CacheBackend>,
    driver: Arc<HeadlessDriver>,
    target_url: String,
    cache_prefix: String,
    minify_enabled: bool,
    deadline: Duration,
    metrics: Arc<RendoraMetrics>,
}

impl RenderEngine {
    pub fn new(
        cache: Arc<dyn CacheBackend>,
        driver: Arc<HeadlessDriver>,
        config: &RendoraConfig,
        metrics: Arc<RendoraMetrics>,
    ) -> Self {
        Self {
            cache,
            driver,
            target_url: config.target.url.trim_end_matches('/').to_string(),
            cache_prefix: config.cache.redis.key_prefix.clone(),
            minify_enabled: config.output.minify,
            deadline: Duration::from_secs(config.headless.timeout_secs as u64),
            metrics,
        }
    }

    /// spec.md §4.4 step 1: `mobile` is true whenever the lower-cased
    /// `User-Agent` contains the substring "mobile".
    pub fn classify_mobile(user_agent: &str) -> bool {
        user_agent.to_lowercase().contains("mobile")
    }

    /// Entry point used by the HTTP Front once `Filter::should_render` and
    /// the non-GET/recursion-guard checks have already passed. Re-checks the
    /// recursion guard defensively (spec.md §4.4) so a misconfigured caller
    /// cannot bypass it by calling straight into the engine.
    pub async fn get_ssr(
        &self,
        uri: &str,
        user_agent: &str,
        recursion_guard_header: Option<&str>,
    ) -> Result<RenderedPage, RendoraError> {
        if recursion_guard_header == Some(RECURSION_GUARD_VALUE) {
            return Err(RendoraError::BadRequest(format!(
                "refusing to render a request carrying {RECURSION_GUARD_HEADER}: {RECURSION_GUARD_VALUE}"
            )));
        }

        let mobile = Self::classify_mobile(user_agent);
        self.render_by_uri(uri, mobile).await
    }

    /// spec.md §4.4 steps 2–6: cache check, driver invocation under
    /// deadline, minification, deferred store, metrics.
    pub async fn render_by_uri(&self, uri: &str, mobile: bool) -> Result<RenderedPage, RendoraError> {
        let key = CacheKey::new(&self.cache_prefix, uri);

        if let Some(cached) = self.cache.get(&key).await {
            self.metrics.requests_ssr_cached.inc();
            return Ok(cached);
        }

        // The cache key stays keyed on the bare request URI; only the
        // navigation target needs the configured origin prepended (spec.md
        // §6's `target.url`, matching the original's `Target.URL + uri`).
        let navigate_to = format!("{}{}", self.target_url, uri);
        let mut page = tokio::time::timeout(self.deadline, self.driver.render(&navigate_to, mobile))
            .await
            .map_err(|_| RendoraError::RenderTimeout(self.deadline.as_millis() as u64))??;

        if self.minify_enabled && is_html(&page) {
            match minify::minify(&page.content) {
                Ok(minified) => page.content = minified,
                Err(e) => warn!(error = %e, uri, "minification failed, serving unminified content"),
            }
        }

        self.metrics.requests_ssr.inc();
        self.metrics.latency_ssr.observe(page.latency_ms);

        // The HTTP response carries `page` back to the client without
        // waiting on this store to complete (spec.md §4.4 step 5, §9).
        let cache = self.cache.clone();
        let page_for_cache = page.clone();
        tokio::spawn(async move {
            cache.set(&key, &page_for_cache).await;
        });

        Ok(page)
    }
}

fn is_html(page: &RenderedPage) -> bool {
    page.content_type().to_lowercase().contains("html")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mobile_classification_is_case_insensitive_substring() {
        assert!(RenderEngine::classify_mobile(
            "Mozilla/5.0 (Linux; Android 10; Mobile)"
        ));
        assert!(RenderEngine::classify_mobile("some-MOBILE-agent"));
        assert!(!RenderEngine::classify_mobile("Mozilla/5.0 (Windows NT 10.0)"));
    }
}
