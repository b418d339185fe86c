//! `BrowserSession` — spec.md §3, §4.3 per-render protocol.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use spider_chrome::cdp::browser_protocol::network::{
    EventResponseReceived, Headers as CdpHeaders,
};
use spider_chrome::cdp::browser_protocol::page::{EventDomContentEventFired, EventLoadEventFired};
use spider_chrome::Page;
use futures::StreamExt;
use rendora_config::HeadlessConfig;
use rendora_types::{RendoraError, RenderedPage};
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, warn};

use crate::uri::normalize_uri;

/// One live CDP connection to a single "page" target. The mutex exists
/// purely to serialize navigations on that target — a session is never
/// shared across concurrent renders, so the lock is uncontended on the
/// happy path and just prevents two callers from racing `Page.navigate`.
pub struct BrowserSession {
    page: Page,
    lock: Mutex<()>,
    config: Arc<HeadlessConfig>,
}

impl BrowserSession {
    pub fn new(page: Page, config: Arc<HeadlessConfig>) -> Self {
        Self {
            page,
            lock: Mutex::new(()),
            config,
        }
    }

    /// Health ping used before handing a pooled session back out.
    pub async fn is_alive(&self) -> bool {
        self.page.evaluate("1").await.is_ok()
    }

    pub async fn close(&self) {
        if let Err(e) = self.page.clone().close().await {
            warn!(error = %e, "failed to close browser session cleanly");
        }
    }

    /// Runs the per-render protocol under the configured deadline. A timed
    /// out render is never cached by the caller — this function just
    /// reports the timeout, the cache decision lives in `rendora-engine`.
    pub async fn render(&self, uri: &str, mobile: bool) -> Result<RenderedPage, RendoraError> {
        let _guard = self.lock.lock().await;
        let deadline = Duration::from_secs(self.config.timeout_secs as u64);

        match tokio::time::timeout(deadline, self.render_inner(uri, mobile)).await {
            Ok(inner) => inner,
            Err(_) => Err(RendoraError::RenderTimeout(deadline.as_millis() as u64)),
        }
    }

    async fn render_inner(&self, uri: &str, mobile: bool) -> Result<RenderedPage, RendoraError> {
        let normalized = normalize_uri(uri);
        let start = Instant::now();

        debug!(uri = %normalized, mobile, "starting render");

        // Subscriptions must be in place before `Page.navigate` fires or the
        // first events can be missed (spec.md §4.3 step 3).
        let mut responses = self
            .page
            .event_listener::<EventResponseReceived>()
            .await
            .map_err(|e| RendoraError::CdpProtocolError(e.to_string()))?;
        let mut dom_loaded = self
            .page
            .event_listener::<EventDomContentEventFired>()
            .await
            .map_err(|e| RendoraError::CdpProtocolError(e.to_string()))?;
        let mut page_loaded = self
            .page
            .event_listener::<EventLoadEventFired>()
            .await
            .map_err(|e| RendoraError::CdpProtocolError(e.to_string()))?;

        self.page
            .goto(&normalized)
            .await
            .map_err(|e| RendoraError::CdpProtocolError(e.to_string()))?;

        let first_response = responses.next().await.ok_or_else(|| {
            RendoraError::CdpProtocolError("navigation ended before any response arrived".into())
        })?;

        let status = first_response.response.status as u16;
        let headers = headers_to_map(&first_response.response.headers);

        // Readiness race (spec.md §4.3 step 6): `loadEventFired` wins
        // outright; `domContentEventFired` plus the configured settle delay
        // is the fallback signal.
        tokio::select! {
            _ = page_loaded.next() => {}
            _ = dom_loaded.next() => {
                if self.config.wait_after_dom_load_ms > 0 {
                    tokio::time::sleep(Duration::from_millis(self.config.wait_after_dom_load_ms as u64)).await;
                }
            }
        }

        if let Some(selector) = &self.config.wait_ready_selector {
            if self.page.find_element(selector.as_str()).await.is_err() {
                debug!(selector = %selector, "wait-ready selector never appeared, proceeding anyway");
            }
        }

        // `Page.content()` is chromiumoxide's wrapper over `DOM.getDocument`
        // followed by `DOM.getOuterHTML` on the root node.
        let content = self
            .page
            .content()
            .await
            .map_err(|e| RendoraError::CdpProtocolError(e.to_string()))?;

        let latency_ms = start.elapsed().as_secs_f64() * 1000.0;

        Ok(RenderedPage::new(status, content, headers, latency_ms))
    }
}

fn headers_to_map(headers: &CdpHeaders) -> HashMap<String, String> {
    headers
        .inner()
        .as_object()
        .map(|obj| {
            obj.iter()
                .filter_map(|(k, v)| v.as_str().map(|s| (k.clone(), s.to_string())))
                .collect()
        })
        .unwrap_or_default()
}
