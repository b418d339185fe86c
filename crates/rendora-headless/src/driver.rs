//! `HeadlessDriver` — bring-up sequence and top-level render entry point,
//! spec.md §4.3.

use std::net::ToSocketAddrs;
use std::sync::Arc;
use std::time::Duration;

use spider_chrome::cdp::browser_protocol::network::{
    self, BlockPattern, Headers as CdpHeaders, SetBlockedUrLsParams, SetCacheDisabledParams,
    SetExtraHttpHeadersParams,
};
use spider_chrome::cdp::browser_protocol::page;
use spider_chrome::{Browser, Page};
use rendora_config::HeadlessConfig;
use rendora_types::{RendoraError, RenderedPage};
use rendora_utils::RetryPolicy;
use serde_json::json;
use tracing::{debug, info, warn};
use url::Url;

use crate::pool::BrowserPool;
use crate::session::BrowserSession;

/// The header the engine injects on every navigation it drives, and the one
/// the HTTP front checks on the way in to refuse recursive renders.
pub const RECURSION_GUARD_HEADER: &str = "X-Rendora-Type";
pub const RECURSION_GUARD_VALUE: &str = "RENDER";

enum Backing {
    Singleton(BrowserSession),
    Pool(BrowserPool),
}

/// Owns the connection(s) to the remote headless browser and exposes a
/// single `render` entry point regardless of whether pooling is enabled.
pub struct HeadlessDriver {
    #[allow(dead_code)] // kept alive for the duration of the process; the handler task borrows it
    browser: Arc<Browser>,
    backing: Backing,
}

impl HeadlessDriver {
    /// Runs the full bring-up sequence: poll `/json/version`, resolve the
    /// DevTools host to a literal IP, connect, acquire or create a page
    /// target, enable domains, and install the process-wide extras.
    pub async fn connect(config: HeadlessConfig) -> Result<Self, RendoraError> {
        let config = Arc::new(config);

        wait_for_devtools(&config.url).await?;
        let resolved_ws = discover_browser_ws_url(&config.url).await?;

        let (browser, mut handler) = Browser::connect(&resolved_ws)
            .await
            .map_err(|e| RendoraError::BrowserUnavailable(e.to_string()))?;
        let browser = Arc::new(browser);

        tokio::spawn(async move {
            use futures::StreamExt;
            while let Some(event) = handler.next().await {
                if let Err(e) = event {
                    warn!(error = %e, "headless browser event handler error");
                }
            }
            debug!("headless browser event handler stopped");
        });

        let backing = if config.pool.enabled {
            Backing::Pool(BrowserPool::new(browser.clone(), config.clone()).await?)
        } else {
            let page = acquire_page(&browser).await?;
            install_extras(&page, &config).await?;
            Backing::Singleton(BrowserSession::new(page, config.clone()))
        };

        info!(url = %config.url, pooled = config.pool.enabled, "connected to headless browser");

        Ok(Self { browser, backing })
    }

    pub async fn render(&self, uri: &str, mobile: bool) -> Result<RenderedPage, RendoraError> {
        match &self.backing {
            Backing::Singleton(session) => session.render(uri, mobile).await,
            Backing::Pool(pool) => {
                let lease = pool.acquire().await?;
                let result = lease.session().render(uri, mobile).await;
                pool.release(lease, result.is_ok()).await;
                result
            }
        }
    }
}

/// Polls `{url}/json/version` up to 5 times with a 2s backoff. The remote
/// is not expected to resolve instantly on container startup.
async fn wait_for_devtools(base_url: &str) -> Result<(), RendoraError> {
    let policy = RetryPolicy::fixed(5, Duration::from_secs(2));
    let endpoint = format!("{}/json/version", base_url.trim_end_matches('/'));

    policy
        .execute(|| {
            let endpoint = endpoint.clone();
            async move {
                reqwest::get(&endpoint)
                    .await
                    .and_then(|r| r.error_for_status())
                    .map(|_| ())
            }
        })
        .await
        .map_err(|e| {
            RendoraError::BrowserUnavailable(format!(
                "cannot connect to the headless browser at {base_url}: {e}"
            ))
        })
}

/// Fetches the browser-level `webSocketDebuggerUrl` from `/json/version`
/// and rewrites its host to a literal IP — CDP clients do not resolve
/// hostnames themselves, which has been observed to hang on container
/// networks that only register DNS names.
async fn discover_browser_ws_url(base_url: &str) -> Result<String, RendoraError> {
    let endpoint = format!("{}/json/version", base_url.trim_end_matches('/'));
    let body: serde_json::Value = reqwest::get(&endpoint)
        .await
        .map_err(|e| RendoraError::BrowserUnavailable(e.to_string()))?
        .json()
        .await
        .map_err(|e| RendoraError::BrowserUnavailable(e.to_string()))?;

    let ws_url = body
        .get("webSocketDebuggerUrl")
        .and_then(|v| v.as_str())
        .ok_or_else(|| {
            RendoraError::BrowserUnavailable(
                "/json/version response missing webSocketDebuggerUrl".into(),
            )
        })?
        .to_string();

    resolve_hostname(&ws_url).await
}

async fn resolve_hostname(ws_url: &str) -> Result<String, RendoraError> {
    let mut parsed =
        Url::parse(ws_url).map_err(|e| RendoraError::BrowserUnavailable(e.to_string()))?;
    let host = parsed
        .host_str()
        .ok_or_else(|| RendoraError::BrowserUnavailable("devtools URL has no host".into()))?
        .to_string();
    let port = parsed.port().unwrap_or(9222);

    let host_for_lookup = host.clone();
    let resolved_ip = tokio::task::spawn_blocking(move || {
        (host_for_lookup.as_str(), port)
            .to_socket_addrs()
            .ok()
            .and_then(|mut it| it.next())
            .map(|addr| addr.ip().to_string())
    })
    .await
    .map_err(|e| RendoraError::BrowserUnavailable(e.to_string()))?
    .ok_or_else(|| RendoraError::BrowserUnavailable(format!("cannot resolve host {host}")))?;

    parsed
        .set_host(Some(&resolved_ip))
        .map_err(|e| RendoraError::BrowserUnavailable(e.to_string()))?;

    Ok(parsed.to_string())
}

/// Lists existing page targets and reuses the first one found; creates a
/// fresh `about:blank` target otherwise.
pub(crate) async fn acquire_page(browser: &Browser) -> Result<Page, RendoraError> {
    let existing = browser
        .pages()
        .await
        .map_err(|e| RendoraError::BrowserUnavailable(e.to_string()))?;

    if let Some(page) = existing.into_iter().next() {
        return Ok(page);
    }

    browser
        .new_page("about:blank")
        .await
        .map_err(|e| RendoraError::BrowserUnavailable(e.to_string()))
}

/// Installs the recursion-guard header, the blocked-URL list and the
/// cache-disabled flag on a freshly acquired page target, and enables the
/// `Page`/`Network` domains (spec.md §4.3 steps 5–6).
pub(crate) async fn install_extras(
    page: &Page,
    config: &HeadlessConfig,
) -> Result<(), RendoraError> {
    page.execute(page::EnableParams::default())
        .await
        .map_err(|e| RendoraError::CdpProtocolError(e.to_string()))?;
    page.execute(network::EnableParams::default())
        .await
        .map_err(|e| RendoraError::CdpProtocolError(e.to_string()))?;

    let headers = CdpHeaders::new(json!({ RECURSION_GUARD_HEADER: RECURSION_GUARD_VALUE }));
    page.execute(SetExtraHttpHeadersParams { headers })
        .await
        .map_err(|e| RendoraError::CdpProtocolError(e.to_string()))?;

    page.execute(SetBlockedUrLsParams {
        url_patterns: Some(
            config
                .blocked_urls
                .iter()
                .map(|u| BlockPattern::new(u.clone(), true))
                .collect(),
        ),
    })
    .await
    .map_err(|e| RendoraError::CdpProtocolError(e.to_string()))?;

    page.execute(SetCacheDisabledParams {
        cache_disabled: config.cache_disabled,
    })
    .await
    .map_err(|e| RendoraError::CdpProtocolError(e.to_string()))?;

    if let Some(ua) = &config.user_agent_override {
        page.execute(network::SetUserAgentOverrideParams {
            user_agent: ua.clone(),
            accept_language: None,
            platform: None,
            user_agent_metadata: None,
        })
        .await
        .map_err(|e| RendoraError::CdpProtocolError(e.to_string()))?;
    }

    Ok(())
}
