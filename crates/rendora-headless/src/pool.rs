//! `BrowserPool` — spec.md §3's bounded session pool (c₀, cmax, T).

use std::sync::Arc;
use std::time::{Duration, Instant};

use spider_chrome::Browser;
use rendora_config::HeadlessConfig;
use rendora_types::RendoraError;
use tokio::sync::{Mutex, OwnedSemaphorePermit, Semaphore};
use tracing::debug;

use crate::driver::{acquire_page, install_extras};
use crate::session::BrowserSession;

struct Idle {
    session: BrowserSession,
    idle_since: Instant,
}

struct Shared {
    browser: Arc<Browser>,
    config: Arc<HeadlessConfig>,
    idle: Mutex<Vec<Idle>>,
}

/// A bounded, semaphore-gated set of [`BrowserSession`]s. Acquiring blocks
/// until a session is free or a new one can be created under `max_capacity`;
/// an idle reaper task closes sessions that have sat unused past
/// `idle_timeout_secs`, never shrinking below `initial_capacity`.
pub struct BrowserPool {
    shared: Arc<Shared>,
    semaphore: Arc<Semaphore>,
}

impl BrowserPool {
    pub async fn new(browser: Arc<Browser>, config: Arc<HeadlessConfig>) -> Result<Self, RendoraError> {
        let semaphore = Arc::new(Semaphore::new(config.pool.max_capacity));

        let mut idle = Vec::with_capacity(config.pool.initial_capacity);
        for _ in 0..config.pool.initial_capacity {
            let page = acquire_page(&browser).await?;
            install_extras(&page, &config).await?;
            idle.push(Idle {
                session: BrowserSession::new(page, config.clone()),
                idle_since: Instant::now(),
            });
        }

        let shared = Arc::new(Shared {
            browser,
            config: config.clone(),
            idle: Mutex::new(idle),
        });

        spawn_reaper(shared.clone());

        Ok(Self { shared, semaphore })
    }

    pub async fn acquire(&self) -> Result<Lease, RendoraError> {
        let deadline = Duration::from_secs(self.shared.config.timeout_secs as u64);
        let permit = tokio::time::timeout(deadline, self.semaphore.clone().acquire_owned())
            .await
            .map_err(|_| RendoraError::BrowserUnavailable("pool acquire timed out".into()))?
            .map_err(|_| RendoraError::BrowserUnavailable("pool semaphore closed".into()))?;

        let candidate = {
            let mut idle = self.shared.idle.lock().await;
            idle.pop()
        };

        let session = match candidate {
            Some(entry) if entry.session.is_alive().await => entry.session,
            Some(stale) => {
                debug!("discarding a dead pooled session");
                stale.session.close().await;
                self.new_session().await?
            }
            None => self.new_session().await?,
        };

        Ok(Lease {
            session: Some(session),
            _permit: permit,
        })
    }

    /// Returns a leased session to the idle pool for reuse, unless `healthy`
    /// is false — a session that broke CDP or timed out mid-navigation may
    /// be left in an unknown state the `is_alive` ping won't reliably catch,
    /// so it's closed and discarded instead of recycled (spec.md §7, §9).
    pub async fn release(&self, mut lease: Lease, healthy: bool) {
        let Some(session) = lease.session.take() else {
            return;
        };

        if healthy {
            let mut idle = self.shared.idle.lock().await;
            idle.push(Idle {
                session,
                idle_since: Instant::now(),
            });
        } else {
            debug!("discarding a session that failed or timed out mid-render");
            session.close().await;
        }
    }

    async fn new_session(&self) -> Result<BrowserSession, RendoraError> {
        let page = acquire_page(&self.shared.browser).await?;
        install_extras(&page, &self.shared.config).await?;
        Ok(BrowserSession::new(page, self.shared.config.clone()))
    }
}

pub struct Lease {
    session: Option<BrowserSession>,
    _permit: OwnedSemaphorePermit,
}

impl Lease {
    pub fn session(&self) -> &BrowserSession {
        self.session.as_ref().expect("lease session taken twice")
    }
}

fn spawn_reaper(shared: Arc<Shared>) {
    let idle_timeout = Duration::from_secs(shared.config.pool.idle_timeout_secs);
    let floor = shared.config.pool.initial_capacity;

    tokio::spawn(async move {
        let mut interval = tokio::time::interval(Duration::from_secs(30).min(idle_timeout));
        loop {
            interval.tick().await;
            let mut idle = shared.idle.lock().await;
            if idle.len() <= floor {
                continue;
            }

            let now = Instant::now();
            let mut keep = Vec::with_capacity(idle.len());
            let mut to_close = Vec::new();
            for entry in idle.drain(..) {
                if keep.len() + to_close.len() < floor || now.duration_since(entry.idle_since) < idle_timeout {
                    keep.push(entry);
                } else {
                    to_close.push(entry);
                }
            }
            *idle = keep;
            drop(idle);

            if !to_close.is_empty() {
                debug!(count = to_close.len(), "reaping idle browser sessions");
            }
            for stale in to_close {
                stale.session.close().await;
            }
        }
    });
}
