//! Shared application state, grounded on `riptide-api::state::AppState`'s
//! role as the one `Clone`-able struct every handler is given through
//! `axum::extract::State`. Narrowed here to exactly what the public and
//! admin listeners need.

use std::sync::Arc;

use rendora_config::AuthConfig;
use rendora_engine::RenderEngine;
use rendora_engine::RendoraMetrics;
use rendora_types::FilterPolicy;

use crate::passthrough::ProxyPassThrough;

#[derive(Clone)]
pub struct AppState {
    pub engine: Arc<RenderEngine>,
    pub filters: Arc<FilterPolicy>,
    pub proxy: Option<Arc<ProxyPassThrough>>,
    pub static_root: Option<String>,
    pub metrics: Arc<RendoraMetrics>,
    pub admin_auth: Option<AuthConfig>,
}
