//! Admin `/render` request/response bodies — spec.md §6.

use std::collections::HashMap;

use rendora_types::RenderedPage;
use serde::{Deserialize, Serialize};

#[derive(Deserialize)]
pub struct RenderRequest {
    pub uri: String,
}

#[derive(Serialize)]
pub struct RenderResponse {
    pub status: u16,
    pub content: String,
    pub headers: HashMap<String, String>,
    pub latency: f64,
}

impl From<RenderedPage> for RenderResponse {
    fn from(page: RenderedPage) -> Self {
        Self {
            status: page.status,
            content: page.content,
            headers: page.headers,
            latency: page.latency_ms,
        }
    }
}
