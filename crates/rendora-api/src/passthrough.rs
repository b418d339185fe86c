//! The two pass-through strategies named in spec.md §4.5: forward to an
//! origin over HTTP, or serve a static file tree. Exactly one is active per
//! deployment, chosen by which `backend.*` field configuration supplied.

use axum::body::Body;
use axum::extract::State;
use axum::http::{HeaderMap, Request, StatusCode};
use axum::response::{IntoResponse, Response};
use tower::ServiceExt;
use tower_http::services::ServeDir;
use tracing::warn;

use crate::state::AppState;

/// Forwards the inbound request to `backend.url`, preserving method, path,
/// query string, headers and body, and relays the origin's response back
/// verbatim. Grounded on the `reqwest::Client` this workspace already uses
/// for outbound HTTP (headless bring-up polling, origin fetches elsewhere
/// in the corpus) rather than introducing a second HTTP client crate.
pub struct ProxyPassThrough {
    client: reqwest::Client,
    origin: String,
}

impl ProxyPassThrough {
    pub fn new(origin: String) -> Self {
        Self {
            client: reqwest::Client::new(),
            origin,
        }
    }

    pub async fn forward(&self, req: Request<Body>) -> Response {
        let (parts, body) = req.into_parts();
        let path_and_query = parts
            .uri
            .path_and_query()
            .map(|pq| pq.as_str())
            .unwrap_or("/");
        let target = format!("{}{}", self.origin.trim_end_matches('/'), path_and_query);

        let body_bytes = match axum::body::to_bytes(body, usize::MAX).await {
            Ok(b) => b,
            Err(e) => {
                warn!(error = %e, "failed to buffer request body for proxying");
                return StatusCode::BAD_REQUEST.into_response();
            }
        };

        let method = parts.method.clone();
        let mut outbound = self.client.request(method, &target).body(body_bytes);
        for (name, value) in parts.headers.iter() {
            outbound = outbound.header(name, value);
        }

        match outbound.send().await {
            Ok(resp) => reqwest_response_into_axum(resp).await,
            Err(e) => {
                warn!(error = %e, origin = %self.origin, "origin proxy request failed");
                StatusCode::BAD_GATEWAY.into_response()
            }
        }
    }
}

async fn reqwest_response_into_axum(resp: reqwest::Response) -> Response {
    let status = resp.status();
    let headers = resp.headers().clone();
    let body = match resp.bytes().await {
        Ok(b) => b,
        Err(e) => {
            warn!(error = %e, "failed to read origin response body");
            return StatusCode::BAD_GATEWAY.into_response();
        }
    };

    let mut response = Response::new(Body::from(body));
    *response.status_mut() = status;
    *response.headers_mut() = filter_hop_by_hop(headers);
    response
}

fn filter_hop_by_hop(mut headers: HeaderMap) -> HeaderMap {
    for name in [
        "connection",
        "keep-alive",
        "transfer-encoding",
        "upgrade",
        "proxy-authenticate",
        "proxy-authorization",
    ] {
        headers.remove(name);
    }
    headers
}

/// Serves a configured directory via `tower_http::services::ServeDir`.
pub async fn serve_static(State(state): State<AppState>, req: Request<Body>) -> Response {
    let Some(root) = &state.static_root else {
        return StatusCode::NOT_FOUND.into_response();
    };
    match ServeDir::new(root).oneshot(req).await {
        Ok(resp) => resp.map(Body::new),
        Err(e) => {
            warn!(error = %e, "static file serving failed");
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}
