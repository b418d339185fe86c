//! Public listener — spec.md §4.5. Any request lands on one handler; method
//! and the recursion-guard header decide render vs. pass-through before the
//! filter is even consulted.

use axum::body::Body;
use axum::extract::{Request, State};
use axum::http::{HeaderMap, HeaderValue, Method, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::any;
use axum::Router;
use rendora_engine::filter;
use rendora_headless::{RECURSION_GUARD_HEADER, RECURSION_GUARD_VALUE};

use crate::state::AppState;

pub fn router(state: AppState) -> Router {
    Router::new().fallback(any(handle)).with_state(state)
}

async fn handle(State(state): State<AppState>, req: Request) -> Response {
    let response = dispatch(&state, req).await;
    state.metrics.requests_total.inc();
    response
}

async fn dispatch(state: &AppState, req: Request) -> Response {
    let method = req.method().clone();
    let uri = req.uri().path_and_query().map(|pq| pq.as_str().to_string()).unwrap_or_else(|| "/".to_string());
    let is_recursive = header_equals(req.headers(), RECURSION_GUARD_HEADER, RECURSION_GUARD_VALUE);

    if method != Method::GET || is_recursive {
        return pass_through(state, req).await;
    }

    let user_agent = req
        .headers()
        .get(axum::http::header::USER_AGENT)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("")
        .to_string();

    if !filter::should_render(&state.filters, &user_agent, &uri) {
        return pass_through(state, req).await;
    }

    match state.engine.get_ssr(&uri, &user_agent, None).await {
        Ok(page) => rendered_page_response(page),
        Err(e) => crate::errors::ApiError::from(e).into_response(),
    }
}

async fn pass_through(state: &AppState, req: Request) -> Response {
    if let Some(proxy) = &state.proxy {
        return proxy.forward(req).await;
    }
    if state.static_root.is_some() {
        return crate::passthrough::serve_static(State(state.clone()), req).await;
    }
    StatusCode::BAD_GATEWAY.into_response()
}

fn rendered_page_response(page: rendora_types::RenderedPage) -> Response {
    let mut builder = Response::builder().status(
        StatusCode::from_u16(page.status).unwrap_or(StatusCode::OK),
    );
    if let Some(headers) = builder.headers_mut() {
        for (key, value) in &page.headers {
            if let Ok(value) = HeaderValue::from_str(value) {
                if let Ok(name) = axum::http::HeaderName::try_from(key.as_str()) {
                    headers.insert(name, value);
                }
            }
        }
    }
    builder
        .body(Body::from(page.content))
        .unwrap_or_else(|_| StatusCode::INTERNAL_SERVER_ERROR.into_response())
}

fn header_equals(headers: &HeaderMap, name: &str, value: &str) -> bool {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(|v| v.eq_ignore_ascii_case(value))
        .unwrap_or(false)
}
