//! Admin listener — spec.md §4.5, §6: `POST /render`, `GET /metrics`,
//! gated by an optional static header auth check.

use axum::extract::State;
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use prometheus::{Encoder, TextEncoder};

use crate::dto::{RenderRequest, RenderResponse};
use crate::errors::{ApiError, ApiResult};
use crate::state::AppState;

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/render", post(render))
        .route("/metrics", get(metrics))
        .with_state(state)
}

async fn render(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(body): Json<RenderRequest>,
) -> ApiResult<Json<RenderResponse>> {
    check_auth(&state, &headers)?;

    if body.uri.trim().is_empty() {
        return Err(ApiError::from(rendora_types::RendoraError::BadRequest(
            "uri must not be empty".to_string(),
        )));
    }

    let mobile = rendora_engine::RenderEngine::classify_mobile(
        headers
            .get(axum::http::header::USER_AGENT)
            .and_then(|v| v.to_str().ok())
            .unwrap_or(""),
    );

    let page = state.engine.render_by_uri(&body.uri, mobile).await?;
    Ok(Json(RenderResponse::from(page)))
}

async fn metrics(State(state): State<AppState>, headers: HeaderMap) -> Response {
    if let Err(e) = check_auth(&state, &headers) {
        return e.into_response();
    }

    let encoder = TextEncoder::new();
    let families = state.metrics.registry.gather();
    let mut buf = Vec::new();
    if let Err(e) = encoder.encode(&families, &mut buf) {
        tracing::error!(error = %e, "failed to encode prometheus metrics");
        return StatusCode::INTERNAL_SERVER_ERROR.into_response();
    }

    ([(axum::http::header::CONTENT_TYPE, encoder.format_type())], buf).into_response()
}

fn check_auth(state: &AppState, headers: &HeaderMap) -> Result<(), ApiError> {
    let Some(auth) = &state.admin_auth else {
        return Ok(());
    };
    if !auth.enable {
        return Ok(());
    }

    let matches = headers
        .get(auth.name.as_str())
        .and_then(|v| v.to_str().ok())
        .map(|v| v == auth.value)
        .unwrap_or(false);

    if matches {
        Ok(())
    } else {
        Err(ApiError::from(rendora_types::RendoraError::Unauthorized))
    }
}
