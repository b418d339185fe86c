//! HTTP-facing error wrapper — spec.md §7, grounded on `riptide-api::errors::ApiError`'s
//! `thiserror` + `IntoResponse` shape. `RendoraError` lives in `rendora-types`
//! without any HTTP dependency; this newtype is where it picks one up.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use rendora_types::RendoraError;
use serde_json::json;

pub struct ApiError(pub RendoraError);

impl From<RendoraError> for ApiError {
    fn from(err: RendoraError) -> Self {
        Self(err)
    }
}

impl ApiError {
    fn status_code(&self) -> StatusCode {
        match &self.0 {
            RendoraError::BadRequest(_) => StatusCode::BAD_REQUEST,
            RendoraError::Unauthorized => StatusCode::UNAUTHORIZED,
            RendoraError::BrowserUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            RendoraError::RenderTimeout(_) => StatusCode::SERVICE_UNAVAILABLE,
            RendoraError::CdpProtocolError(_) => StatusCode::SERVICE_UNAVAILABLE,
            // Soft errors never reach this impl in practice — the Engine
            // swallows them at the call site — but map sensibly if one did.
            RendoraError::MinifyError(_) | RendoraError::CacheError(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
            RendoraError::ConfigError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let message = self.0.to_string();

        match status {
            StatusCode::INTERNAL_SERVER_ERROR | StatusCode::SERVICE_UNAVAILABLE => {
                tracing::error!(error = %message, status = status.as_u16(), "request failed");
            }
            _ => {
                tracing::warn!(error = %message, status = status.as_u16(), "request rejected");
            }
        }

        (status, Json(json!({ "error": message }))).into_response()
    }
}

pub type ApiResult<T> = Result<T, ApiError>;
