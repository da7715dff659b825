//! Health, metrics and version endpoints.

use crate::{
    error::{ApiError, ApiResult},
    state::AppState,
};
use axum::{
    extract::State,
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

pub(super) async fn healthz() -> &'static str {
    "ok"
}

pub(super) async fn livez() -> &'static str {
    "ok"
}

pub(super) async fn readyz(State(state): State<AppState>) -> ApiResult<&'static str> {
    match &state.audit {
        Some(capture) if !capture.is_healthy() => Err(ApiError::ServiceUnavailable(
            "audit backend is not accepting events".to_string(),
        )),
        _ => Ok("ok"),
    }
}

pub(super) async fn prometheus_metrics(State(state): State<AppState>) -> Response {
    let Some(metrics) = &state.metrics else {
        return ApiError::NotFound.into_response();
    };

    match metrics.export() {
        Ok(body) => (
            StatusCode::OK,
            [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
            body,
        )
            .into_response(),
        Err(err) => ApiError::Internal(err.into()).into_response(),
    }
}

pub(super) async fn version() -> impl IntoResponse {
    Json(json!({
        "gitVersion": concat!("v", env!("CARGO_PKG_VERSION")),
        "platform": format!("{}/{}", std::env::consts::OS, std::env::consts::ARCH),
    }))
}
