//! Route configuration for the Warden API server.

mod api;
mod internal;

use crate::{error::ApiError, state::AppState};
use axum::{
    response::IntoResponse,
    routing::{any, get},
    Router,
};

/// Create the application router. Middleware is applied by
/// [`Server::router`](crate::Server::router).
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/healthz", get(internal::healthz))
        .route("/livez", get(internal::livez))
        .route("/readyz", get(internal::readyz))
        .route("/metrics", get(internal::prometheus_metrics))
        .route("/version", get(internal::version))
        .route("/api", any(api::resource_handler))
        .route("/api/*rest", any(api::resource_handler))
        .route("/apis", any(api::resource_handler))
        .route("/apis/*rest", any(api::resource_handler))
        .fallback(fallback_handler)
        .with_state(state)
}

async fn fallback_handler() -> impl IntoResponse {
    ApiError::NotFound
}
