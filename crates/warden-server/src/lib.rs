//! Warden API Server
//!
//! An HTTP front end that authorizes every request the way the Kubernetes
//! API server does before handing it to the handler chain.
//!
//! # Architecture
//!
//! Requests pass through these layers, outermost first:
//!
//! - **Tracing, panic recovery, timeout**: from `tower-http`
//! - **Request info**: resolves verb, API group, resource and namespace
//! - **Authentication**: attaches the caller's [`UserInfo`](authorizer::UserInfo)
//! - **Audit**: opens the request's audit record
//! - **Authorization**: asks the configured [`Authorizer`](authorizer::Authorizer)
//!   and rejects with 403 or 500, or forwards the request
//! - **Routes**: health, metrics, version and the resource catch-all

#![warn(clippy::all)]

pub mod authorizer;
pub mod config;
pub mod error;
pub mod metrics;
pub mod middleware;
pub mod response;
pub mod routes;
pub mod state;

pub use config::ServerConfig;
pub use error::{ApiError, ApiResult};
pub use state::AppState;

use anyhow::Context as _;
use authorizer::{build_authorizer, Authorizer};
use axum::Router;
use metrics::ServerMetrics;
use middleware::{AuditLayer, AuthnLayer, AuthzLayer, RequestInfoLayer};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::{catch_panic::CatchPanicLayer, timeout::TimeoutLayer, trace::TraceLayer};
use tracing::{error, info};
use warden_audit::{run_sink, AuditCapture, CaptureConfig, LogSink};

/// Server builder for constructing and running the API server.
pub struct Server {
    state: AppState,
    authorizer: Option<Arc<dyn Authorizer>>,
}

impl Server {
    /// Create a new server with the given configuration.
    ///
    /// Must be called within a Tokio runtime when auditing is enabled,
    /// since the audit sink runs as a background task.
    pub async fn new(config: ServerConfig) -> Result<Self, anyhow::Error> {
        let authorizer = build_authorizer(&config.authorization);
        let mut state = AppState::new(config);

        if state.config.metrics.enabled {
            let metrics = ServerMetrics::new().context("failed to register metrics")?;
            state = state.with_metrics(metrics);
        }

        if state.config.audit.enabled {
            let (capture, receiver) = AuditCapture::new(CaptureConfig {
                buffer_size: state.config.audit.buffer_size,
            });
            tokio::spawn(run_sink(receiver, Arc::new(LogSink)));
            state = state.with_audit(capture);
        }

        Ok(Self { state, authorizer })
    }

    /// Build the router with all routes and middleware.
    pub fn router(&self) -> Router {
        let config = &self.state.config;

        let mut authz = AuthzLayer::new(self.authorizer.clone());
        if let Some(metrics) = &self.state.metrics {
            authz = authz.with_metrics(metrics.authorization());
        }

        let mut router = routes::create_router(self.state.clone()).layer(authz);
        if let Some(capture) = &self.state.audit {
            router = router.layer(AuditLayer::new(capture.clone()));
        }

        router
            .layer(AuthnLayer::new(&config.authentication))
            .layer(RequestInfoLayer::default().with_deadline(config.server.request_timeout()))
            .layer(TimeoutLayer::new(config.server.request_timeout()))
            .layer(CatchPanicLayer::new())
            .layer(TraceLayer::new_for_http())
    }

    /// Run the server, binding to the configured address.
    pub async fn run(self) -> Result<(), anyhow::Error> {
        let addr = self.addr()?;
        let listener = TcpListener::bind(addr)
            .await
            .with_context(|| format!("failed to bind {}", addr))?;

        info!("Server listening on {}", addr);

        axum::serve(
            listener,
            self.router()
                .into_make_service_with_connect_info::<SocketAddr>(),
        )
        .with_graceful_shutdown(shutdown_signal())
        .await?;

        Ok(())
    }

    /// Get the server's socket address.
    pub fn addr(&self) -> Result<SocketAddr, anyhow::Error> {
        self.state
            .config
            .server
            .socket_addr()
            .context("invalid bind address")
    }

    pub fn state(&self) -> &AppState {
        &self.state
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = tokio::signal::ctrl_c().await {
            error!(error = %err, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(err) => {
                error!(error = %err, "Failed to install signal handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("Shutdown signal received, starting graceful shutdown");
}
