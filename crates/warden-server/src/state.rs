//! Shared application state.

use crate::{config::ServerConfig, metrics::ServerMetrics};
use std::sync::Arc;
use warden_audit::AuditCapture;

/// State handed to every route handler.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<ServerConfig>,
    /// `None` when metrics are disabled.
    pub metrics: Option<ServerMetrics>,
    /// `None` when auditing is disabled.
    pub audit: Option<AuditCapture>,
}

impl AppState {
    pub fn new(config: ServerConfig) -> Self {
        Self {
            config: Arc::new(config),
            metrics: None,
            audit: None,
        }
    }

    pub fn with_metrics(mut self, metrics: ServerMetrics) -> Self {
        self.metrics = Some(metrics);
        self
    }

    pub fn with_audit(mut self, capture: AuditCapture) -> Self {
        self.audit = Some(capture);
        self
    }
}
