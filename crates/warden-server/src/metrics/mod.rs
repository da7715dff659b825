//! Prometheus metrics for the server.

pub mod authorization;

pub use authorization::{
    AuthorizationEvent, AuthorizationMetrics, AuthorizationMetricsGuard, NoopAuthorizationMetrics,
    CANCELLED_ERROR,
    PrometheusAuthorizationMetrics,
};

use prometheus::{Encoder, Registry, TextEncoder};
use std::sync::Arc;

/// Owns the metrics registry and every collector registered with it.
#[derive(Clone)]
pub struct ServerMetrics {
    registry: Registry,
    authorization: Arc<PrometheusAuthorizationMetrics>,
}

impl ServerMetrics {
    pub fn new() -> Result<Self, prometheus::Error> {
        let registry = Registry::new();
        let authorization = Arc::new(PrometheusAuthorizationMetrics::new(&registry)?);
        Ok(Self {
            registry,
            authorization,
        })
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    pub fn authorization(&self) -> Arc<PrometheusAuthorizationMetrics> {
        self.authorization.clone()
    }

    /// Render all metrics in the Prometheus text format.
    pub fn export(&self) -> Result<String, prometheus::Error> {
        let mut buffer = Vec::new();
        TextEncoder::new().encode(&self.registry.gather(), &mut buffer)?;
        String::from_utf8(buffer).map_err(|e| prometheus::Error::Msg(e.to_string()))
    }
}
