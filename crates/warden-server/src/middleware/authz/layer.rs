//! Authorization middleware layer.

use super::audit::{annotate_allow, annotate_error, annotate_forbid, AuditRecorder, ContextAuditRecorder};
use crate::{
    authorizer::{AttributesRecord, Authorizer, AuthorizerContext, AuthorizerResponse, Decision},
    metrics::{AuthorizationMetrics, AuthorizationMetricsGuard, NoopAuthorizationMetrics},
    response::{ResponseWriter, StatusResponseWriter},
};
use axum::{body::Body, http::Request, response::Response};
use futures::future::{BoxFuture, Either};
use std::sync::Arc;
use std::task::{Context, Poll};
use tower::{Layer, Service};
use tracing::{debug, error, warn};
use warden_common_log::spans::{authorize_span, instrument_future};
use warden_audit::AuditContext;

/// Authorization layer configuration.
///
/// Without an authorizer the layer is a passthrough.
#[derive(Clone)]
pub struct AuthzLayer {
    authorizer: Option<Arc<dyn Authorizer>>,
    metrics: Arc<dyn AuthorizationMetrics>,
    writer: Arc<dyn ResponseWriter>,
    recorder: Arc<dyn AuditRecorder>,
}

impl AuthzLayer {
    pub fn new(authorizer: Option<Arc<dyn Authorizer>>) -> Self {
        if authorizer.is_none() {
            warn!("Authorization is disabled");
        }
        Self {
            authorizer,
            metrics: Arc::new(NoopAuthorizationMetrics),
            writer: Arc::new(StatusResponseWriter),
            recorder: Arc::new(ContextAuditRecorder),
        }
    }

    /// Record every authorization attempt with `metrics`.
    pub fn with_metrics(mut self, metrics: Arc<dyn AuthorizationMetrics>) -> Self {
        self.metrics = metrics;
        self
    }

    /// Render rejections with `writer`.
    pub fn with_response_writer(mut self, writer: Arc<dyn ResponseWriter>) -> Self {
        self.writer = writer;
        self
    }

    /// Write decision annotations with `recorder`.
    pub fn with_audit_recorder(mut self, recorder: Arc<dyn AuditRecorder>) -> Self {
        self.recorder = recorder;
        self
    }

    pub fn is_enabled(&self) -> bool {
        self.authorizer.is_some()
    }
}

impl<S> Layer<S> for AuthzLayer {
    type Service = AuthzMiddleware<S>;

    fn layer(&self, inner: S) -> Self::Service {
        AuthzMiddleware {
            inner,
            authorizer: self.authorizer.clone(),
            metrics: self.metrics.clone(),
            writer: self.writer.clone(),
            recorder: self.recorder.clone(),
        }
    }
}

/// Authorization middleware service.
#[derive(Clone)]
pub struct AuthzMiddleware<S> {
    inner: S,
    authorizer: Option<Arc<dyn Authorizer>>,
    metrics: Arc<dyn AuthorizationMetrics>,
    writer: Arc<dyn ResponseWriter>,
    recorder: Arc<dyn AuditRecorder>,
}

impl<S> Service<Request<Body>> for AuthzMiddleware<S>
where
    S: Service<Request<Body>, Response = Response> + Clone + Send + 'static,
    S::Future: Send + 'static,
    S::Error: Send + 'static,
{
    type Response = Response;
    type Error = S::Error;
    type Future = Either<S::Future, BoxFuture<'static, Result<Response, S::Error>>>;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, req: Request<Body>) -> Self::Future {
        let Some(authorizer) = self.authorizer.clone() else {
            return Either::Left(self.inner.call(req));
        };
        let metrics = self.metrics.clone();
        let writer = self.writer.clone();
        let recorder = self.recorder.clone();
        let mut inner = self.inner.clone();

        Either::Right(Box::pin(async move {
            let attributes = match AttributesRecord::from_extensions(req.extensions()) {
                Ok(attributes) => attributes,
                Err(err) => {
                    error!(uri = %req.uri(), error = %err, "Failed to build authorizer attributes");
                    return Ok(writer.internal_error(&req, &anyhow::Error::new(err)));
                }
            };

            let audit = req.extensions().get::<AuditContext>().cloned();

            let mut timing = AuthorizationMetricsGuard::start(metrics);
            let mut pending = PendingDecision {
                recorder: recorder.clone(),
                audit: audit.clone(),
                armed: true,
            };
            let AuthorizerResponse {
                decision,
                reason,
                error,
            } = instrument_future(
                authorizer.authorize(&AuthorizerContext::new(req.extensions()), &attributes),
                authorize_span(&attributes.verb, &attributes.resource, &attributes.namespace),
            )
            .await;
            timing.finish(decision, error.as_ref().map(|e| format!("{:#}", e)));
            pending.armed = false;

            if decision == Decision::Allow {
                if let Some(err) = &error {
                    debug!(
                        user = %attributes.user_name(),
                        verb = %attributes.verb,
                        error = %format!("{:#}", err),
                        "Authorizer allowed the request with an evaluation error"
                    );
                }
                annotate_allow(recorder.as_ref(), audit.as_ref(), &reason);
                return inner.call(req).await;
            }

            if let Some(err) = error {
                error!(
                    uri = %req.uri(),
                    user = %attributes.user_name(),
                    decision = %decision,
                    error = %format!("{:#}", err),
                    "Authorization failed"
                );
                annotate_error(recorder.as_ref(), audit.as_ref());
                return Ok(writer.internal_error(&req, &err));
            }

            debug!(uri = %req.uri(), reason = %reason, "Forbidden");
            annotate_forbid(recorder.as_ref(), audit.as_ref(), &reason);
            Ok(writer.forbidden(&req, &attributes, &reason))
        }))
    }
}

/// Annotates the audit record as an internal error if dropped before the
/// authorizer returned.
struct PendingDecision {
    recorder: Arc<dyn AuditRecorder>,
    audit: Option<AuditContext>,
    armed: bool,
}

impl Drop for PendingDecision {
    fn drop(&mut self) {
        if !self.armed {
            return;
        }
        warn!("Request dropped while awaiting an authorization decision");
        annotate_error(self.recorder.as_ref(), self.audit.as_ref());
    }
}
