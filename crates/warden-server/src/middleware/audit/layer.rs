//! Audit middleware layer.

use crate::{authorizer::UserInfo, middleware::request_info::RequestInfo};
use axum::{
    body::Body,
    extract::ConnectInfo,
    http::{header, HeaderValue, Request},
    response::Response,
};
use futures::future::BoxFuture;
use std::net::SocketAddr;
use std::task::{Context, Poll};
use tower::{Layer, Service};
use tracing::debug;
use warden_audit::{AuditCapture, AuditContext, AuditEvent, AuditId, AuditStage, AuditUser, ObjectReference};

/// Header carrying the request's audit identifier, in both directions.
pub const AUDIT_ID_HEADER: &str = "audit-id";

/// Creates an [`AuditContext`] for every request and submits the finished
/// record once the response is produced.
#[derive(Clone)]
pub struct AuditLayer {
    capture: AuditCapture,
}

impl AuditLayer {
    pub fn new(capture: AuditCapture) -> Self {
        Self { capture }
    }
}

impl<S> Layer<S> for AuditLayer {
    type Service = AuditMiddleware<S>;

    fn layer(&self, inner: S) -> Self::Service {
        AuditMiddleware {
            inner,
            capture: self.capture.clone(),
        }
    }
}

/// Audit middleware service.
#[derive(Clone)]
pub struct AuditMiddleware<S> {
    inner: S,
    capture: AuditCapture,
}

impl<S> Service<Request<Body>> for AuditMiddleware<S>
where
    S: Service<Request<Body>, Response = Response> + Clone + Send + 'static,
    S::Future: Send + 'static,
{
    type Response = Response;
    type Error = S::Error;
    type Future = BoxFuture<'static, Result<Self::Response, Self::Error>>;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, mut req: Request<Body>) -> Self::Future {
        let context = AuditContext::new(event_for(&req));
        let audit_id = context.audit_id();
        req.extensions_mut().insert(context.clone());

        let mut completion = Completion {
            context,
            capture: self.capture.clone(),
            done: false,
        };
        let mut inner = self.inner.clone();

        Box::pin(async move {
            let mut response = inner.call(req).await?;
            if let Ok(value) = HeaderValue::from_str(&audit_id.to_string()) {
                response.headers_mut().insert(AUDIT_ID_HEADER, value);
            }
            completion.finish(response.status().as_u16());
            Ok(response)
        })
    }
}

/// Submits the record exactly once. A request that never produced a
/// response is recorded at the `Panic` stage.
struct Completion {
    context: AuditContext,
    capture: AuditCapture,
    done: bool,
}

impl Completion {
    fn finish(&mut self, code: u16) {
        self.done = true;
        self.capture
            .record(self.context.complete(AuditStage::ResponseComplete, code));
    }
}

impl Drop for Completion {
    fn drop(&mut self) {
        if !self.done {
            debug!(audit_id = %self.context.audit_id(), "Request ended without a response");
            self.capture.record(self.context.complete(AuditStage::Panic, 500));
        }
    }
}

fn event_for(req: &Request<Body>) -> AuditEvent {
    let extensions = req.extensions();
    let headers = req.headers();
    let mut builder = AuditEvent::builder(
        extensions
            .get::<RequestInfo>()
            .map(|info| info.verb.clone())
            .unwrap_or_else(|| req.method().as_str().to_lowercase()),
        req.uri().to_string(),
    );

    if let Some(id) = headers
        .get(AUDIT_ID_HEADER)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.parse::<AuditId>().ok())
    {
        builder = builder.audit_id(id);
    }

    if let Some(user) = extensions.get::<UserInfo>() {
        builder = builder.user(AuditUser {
            username: user.name.clone(),
            uid: user.uid.clone(),
            groups: user.groups.clone(),
        });
    }

    if let Some(info) = extensions.get::<RequestInfo>().filter(|i| i.is_resource_request) {
        builder = builder.object_ref(ObjectReference {
            resource: info.resource.clone(),
            namespace: info.namespace.clone(),
            name: info.name.clone(),
            api_group: info.api_group.clone(),
            api_version: info.api_version.clone(),
            subresource: info.subresource.clone(),
        });
    }

    if let Some(forwarded) = headers.get("x-forwarded-for").and_then(|v| v.to_str().ok()) {
        for ip in forwarded.split(',').map(str::trim).filter(|ip| !ip.is_empty()) {
            builder = builder.source_ip(ip);
        }
    }
    if let Some(ConnectInfo(addr)) = extensions.get::<ConnectInfo<SocketAddr>>() {
        builder = builder.source_ip(addr.ip().to_string());
    }

    if let Some(agent) = headers.get(header::USER_AGENT).and_then(|v| v.to_str().ok()) {
        builder = builder.user_agent(agent);
    }

    builder.build()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::middleware::request_info::RequestInfoLayer;
    use axum::{http::StatusCode, routing::get, Extension, Router};
    use tokio::sync::mpsc;
    use tower::ServiceExt;
    use warden_audit::CaptureConfig;

    async fn exploding() -> &'static str {
        panic!("handler exploded")
    }

    fn app() -> (Router, mpsc::Receiver<AuditEvent>) {
        let (capture, receiver) = AuditCapture::new(CaptureConfig::default());
        let router = Router::new()
            .route(
                "/api/v1/namespaces/:ns/pods/:name",
                get(|Extension(audit): Extension<AuditContext>| async move {
                    audit.add_annotation("handler/seen", "true");
                    "ok"
                }),
            )
            .route(
                "/boom",
                get(exploding),
            )
            .layer(AuditLayer::new(capture))
            .layer(RequestInfoLayer::default());
        (router, receiver)
    }

    #[tokio::test]
    async fn test_records_completed_request() {
        let (app, mut receiver) = app();
        let mut req = Request::builder()
            .uri("/api/v1/namespaces/default/pods/web")
            .header("User-Agent", "kubectl/v1.30")
            .header("X-Forwarded-For", "10.0.0.1, 10.0.0.2")
            .body(Body::empty())
            .unwrap();
        req.extensions_mut()
            .insert(UserInfo::new("alice", vec!["dev".into()]));

        let response = app.oneshot(req).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let event = receiver.recv().await.unwrap();
        assert_eq!(event.stage, AuditStage::ResponseComplete);
        assert_eq!(event.response_code, Some(200));
        assert_eq!(event.verb, "get");
        assert_eq!(event.user.unwrap().username, "alice");
        assert_eq!(event.source_ips, vec!["10.0.0.1", "10.0.0.2"]);
        assert_eq!(event.user_agent.as_deref(), Some("kubectl/v1.30"));
        let object = event.object_ref.unwrap();
        assert_eq!(object.resource, "pods");
        assert_eq!(object.namespace, "default");
        assert_eq!(object.name, "web");
        assert_eq!(event.annotations.get("handler/seen").map(String::as_str), Some("true"));
        assert_eq!(
            response.headers().get(AUDIT_ID_HEADER).unwrap(),
            event.audit_id.to_string().as_str()
        );
    }

    #[tokio::test]
    async fn test_reuses_client_audit_id() {
        let (app, mut receiver) = app();
        let id = AuditId::new();
        let req = Request::builder()
            .uri("/api/v1/namespaces/default/pods/web")
            .header(AUDIT_ID_HEADER, id.to_string())
            .body(Body::empty())
            .unwrap();

        app.oneshot(req).await.unwrap();
        assert_eq!(receiver.recv().await.unwrap().audit_id, id);
    }

    #[tokio::test]
    async fn test_non_resource_request_has_no_object_ref() {
        let (app, mut receiver) = app();
        let req = Request::builder().uri("/missing").body(Body::empty()).unwrap();

        let response = app.oneshot(req).await.unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);

        let event = receiver.recv().await.unwrap();
        assert!(event.object_ref.is_none());
        assert_eq!(event.response_code, Some(404));
    }

    #[tokio::test]
    async fn test_panic_is_recorded() {
        let (app, mut receiver) = app();
        let req = Request::builder().uri("/boom").body(Body::empty()).unwrap();

        let handle = tokio::spawn(app.oneshot(req));
        assert!(handle.await.unwrap_err().is_panic());

        let event = receiver.recv().await.unwrap();
        assert_eq!(event.stage, AuditStage::Panic);
        assert_eq!(event.response_code, Some(500));
    }
}
