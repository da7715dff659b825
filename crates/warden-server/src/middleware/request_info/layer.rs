//! Request info middleware layer.

use super::{resolver::RequestInfoResolver, types::RequestInfo};
use crate::{authorizer::RequestDeadline, error::ApiError};
use axum::{
    body::Body,
    http::Request,
    response::{IntoResponse, Response},
};
use futures::future::BoxFuture;
use std::sync::Arc;
use std::task::{Context, Poll};
use std::time::Duration;
use tower::{Layer, Service};
use tracing::error;

/// Attaches [`RequestInfo`] (and optionally a [`RequestDeadline`]) to every
/// request.
#[derive(Clone)]
pub struct RequestInfoLayer {
    resolver: Arc<RequestInfoResolver>,
    timeout: Option<Duration>,
}

impl RequestInfoLayer {
    pub fn new(resolver: RequestInfoResolver) -> Self {
        Self {
            resolver: Arc::new(resolver),
            timeout: None,
        }
    }

    /// Record a deadline `timeout` after the request arrives.
    pub fn with_deadline(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }
}

impl Default for RequestInfoLayer {
    fn default() -> Self {
        Self::new(RequestInfoResolver::default())
    }
}

impl<S> Layer<S> for RequestInfoLayer {
    type Service = RequestInfoMiddleware<S>;

    fn layer(&self, inner: S) -> Self::Service {
        RequestInfoMiddleware {
            inner,
            resolver: self.resolver.clone(),
            timeout: self.timeout,
        }
    }
}

/// Request info middleware service.
#[derive(Clone)]
pub struct RequestInfoMiddleware<S> {
    inner: S,
    resolver: Arc<RequestInfoResolver>,
    timeout: Option<Duration>,
}

impl<S> Service<Request<Body>> for RequestInfoMiddleware<S>
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
        let resolved = self
            .resolver
            .resolve(req.method(), req.uri().path(), req.uri().query());
        let info: RequestInfo = match resolved {
            Ok(info) => info,
            Err(err) => {
                error!(uri = %req.uri(), error = %err, "Failed to create RequestInfo");
                let response = ApiError::Internal(anyhow::Error::new(err)).into_response();
                return Box::pin(async move { Ok(response) });
            }
        };

        req.extensions_mut().insert(info);
        if let Some(timeout) = self.timeout {
            req.extensions_mut().insert(RequestDeadline::after(timeout));
        }

        let mut inner = self.inner.clone();
        Box::pin(async move { inner.call(req).await })
    }
}
