//! Authentication middleware layer.

use super::{
    header::RequestHeaderAuthenticator,
    jwt::TokenAuthenticator,
    types::{AuthnError, ANONYMOUS_USER, AUTHENTICATED_GROUP, UNAUTHENTICATED_GROUP},
};
use crate::{authorizer::UserInfo, config::AuthenticationConfig, error::ApiError};
use axum::{
    body::Body,
    http::{header, HeaderMap, Request},
    response::{IntoResponse, Response},
};
use futures::future::BoxFuture;
use std::sync::Arc;
use std::task::{Context, Poll};
use tower::{Layer, Service};
use tracing::debug;

#[derive(Default)]
struct Authenticators {
    request_header: Option<RequestHeaderAuthenticator>,
    token: Option<TokenAuthenticator>,
    anonymous: bool,
}

/// Authentication layer configuration.
///
/// Attaches a [`UserInfo`] to every request that carries valid
/// credentials, or an anonymous one when anonymous access is enabled.
/// Invalid credentials are rejected with 401.
#[derive(Clone, Default)]
pub struct AuthnLayer {
    authenticators: Arc<Authenticators>,
}

impl AuthnLayer {
    pub fn new(config: &AuthenticationConfig) -> Self {
        Self {
            authenticators: Arc::new(Authenticators {
                request_header: config
                    .request_header
                    .enabled
                    .then(|| RequestHeaderAuthenticator::new(&config.request_header)),
                token: config
                    .token
                    .jwt_secret
                    .as_deref()
                    .map(|secret| TokenAuthenticator::new(secret, config.token.issuer.as_deref())),
                anonymous: config.anonymous,
            }),
        }
    }
}

impl<S> Layer<S> for AuthnLayer {
    type Service = AuthnMiddleware<S>;

    fn layer(&self, inner: S) -> Self::Service {
        AuthnMiddleware {
            inner,
            authenticators: self.authenticators.clone(),
        }
    }
}

/// Authentication middleware service.
#[derive(Clone)]
pub struct AuthnMiddleware<S> {
    inner: S,
    authenticators: Arc<Authenticators>,
}

impl<S> Service<Request<Body>> for AuthnMiddleware<S>
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
        match self.authenticators.authenticate(req.headers_mut()) {
            Ok(Some(user)) => {
                req.extensions_mut().insert(user);
            }
            Ok(None) => {}
            Err(err) => {
                debug!(uri = %req.uri(), error = %err, "Unable to authenticate the request");
                let response = ApiError::from(err).into_response();
                return Box::pin(async move { Ok(response) });
            }
        }

        let mut inner = self.inner.clone();
        Box::pin(async move { inner.call(req).await })
    }
}

impl Authenticators {
    fn authenticate(&self, headers: &mut HeaderMap) -> Result<Option<UserInfo>, AuthnError> {
        if let Some(authenticator) = &self.request_header {
            if let Some(user) = authenticator.authenticate(headers) {
                return Ok(Some(with_authenticated_group(user)));
            }
        }

        if let Some(authenticator) = &self.token {
            if let Some(token) = bearer_token(headers)? {
                let user = authenticator.authenticate(&token)?;
                headers.remove(header::AUTHORIZATION);
                return Ok(Some(with_authenticated_group(user)));
            }
        }

        if self.anonymous {
            return Ok(Some(UserInfo::new(
                ANONYMOUS_USER,
                vec![UNAUTHENTICATED_GROUP.to_string()],
            )));
        }

        Ok(None)
    }
}

fn with_authenticated_group(mut user: UserInfo) -> UserInfo {
    if !user.in_group(AUTHENTICATED_GROUP) {
        user.groups.push(AUTHENTICATED_GROUP.to_string());
    }
    user
}

fn bearer_token(headers: &HeaderMap) -> Result<Option<String>, AuthnError> {
    let Some(value) = headers.get(header::AUTHORIZATION) else {
        return Ok(None);
    };
    let value = value.to_str().map_err(|_| AuthnError::MalformedHeader)?;

    match value.split_once(' ') {
        Some((scheme, token)) if scheme.eq_ignore_ascii_case("bearer") => {
            let token = token.trim();
            if token.is_empty() {
                Err(AuthnError::MalformedHeader)
            } else {
                Ok(Some(token.to_string()))
            }
        }
        // other schemes are not ours to judge
        _ => Ok(None),
    }
}
