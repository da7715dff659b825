//! Authorization decisions.
//!
//! An [`Authorizer`] maps an [`AttributesRecord`] to a [`Decision`]. Policy
//! engines plug in here; the server ships only the trivial
//! [`AlwaysAllowAuthorizer`] and [`AlwaysDenyAuthorizer`] and the
//! [`UnionAuthorizer`] that chains several authorizers.

mod builtin;
mod context;
mod types;
mod union;

pub use builtin::{AlwaysAllowAuthorizer, AlwaysDenyAuthorizer};
pub use context::{AuthorizerContext, RequestDeadline};
pub use types::{AttributesRecord, AuthorizerResponse, Decision, UserInfo};
pub use union::UnionAuthorizer;

use crate::config::{AuthorizationConfig, AuthorizationMode};
use async_trait::async_trait;
use std::sync::Arc;

/// Decides whether a request may proceed.
///
/// Implementations are shared across all in-flight requests and must not
/// block indefinitely.
#[async_trait]
pub trait Authorizer: Send + Sync {
    async fn authorize(
        &self,
        ctx: &AuthorizerContext<'_>,
        attributes: &AttributesRecord,
    ) -> AuthorizerResponse;
}

#[async_trait]
impl<A: Authorizer + ?Sized> Authorizer for Arc<A> {
    async fn authorize(
        &self,
        ctx: &AuthorizerContext<'_>,
        attributes: &AttributesRecord,
    ) -> AuthorizerResponse {
        (**self).authorize(ctx, attributes).await
    }
}

/// Build the configured authorizer chain.
///
/// Returns `None` when no mode is configured, which disables
/// authorization.
pub fn build_authorizer(config: &AuthorizationConfig) -> Option<Arc<dyn Authorizer>> {
    let mut authorizers: Vec<Arc<dyn Authorizer>> = config
        .modes
        .iter()
        .map(|mode| -> Arc<dyn Authorizer> {
            match mode {
                AuthorizationMode::AlwaysAllow => Arc::new(AlwaysAllowAuthorizer),
                AuthorizationMode::AlwaysDeny => Arc::new(AlwaysDenyAuthorizer),
            }
        })
        .collect();

    match authorizers.len() {
        0 => None,
        1 => authorizers.pop(),
        _ => Some(Arc::new(UnionAuthorizer::new(authorizers))),
    }
}
