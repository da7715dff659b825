//! Trivial authorizers.

use super::{AttributesRecord, Authorizer, AuthorizerContext, AuthorizerResponse};
use async_trait::async_trait;

/// Allows every request.
#[derive(Debug, Default, Clone, Copy)]
pub struct AlwaysAllowAuthorizer;

#[async_trait]
impl Authorizer for AlwaysAllowAuthorizer {
    async fn authorize(
        &self,
        _ctx: &AuthorizerContext<'_>,
        _attributes: &AttributesRecord,
    ) -> AuthorizerResponse {
        AuthorizerResponse::allow("")
    }
}

/// Has no opinion on any request, so nothing is ever allowed by it.
#[derive(Debug, Default, Clone, Copy)]
pub struct AlwaysDenyAuthorizer;

impl AlwaysDenyAuthorizer {
    pub const REASON: &'static str = "Everything is forbidden.";
}

#[async_trait]
impl Authorizer for AlwaysDenyAuthorizer {
    async fn authorize(
        &self,
        _ctx: &AuthorizerContext<'_>,
        _attributes: &AttributesRecord,
    ) -> AuthorizerResponse {
        AuthorizerResponse::no_opinion(Self::REASON)
    }
}
