//! Authentication types.

use crate::error::ApiError;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use thiserror::Error;

/// User name given to requests without credentials.
pub const ANONYMOUS_USER: &str = "system:anonymous";
/// Group of requests without credentials.
pub const UNAUTHENTICATED_GROUP: &str = "system:unauthenticated";
/// Group added to every authenticated user.
pub const AUTHENTICATED_GROUP: &str = "system:authenticated";

/// JWT claims structure.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Subject (user name).
    pub sub: String,
    /// Stable user identifier.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uid: Option<String>,
    /// Group memberships.
    #[serde(default)]
    pub groups: Vec<String>,
    /// Additional user attributes.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub extra: BTreeMap<String, Vec<String>>,
    /// Issuer.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub iss: Option<String>,
    /// Expiration timestamp.
    pub exp: i64,
}

impl Claims {
    /// Claims for `subject` expiring `expires_in` seconds from now.
    pub fn new(subject: impl Into<String>, groups: Vec<String>, expires_in: i64) -> Self {
        Self {
            sub: subject.into(),
            uid: None,
            groups,
            extra: BTreeMap::new(),
            iss: None,
            exp: Utc::now().timestamp() + expires_in,
        }
    }

    pub fn with_issuer(mut self, issuer: impl Into<String>) -> Self {
        self.iss = Some(issuer.into());
        self
    }

    /// Check if token is expired.
    pub fn is_expired(&self) -> bool {
        Utc::now().timestamp() > self.exp
    }
}

/// Authentication failures. Each one rejects the request with 401.
#[derive(Debug, Error)]
pub enum AuthnError {
    #[error("token has expired")]
    TokenExpired,

    #[error("invalid bearer token: {0}")]
    InvalidToken(#[source] jsonwebtoken::errors::Error),

    #[error("token has no subject")]
    MissingSubject,

    #[error("malformed authorization header")]
    MalformedHeader,
}

impl From<jsonwebtoken::errors::Error> for AuthnError {
    fn from(err: jsonwebtoken::errors::Error) -> Self {
        match err.kind() {
            jsonwebtoken::errors::ErrorKind::ExpiredSignature => AuthnError::TokenExpired,
            _ => AuthnError::InvalidToken(err),
        }
    }
}

impl From<AuthnError> for ApiError {
    fn from(err: AuthnError) -> Self {
        match err {
            AuthnError::TokenExpired => ApiError::TokenExpired,
            AuthnError::InvalidToken(_) | AuthnError::MissingSubject => ApiError::InvalidToken,
            AuthnError::MalformedHeader => ApiError::Unauthorized,
        }
    }
}
