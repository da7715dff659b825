//! Authorization input and output types.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Identity of an authenticated (or anonymous) caller.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserInfo {
    /// User name.
    pub name: String,
    /// Stable identifier, empty when the authenticator has none.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub uid: String,
    /// Group memberships.
    #[serde(default)]
    pub groups: Vec<String>,
    /// Additional authenticator-provided attributes.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub extra: BTreeMap<String, Vec<String>>,
}

impl UserInfo {
    /// Create a user with a name and groups.
    pub fn new(name: impl Into<String>, groups: Vec<String>) -> Self {
        Self {
            name: name.into(),
            groups,
            ..Default::default()
        }
    }

    /// Check group membership.
    pub fn in_group(&self, group: &str) -> bool {
        self.groups.iter().any(|g| g == group)
    }
}

/// Everything an authorizer needs to know about one request.
///
/// Built once per request and only ever shared by reference.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AttributesRecord {
    /// Caller identity; `None` for a request that carries no identity.
    pub user: Option<UserInfo>,
    /// Whether the request targets an API resource (as opposed to a raw path).
    pub resource_request: bool,
    pub verb: String,
    pub api_group: String,
    pub api_version: String,
    pub resource: String,
    pub subresource: String,
    pub namespace: String,
    pub name: String,
    pub path: String,
}

impl AttributesRecord {
    /// Caller name, or an empty string when there is no identity.
    pub fn user_name(&self) -> &str {
        self.user.as_ref().map(|u| u.name.as_str()).unwrap_or("")
    }
}

/// Outcome of an authorization check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Decision {
    /// The request may proceed.
    Allow,
    /// The request is explicitly rejected.
    Deny,
    /// The authorizer has no rule covering the request.
    NoOpinion,
}

impl Decision {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Allow => "allow",
            Self::Deny => "deny",
            Self::NoOpinion => "no-opinion",
        }
    }
}

impl fmt::Display for Decision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Result of [`Authorizer::authorize`](super::Authorizer::authorize).
///
/// The error is independent of the decision: an authorizer may allow a
/// request and still report that part of its evaluation failed.
#[derive(Debug)]
pub struct AuthorizerResponse {
    pub decision: Decision,
    pub reason: String,
    pub error: Option<anyhow::Error>,
}

impl AuthorizerResponse {
    pub fn new(decision: Decision, reason: impl Into<String>) -> Self {
        Self {
            decision,
            reason: reason.into(),
            error: None,
        }
    }

    pub fn allow(reason: impl Into<String>) -> Self {
        Self::new(Decision::Allow, reason)
    }

    pub fn deny(reason: impl Into<String>) -> Self {
        Self::new(Decision::Deny, reason)
    }

    pub fn no_opinion(reason: impl Into<String>) -> Self {
        Self::new(Decision::NoOpinion, reason)
    }

    /// Attach an evaluation error.
    pub fn with_error(mut self, error: anyhow::Error) -> Self {
        self.error = Some(error);
        self
    }

    /// Whether the request may proceed. An attached error does not change this.
    pub fn is_allowed(&self) -> bool {
        self.decision == Decision::Allow
    }
}
