//! Routing metadata types.

use serde::Serialize;
use thiserror::Error;

/// What a request targets, derived from its method, path and query.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RequestInfo {
    /// `false` for raw paths such as `/healthz`.
    pub is_resource_request: bool,
    /// Request path without the query string.
    pub path: String,
    /// Kubernetes verb (`get`, `list`, `create`, ...), or the lower-cased
    /// HTTP method for non-resource requests.
    pub verb: String,
    pub api_prefix: String,
    pub api_group: String,
    pub api_version: String,
    pub namespace: String,
    pub resource: String,
    pub subresource: String,
    pub name: String,
    /// Path segments starting at the resource.
    pub parts: Vec<String>,
}

impl RequestInfo {
    /// Info for a request that does not address an API resource.
    pub fn non_resource(path: impl Into<String>, verb: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            verb: verb.into(),
            ..Default::default()
        }
    }
}

/// Errors raised while resolving request info.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum RequestInfoError {
    #[error("unable to determine kind and namespace from url {0}")]
    MissingResource(String),
}
