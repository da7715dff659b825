//! Authorizer attribute extraction.

use crate::authorizer::{AttributesRecord, UserInfo};
use crate::middleware::request_info::RequestInfo;
use axum::http::Extensions;
use thiserror::Error;

/// Errors raised while building authorizer attributes.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum AttributesError {
    /// The request info stage did not run before authorization.
    #[error("no RequestInfo found in the context")]
    MissingRequestInfo,
}

impl AttributesRecord {
    /// Build the attributes for a request from its extensions.
    ///
    /// A missing [`UserInfo`] yields an anonymous record; a missing
    /// [`RequestInfo`] is an error.
    pub fn from_extensions(extensions: &Extensions) -> Result<Self, AttributesError> {
        let info = extensions
            .get::<RequestInfo>()
            .ok_or(AttributesError::MissingRequestInfo)?;

        Ok(Self {
            user: extensions.get::<UserInfo>().cloned(),
            resource_request: info.is_resource_request,
            verb: info.verb.clone(),
            api_group: info.api_group.clone(),
            api_version: info.api_version.clone(),
            resource: info.resource.clone(),
            subresource: info.subresource.clone(),
            namespace: info.namespace.clone(),
            name: info.name.clone(),
            path: info.path.clone(),
        })
    }
}

/// Build the attributes for a request from its extensions.
pub fn authorizer_attributes(extensions: &Extensions) -> Result<AttributesRecord, AttributesError> {
    AttributesRecord::from_extensions(extensions)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pods_info() -> RequestInfo {
        RequestInfo {
            is_resource_request: true,
            path: "/apis/apps/v1/namespaces/default/deployments/web/scale".into(),
            verb: "update".into(),
            api_prefix: "apis".into(),
            api_group: "apps".into(),
            api_version: "v1".into(),
            namespace: "default".into(),
            resource: "deployments".into(),
            subresource: "scale".into(),
            name: "web".into(),
            parts: vec!["deployments".into(), "web".into(), "scale".into()],
        }
    }

    #[test]
    fn test_copies_request_info_and_user() {
        let mut extensions = Extensions::new();
        extensions.insert(pods_info());
        extensions.insert(UserInfo::new("alice", vec!["dev".into()]));

        let record = authorizer_attributes(&extensions).unwrap();
        assert_eq!(record.user_name(), "alice");
        assert!(record.resource_request);
        assert_eq!(record.verb, "update");
        assert_eq!(record.api_group, "apps");
        assert_eq!(record.api_version, "v1");
        assert_eq!(record.resource, "deployments");
        assert_eq!(record.subresource, "scale");
        assert_eq!(record.namespace, "default");
        assert_eq!(record.name, "web");
        assert_eq!(record.path, "/apis/apps/v1/namespaces/default/deployments/web/scale");
    }

    #[test]
    fn test_missing_user_is_anonymous() {
        let mut extensions = Extensions::new();
        extensions.insert(RequestInfo::non_resource("/healthz", "get"));

        let record = AttributesRecord::from_extensions(&extensions).unwrap();
        assert!(record.user.is_none());
        assert!(!record.resource_request);
        assert_eq!(record.path, "/healthz");
    }

    #[test]
    fn test_missing_request_info_fails() {
        let mut extensions = Extensions::new();
        extensions.insert(UserInfo::new("alice", vec![]));

        let err = AttributesRecord::from_extensions(&extensions).unwrap_err();
        assert_eq!(err, AttributesError::MissingRequestInfo);
        assert_eq!(err.to_string(), "no RequestInfo found in the context");
    }
}
