//! Rejection responses for the authorization filter.

use super::{
    negotiation::MediaType,
    status::{Status, StatusDetails, StatusReason},
};
use crate::authorizer::AttributesRecord;
use axum::{
    body::Body,
    http::{Request, StatusCode},
    response::Response,
};

/// Produces the responses the authorization filter sends instead of
/// forwarding a request.
pub trait ResponseWriter: Send + Sync {
    /// The caller may not perform the request.
    fn forbidden(&self, req: &Request<Body>, attributes: &AttributesRecord, reason: &str) -> Response;

    /// The request could not be evaluated. `error` is for logging only and
    /// must not appear in the response.
    fn internal_error(&self, req: &Request<Body>, error: &anyhow::Error) -> Response;
}

/// Writes [`Status`] objects encoded as the client asked for.
#[derive(Debug, Default, Clone, Copy)]
pub struct StatusResponseWriter;

impl ResponseWriter for StatusResponseWriter {
    fn forbidden(&self, req: &Request<Body>, attributes: &AttributesRecord, reason: &str) -> Response {
        forbidden_status(attributes, reason).into_negotiated_response(MediaType::negotiate(req.headers()))
    }

    fn internal_error(&self, req: &Request<Body>, _error: &anyhow::Error) -> Response {
        internal_error_status(&req.uri().to_string())
            .into_negotiated_response(MediaType::negotiate(req.headers()))
    }
}

/// The 403 status for `attributes`.
pub fn forbidden_status(attributes: &AttributesRecord, reason: &str) -> Status {
    let message = forbidden_message(attributes);
    let cause = if reason.is_empty() {
        message
    } else {
        format!("{}: {}", message, reason)
    };

    let qualified = qualified_resource(&attributes.resource, &attributes.api_group);
    let message = match (qualified.is_empty(), attributes.name.is_empty()) {
        (true, _) => format!("forbidden: {}", cause),
        (false, true) => format!("{} is forbidden: {}", qualified, cause),
        (false, false) => format!("{} {:?} is forbidden: {}", qualified, attributes.name, cause),
    };

    Status::failure(StatusCode::FORBIDDEN, StatusReason::Forbidden, message).with_details(
        StatusDetails {
            name: attributes.name.clone(),
            group: attributes.api_group.clone(),
            kind: attributes.resource.clone(),
        },
    )
}

/// The 500 status for a request that could not be evaluated.
pub fn internal_error_status(request_uri: &str) -> Status {
    Status::failure(
        StatusCode::INTERNAL_SERVER_ERROR,
        StatusReason::InternalError,
        format!("Internal Server Error: {:?}", request_uri),
    )
}

/// Human-readable description of what was refused.
pub fn forbidden_message(attributes: &AttributesRecord) -> String {
    let user = attributes.user_name();

    if !attributes.resource_request {
        return format!(
            "User {:?} cannot {} path {:?}",
            user, attributes.verb, attributes.path
        );
    }

    let resource = if attributes.subresource.is_empty() {
        attributes.resource.clone()
    } else {
        format!("{}/{}", attributes.resource, attributes.subresource)
    };

    if attributes.namespace.is_empty() {
        format!(
            "User {:?} cannot {} resource {:?} in API group {:?} at the cluster scope",
            user, attributes.verb, resource, attributes.api_group
        )
    } else {
        format!(
            "User {:?} cannot {} resource {:?} in API group {:?} in the namespace {:?}",
            user, attributes.verb, resource, attributes.api_group, attributes.namespace
        )
    }
}

fn qualified_resource(resource: &str, group: &str) -> String {
    if group.is_empty() {
        resource.to_string()
    } else {
        format!("{}.{}", resource, group)
    }
}
