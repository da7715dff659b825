//! Catch-all handler for `/api` and `/apis`.
//!
//! There is no storage behind these paths. Requests that make it past
//! authorization are answered with the routing and identity metadata the
//! middleware attached, which is what callers and tests inspect.

use crate::{authorizer::UserInfo, middleware::RequestInfo};
use axum::{Extension, Json};
use serde_json::{json, Value};
use warden_audit::AuditContext;

pub(super) async fn resource_handler(
    info: Option<Extension<RequestInfo>>,
    user: Option<Extension<UserInfo>>,
    audit: Option<Extension<AuditContext>>,
) -> Json<Value> {
    Json(json!({
        "requestInfo": info.map(|Extension(info)| info),
        "user": user.map(|Extension(user)| user),
        "auditID": audit.map(|Extension(audit)| audit.audit_id().to_string()),
    }))
}
