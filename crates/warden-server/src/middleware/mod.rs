//! Middleware for the Warden API server.
//!
//! Layers run in this order for every request: request info resolution,
//! authentication, auditing, then authorization.

pub mod audit;
pub mod authn;
pub mod authz;
pub mod request_info;

pub use audit::{AuditLayer, AuditMiddleware, AUDIT_ID_HEADER};
pub use authn::{AuthnLayer, AuthnMiddleware};
pub use authz::{AuthzLayer, AuthzMiddleware};
pub use request_info::{RequestInfo, RequestInfoLayer, RequestInfoMiddleware, RequestInfoResolver};
