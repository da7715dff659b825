//! Request authorization filter.
//!
//! Builds [`AttributesRecord`](crate::authorizer::AttributesRecord)s from
//! request extensions, asks the configured authorizer for a decision,
//! annotates the audit record, and then forwards the request or writes a
//! forbidden or internal-error response.

pub mod attributes;
pub mod audit;
pub mod layer;


pub use attributes::{authorizer_attributes, AttributesError};
pub use audit::{AuditRecorder, ContextAuditRecorder, DECISION_ANNOTATION_KEY, REASON_ANNOTATION_KEY};
pub use layer::{AuthzLayer, AuthzMiddleware};
