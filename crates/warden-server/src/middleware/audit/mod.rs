//! Request auditing middleware.

pub mod layer;

pub use layer::{AuditLayer, AuditMiddleware, AUDIT_ID_HEADER};
