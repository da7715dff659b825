//! Failure responses.

pub mod negotiation;
pub mod status;
pub mod writer;

pub use negotiation::MediaType;
pub use status::{Status, StatusDetails, StatusReason};
pub use writer::{forbidden_message, forbidden_status, internal_error_status, ResponseWriter, StatusResponseWriter};
