//! Request auditing for Warden.
//!
//! Each request gets an [`AuditContext`] wrapping one [`AuditEvent`].
//! Middleware attaches annotations to it while the request is processed;
//! once the response is known the event is completed and handed to an
//! [`AuditCapture`], which forwards it without blocking to a background
//! task draining into an [`AuditSink`].

mod capture;
mod context;
mod event;
mod id;
mod sink;

pub use capture::{AuditCapture, CaptureConfig};
pub use context::AuditContext;
pub use event::{AuditEvent, AuditEventBuilder, AuditStage, AuditUser, ObjectReference};
pub use id::AuditId;
pub use sink::{run_sink, AuditError, AuditSink, LogSink, MemorySink};
