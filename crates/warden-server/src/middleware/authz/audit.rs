//! Audit annotations for authorization outcomes.

use warden_audit::AuditContext;

/// Annotation key holding the decision.
pub const DECISION_ANNOTATION_KEY: &str = "authorization.k8s.io/decision";
/// Annotation key holding the reason.
pub const REASON_ANNOTATION_KEY: &str = "authorization.k8s.io/reason";

/// Decision value for an allowed request.
pub const DECISION_ALLOW: &str = "allow";
/// Decision value for a rejected request.
pub const DECISION_FORBID: &str = "forbid";
/// Reason recorded when the decision could not be made.
pub const REASON_ERROR: &str = "internal error";

/// Writes authorization annotations to a request's audit record.
pub trait AuditRecorder: Send + Sync {
    fn annotate<'a>(&self, audit: Option<&AuditContext>, annotations: &[(&'a str, &'a str)]);
}

/// Appends to the [`AuditContext`] found in the request extensions.
/// Requests without one are not audited.
#[derive(Debug, Default, Clone, Copy)]
pub struct ContextAuditRecorder;

impl AuditRecorder for ContextAuditRecorder {
    fn annotate<'a>(&self, audit: Option<&AuditContext>, annotations: &[(&'a str, &'a str)]) {
        if let Some(audit) = audit {
            audit.add_annotations(annotations.iter().copied());
        }
    }
}

/// Annotate an allowed request.
pub fn annotate_allow(recorder: &dyn AuditRecorder, audit: Option<&AuditContext>, reason: &str) {
    recorder.annotate(
        audit,
        &[
            (DECISION_ANNOTATION_KEY, DECISION_ALLOW),
            (REASON_ANNOTATION_KEY, reason),
        ],
    );
}

/// Annotate a forbidden request.
pub fn annotate_forbid(recorder: &dyn AuditRecorder, audit: Option<&AuditContext>, reason: &str) {
    recorder.annotate(
        audit,
        &[
            (DECISION_ANNOTATION_KEY, DECISION_FORBID),
            (REASON_ANNOTATION_KEY, reason),
        ],
    );
}

/// Annotate a request whose authorization failed. No decision is recorded.
pub fn annotate_error(recorder: &dyn AuditRecorder, audit: Option<&AuditContext>) {
    recorder.annotate(audit, &[(REASON_ANNOTATION_KEY, REASON_ERROR)]);
}
