//! Tracing spans shared by the server middleware.

use std::future::Future;
use tracing::{debug_span, Instrument, Span};

/// Span wrapping a single policy evaluation.
pub fn authorize_span(verb: &str, resource: &str, namespace: &str) -> Span {
    debug_span!("authorize", verb = %verb, resource = %resource, namespace = %namespace)
}

/// Span wrapping an audit sink write.
pub fn audit_span(audit_id: &str) -> Span {
    debug_span!("audit", audit_id = %audit_id)
}

/// Instrument a future with a span.
pub fn instrument_future<F: Future>(future: F, span: Span) -> impl Future<Output = F::Output> {
    future.instrument(span)
}
