//! Request context visible to authorizers.

use axum::http::Extensions;
use std::time::{Duration, Instant};

/// Absolute deadline for handling a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RequestDeadline(pub Instant);

impl RequestDeadline {
    /// Deadline `timeout` from now.
    pub fn after(timeout: Duration) -> Self {
        Self(Instant::now() + timeout)
    }
}

/// Read-only view of the request an authorizer is evaluating.
///
/// Authorizers should finish before [`deadline`](Self::deadline); the
/// filter itself imposes no timeout, but the request future is dropped
/// once the server-level timeout fires.
#[derive(Clone, Copy)]
pub struct AuthorizerContext<'a> {
    extensions: &'a Extensions,
}

impl<'a> AuthorizerContext<'a> {
    pub fn new(extensions: &'a Extensions) -> Self {
        Self { extensions }
    }

    /// The request deadline, if one was set.
    pub fn deadline(&self) -> Option<Instant> {
        self.extensions.get::<RequestDeadline>().map(|d| d.0)
    }

    /// Time left before the deadline. `None` without a deadline.
    pub fn remaining(&self) -> Option<Duration> {
        self.deadline()
            .map(|d| d.saturating_duration_since(Instant::now()))
    }

    /// Typed access to any other request-scoped value.
    pub fn get<T: Send + Sync + 'static>(&self) -> Option<&'a T> {
        self.extensions.get::<T>()
    }
}

impl std::fmt::Debug for AuthorizerContext<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthorizerContext")
            .field("deadline", &self.deadline())
            .finish()
    }
}
