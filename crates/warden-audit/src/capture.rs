//! Audit event capture mechanism.

use crate::AuditEvent;
use tokio::sync::mpsc;
use tracing::{debug, error, warn};

/// Configuration for audit capture.
#[derive(Debug, Clone)]
pub struct CaptureConfig {
    /// Maximum events to buffer before new events are dropped.
    pub buffer_size: usize,
}

impl Default for CaptureConfig {
    fn default() -> Self {
        Self { buffer_size: 10_000 }
    }
}

/// Handle for submitting completed audit events.
///
/// Submission never blocks the request path: when the buffer is full the
/// event is dropped with a warning.
#[derive(Clone, Debug)]
pub struct AuditCapture {
    sender: mpsc::Sender<AuditEvent>,
}

impl AuditCapture {
    /// Create a new capture handle and the receiving end for a sink.
    pub fn new(config: CaptureConfig) -> (Self, mpsc::Receiver<AuditEvent>) {
        let (sender, receiver) = mpsc::channel(config.buffer_size.max(1));
        (Self { sender }, receiver)
    }

    /// Record an audit event (non-blocking).
    pub fn record(&self, event: AuditEvent) {
        let audit_id = event.audit_id;
        match self.sender.try_send(event) {
            Ok(()) => debug!(audit_id = %audit_id, "Audit event captured"),
            Err(mpsc::error::TrySendError::Full(_)) => {
                warn!(audit_id = %audit_id, "Audit buffer full, event dropped");
            }
            Err(mpsc::error::TrySendError::Closed(_)) => {
                error!(audit_id = %audit_id, "Audit channel closed");
            }
        }
    }

    /// Check if the capture channel is healthy.
    pub fn is_healthy(&self) -> bool {
        !self.sender.is_closed()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_record_delivers_event() {
        let (capture, mut receiver) = AuditCapture::new(CaptureConfig::default());
        let event = AuditEvent::builder("get", "/healthz").build();
        let id = event.audit_id;

        capture.record(event);

        let received = receiver.recv().await.unwrap();
        assert_eq!(received.audit_id, id);
    }

    #[tokio::test]
    async fn test_full_buffer_drops_instead_of_blocking() {
        let (capture, mut receiver) = AuditCapture::new(CaptureConfig { buffer_size: 1 });

        capture.record(AuditEvent::builder("get", "/a").build());
        capture.record(AuditEvent::builder("get", "/b").build());

        assert_eq!(receiver.recv().await.unwrap().request_uri, "/a");
        assert!(receiver.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_closed_channel_is_unhealthy() {
        let (capture, receiver) = AuditCapture::new(CaptureConfig::default());
        assert!(capture.is_healthy());
        drop(receiver);
        assert!(!capture.is_healthy());
        capture.record(AuditEvent::builder("get", "/").build());
    }
}
