//! Audit backends.

use crate::AuditEvent;
use async_trait::async_trait;
use parking_lot::Mutex;
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::mpsc;
use tracing::{debug, error, info};
use warden_common_log::spans::{audit_span, instrument_future};

/// Errors raised by audit backends.
#[derive(Debug, Error)]
pub enum AuditError {
    #[error("failed to encode audit event: {0}")]
    Encode(#[from] serde_json::Error),
}

/// Destination for completed audit events.
#[async_trait]
pub trait AuditSink: Send + Sync {
    /// Persist one event.
    async fn write(&self, event: &AuditEvent) -> Result<(), AuditError>;
}

/// Writes each event as a JSON line through `tracing` under the `audit`
/// target.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogSink;

#[async_trait]
impl AuditSink for LogSink {
    async fn write(&self, event: &AuditEvent) -> Result<(), AuditError> {
        let line = serde_json::to_string(event)?;
        info!(target: "audit", audit_id = %event.audit_id, "{}", line);
        Ok(())
    }
}

/// Keeps events in memory.
#[derive(Debug, Default)]
pub struct MemorySink {
    events: Mutex<Vec<AuditEvent>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Copy of every event written so far.
    pub fn events(&self) -> Vec<AuditEvent> {
        self.events.lock().clone()
    }
}

#[async_trait]
impl AuditSink for MemorySink {
    async fn write(&self, event: &AuditEvent) -> Result<(), AuditError> {
        self.events.lock().push(event.clone());
        Ok(())
    }
}

/// Drain captured events into `sink` until every capture handle is dropped.
pub async fn run_sink(mut receiver: mpsc::Receiver<AuditEvent>, sink: Arc<dyn AuditSink>) {
    while let Some(event) = receiver.recv().await {
        let span = audit_span(&event.audit_id.to_string());
        if let Err(e) = instrument_future(sink.write(&event), span).await {
            error!(audit_id = %event.audit_id, error = %e, "Failed to write audit event");
        }
    }
    debug!("Audit channel closed, sink stopped");
}
