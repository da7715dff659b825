//! Request-scoped audit context.

use crate::{AuditEvent, AuditId, AuditStage};
use chrono::Utc;
use parking_lot::Mutex;
use std::collections::btree_map::Entry;
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::warn;

/// Handle to the audit record of one in-flight request.
///
/// Cloning is cheap and every clone refers to the same record, so the
/// context can be stored in request extensions and written to from any
/// stage of the handler chain.
#[derive(Clone, Debug)]
pub struct AuditContext {
    event: Arc<Mutex<AuditEvent>>,
}

impl AuditContext {
    /// Wrap a freshly built event.
    pub fn new(event: AuditEvent) -> Self {
        Self {
            event: Arc::new(Mutex::new(event)),
        }
    }

    /// Identifier of the audited request.
    pub fn audit_id(&self) -> AuditId {
        self.event.lock().audit_id
    }

    /// Attach an annotation to the record.
    ///
    /// A key is write-once: setting it again to a different value is
    /// rejected and logged. Returns whether the record now holds `value`
    /// under `key`.
    pub fn add_annotation(&self, key: impl Into<String>, value: impl Into<String>) -> bool {
        let mut event = self.event.lock();
        insert_annotation(event.audit_id, &mut event.annotations, key.into(), value.into())
    }

    /// Attach several annotations under a single lock acquisition.
    pub fn add_annotations<'a, I>(&self, pairs: I)
    where
        I: IntoIterator<Item = (&'a str, &'a str)>,
    {
        let mut event = self.event.lock();
        let audit_id = event.audit_id;
        for (key, value) in pairs {
            insert_annotation(audit_id, &mut event.annotations, key.to_string(), value.to_string());
        }
    }

    /// Look up a single annotation.
    pub fn annotation(&self, key: &str) -> Option<String> {
        self.event.lock().annotations.get(key).cloned()
    }

    /// Copy of all annotations recorded so far.
    pub fn annotations(&self) -> BTreeMap<String, String> {
        self.event.lock().annotations.clone()
    }

    /// Move the record to a terminal stage and return a copy of it.
    pub fn complete(&self, stage: AuditStage, response_code: u16) -> AuditEvent {
        let mut event = self.event.lock();
        event.stage = stage;
        event.stage_timestamp = Utc::now();
        event.response_code = Some(response_code);
        event.clone()
    }
}

fn insert_annotation(
    audit_id: AuditId,
    annotations: &mut BTreeMap<String, String>,
    key: String,
    value: String,
) -> bool {
    match annotations.entry(key) {
        Entry::Vacant(slot) => {
            slot.insert(value);
            true
        }
        Entry::Occupied(existing) if *existing.get() == value => true,
        Entry::Occupied(existing) => {
            warn!(
                audit_id = %audit_id,
                key = %existing.key(),
                value = %value,
                existing = %existing.get(),
                "Failed to set audit annotation, it has already been set"
            );
            false
        }
    }
}
