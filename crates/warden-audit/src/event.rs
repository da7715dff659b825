//! Core audit event type.

use crate::AuditId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use strum::{Display, EnumString};

/// Point in the request lifecycle an event was emitted at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString)]
pub enum AuditStage {
    /// The request was received and the audit context created.
    RequestReceived,
    /// The response has been produced.
    ResponseComplete,
    /// The handler chain panicked before producing a response.
    Panic,
}

/// Identity of the caller, as recorded in the audit log.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuditUser {
    /// Authenticated user name.
    pub username: String,
    /// Stable user identifier.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub uid: String,
    /// Group memberships.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub groups: Vec<String>,
}

/// Resource coordinates of the request, when it targets a resource.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ObjectReference {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub resource: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub namespace: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub name: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub api_group: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub api_version: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub subresource: String,
}

/// One audited request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuditEvent {
    /// Unique request identifier.
    #[serde(rename = "auditID")]
    pub audit_id: AuditId,
    /// Lifecycle stage of this record.
    pub stage: AuditStage,
    /// Request URI as sent by the client.
    pub request_uri: String,
    /// Request verb.
    pub verb: String,
    /// Authenticated caller, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user: Option<AuditUser>,
    /// Client addresses, nearest proxy last.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub source_ips: Vec<String>,
    /// Client user agent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_agent: Option<String>,
    /// Targeted resource.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub object_ref: Option<ObjectReference>,
    /// HTTP status code of the response.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub response_code: Option<u16>,
    /// When the request was received.
    pub request_received_timestamp: DateTime<Utc>,
    /// When this stage was reached.
    pub stage_timestamp: DateTime<Utc>,
    /// Structured facts attached by the handler chain.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub annotations: BTreeMap<String, String>,
}

impl AuditEvent {
    /// Create a new event builder.
    pub fn builder(verb: impl Into<String>, request_uri: impl Into<String>) -> AuditEventBuilder {
        AuditEventBuilder::new(verb, request_uri)
    }
}

/// Builder for constructing audit events.
#[derive(Debug)]
pub struct AuditEventBuilder {
    audit_id: Option<AuditId>,
    verb: String,
    request_uri: String,
    user: Option<AuditUser>,
    source_ips: Vec<String>,
    user_agent: Option<String>,
    object_ref: Option<ObjectReference>,
}

impl AuditEventBuilder {
    /// Create a new builder.
    pub fn new(verb: impl Into<String>, request_uri: impl Into<String>) -> Self {
        Self {
            audit_id: None,
            verb: verb.into(),
            request_uri: request_uri.into(),
            user: None,
            source_ips: Vec::new(),
            user_agent: None,
            object_ref: None,
        }
    }

    /// Reuse an identifier supplied by the client.
    pub fn audit_id(mut self, id: AuditId) -> Self {
        self.audit_id = Some(id);
        self
    }

    /// Set the caller.
    pub fn user(mut self, user: AuditUser) -> Self {
        self.user = Some(user);
        self
    }

    /// Append a client address.
    pub fn source_ip(mut self, ip: impl Into<String>) -> Self {
        self.source_ips.push(ip.into());
        self
    }

    /// Set the user agent.
    pub fn user_agent(mut self, ua: impl Into<String>) -> Self {
        self.user_agent = Some(ua.into());
        self
    }

    /// Set the targeted resource.
    pub fn object_ref(mut self, object_ref: ObjectReference) -> Self {
        self.object_ref = Some(object_ref);
        self
    }

    /// Build the event at the `RequestReceived` stage.
    pub fn build(self) -> AuditEvent {
        let now = Utc::now();
        AuditEvent {
            audit_id: self.audit_id.unwrap_or_default(),
            stage: AuditStage::RequestReceived,
            request_uri: self.request_uri,
            verb: self.verb,
            user: self.user,
            source_ips: self.source_ips,
            user_agent: self.user_agent,
            object_ref: self.object_ref,
            response_code: None,
            request_received_timestamp: now,
            stage_timestamp: now,
            annotations: BTreeMap::new(),
        }
    }
}
