//! Kubernetes-style `Status` failure objects.

use super::negotiation::MediaType;
use axum::{
    http::{header, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::error;

/// Machine-readable failure category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StatusReason {
    Unauthorized,
    Forbidden,
    NotFound,
    InternalError,
    ServiceUnavailable,
}

/// Which object a failure refers to.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusDetails {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub name: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub group: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub kind: String,
}

/// Failure body returned by the server.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Status {
    pub kind: String,
    pub api_version: String,
    #[serde(default)]
    pub metadata: BTreeMap<String, String>,
    pub status: String,
    pub message: String,
    pub reason: StatusReason,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<StatusDetails>,
    pub code: u16,
}

impl Status {
    /// Build a failure status.
    pub fn failure(code: StatusCode, reason: StatusReason, message: impl Into<String>) -> Self {
        Self {
            kind: "Status".to_string(),
            api_version: "v1".to_string(),
            metadata: BTreeMap::new(),
            status: "Failure".to_string(),
            message: message.into(),
            reason,
            details: None,
            code: code.as_u16(),
        }
    }

    pub fn with_details(mut self, details: StatusDetails) -> Self {
        self.details = Some(details);
        self
    }

    /// HTTP status matching `code`.
    pub fn status_code(&self) -> StatusCode {
        StatusCode::from_u16(self.code).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
    }

    /// Encode as `media_type` into a response.
    pub fn into_negotiated_response(self, media_type: MediaType) -> Response {
        let encoded = match media_type {
            MediaType::Json => serde_json::to_vec(&self).map_err(|e| e.to_string()),
            MediaType::Yaml => serde_yaml::to_string(&self)
                .map(String::into_bytes)
                .map_err(|e| e.to_string()),
        };

        match encoded {
            Ok(body) => {
                let mut response = (self.status_code(), body).into_response();
                response.headers_mut().insert(
                    header::CONTENT_TYPE,
                    HeaderValue::from_static(media_type.content_type()),
                );
                response
            }
            Err(e) => {
                error!(error = %e, "Failed to encode status");
                (StatusCode::INTERNAL_SERVER_ERROR, self.message).into_response()
            }
        }
    }
}

impl IntoResponse for Status {
    fn into_response(self) -> Response {
        self.into_negotiated_response(MediaType::Json)
    }
}
