//! Error response implementation.

use super::types::ApiError;
use crate::response::Status;
use axum::response::{IntoResponse, Response};
use tracing::{error, warn};

impl ApiError {
    /// The `Status` body for this error. Server errors carry no detail.
    pub fn to_status(&self) -> Status {
        Status::failure(self.status_code(), self.reason(), self.to_string())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match &self {
            ApiError::Internal(err) => {
                error!(error = %err, "Server error occurred");
            }
            err if err.is_server_error() => {
                error!(error = %err, "Server error occurred");
            }
            ApiError::Unauthorized | ApiError::InvalidToken | ApiError::TokenExpired => {
                warn!(error = %self, "Authentication failed");
            }
            _ => {}
        }

        self.to_status().into_response()
    }
}
