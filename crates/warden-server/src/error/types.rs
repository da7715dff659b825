//! API error types.

use crate::response::StatusReason;
use axum::http::StatusCode;
use thiserror::Error;

/// Result type for API operations.
pub type ApiResult<T> = Result<T, ApiError>;

/// Errors the server turns into `Status` responses.
#[derive(Debug, Error)]
pub enum ApiError {
    // 401 Unauthorized
    #[error("Unauthorized")]
    Unauthorized,

    #[error("Invalid bearer token")]
    InvalidToken,

    #[error("Token expired")]
    TokenExpired,

    // 404 Not Found
    #[error("the server could not find the requested resource")]
    NotFound,

    // 500 Internal Server Error
    #[error("Internal error occurred")]
    Internal(#[source] anyhow::Error),

    // 503 Service Unavailable
    #[error("Service unavailable: {0}")]
    ServiceUnavailable(String),
}

impl ApiError {
    /// Get HTTP status code for this error.
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::Unauthorized | Self::InvalidToken | Self::TokenExpired => StatusCode::UNAUTHORIZED,

            Self::NotFound => StatusCode::NOT_FOUND,

            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,

            Self::ServiceUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
        }
    }

    /// Machine-readable reason for the `Status` body.
    pub fn reason(&self) -> StatusReason {
        match self {
            Self::Unauthorized | Self::InvalidToken | Self::TokenExpired => StatusReason::Unauthorized,
            Self::NotFound => StatusReason::NotFound,
            Self::Internal(_) => StatusReason::InternalError,
            Self::ServiceUnavailable(_) => StatusReason::ServiceUnavailable,
        }
    }

    /// Check if this is a server error (5xx).
    pub fn is_server_error(&self) -> bool {
        self.status_code().is_server_error()
    }
}

impl From<anyhow::Error> for ApiError {
    fn from(err: anyhow::Error) -> Self {
        ApiError::Internal(err)
    }
}

impl From<jsonwebtoken::errors::Error> for ApiError {
    fn from(err: jsonwebtoken::errors::Error) -> Self {
        match err.kind() {
            jsonwebtoken::errors::ErrorKind::ExpiredSignature => ApiError::TokenExpired,
            _ => ApiError::InvalidToken,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use jsonwebtoken::errors::{Error as JwtError, ErrorKind};

    #[test]
    fn test_status_codes() {
        assert_eq!(ApiError::InvalidToken.status_code(), StatusCode::UNAUTHORIZED);
        assert_eq!(ApiError::NotFound.status_code(), StatusCode::NOT_FOUND);
        assert!(ApiError::Internal(anyhow::anyhow!("boom")).is_server_error());
        assert!(!ApiError::NotFound.is_server_error());
    }

    #[test]
    fn test_jwt_error_mapping() {
        let expired: ApiError = JwtError::from(ErrorKind::ExpiredSignature).into();
        assert!(matches!(expired, ApiError::TokenExpired));

        let invalid: ApiError = JwtError::from(ErrorKind::InvalidSignature).into();
        assert!(matches!(invalid, ApiError::InvalidToken));
    }
}
