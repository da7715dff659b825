//! Configuration validation.

use super::types::ServerConfig;
use std::collections::HashSet;
use thiserror::Error;
use warden_common_log::{LogFormat, LogLevel};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid JWT secret: must be at least 32 characters")]
    InvalidJwtSecret,

    #[error("Invalid port: {0}")]
    InvalidPort(u16),

    #[error("Invalid bind address: {0}")]
    InvalidBindAddress(String),

    #[error("Invalid log level: {0}")]
    InvalidLogLevel(String),

    #[error("Invalid log format: {0}")]
    InvalidLogFormat(String),

    #[error("Audit buffer size must be greater than zero")]
    InvalidAuditBuffer,

    #[error("Authorization mode listed more than once: {0}")]
    DuplicateAuthorizationMode(String),

    #[error("Request timeout must be greater than zero")]
    InvalidRequestTimeout,
}

/// Validate server configuration.
pub fn validate_config(config: &ServerConfig) -> Result<(), Vec<ConfigError>> {
    let mut errors = Vec::new();

    // Validate JWT secret
    if let Some(secret) = &config.authentication.token.jwt_secret {
        if secret.len() < 32 {
            errors.push(ConfigError::InvalidJwtSecret);
        }
    }

    // Validate port
    if config.server.port == 0 {
        errors.push(ConfigError::InvalidPort(0));
    }

    if config.server.socket_addr().is_err() {
        errors.push(ConfigError::InvalidBindAddress(config.server.host.clone()));
    }

    if config.server.request_timeout_secs == 0 {
        errors.push(ConfigError::InvalidRequestTimeout);
    }

    // Validate logging
    if LogLevel::parse(&config.logging.level).is_none() {
        errors.push(ConfigError::InvalidLogLevel(config.logging.level.clone()));
    }
    if LogFormat::parse(&config.logging.format).is_none() {
        errors.push(ConfigError::InvalidLogFormat(config.logging.format.clone()));
    }

    if config.audit.enabled && config.audit.buffer_size == 0 {
        errors.push(ConfigError::InvalidAuditBuffer);
    }

    let mut seen = HashSet::new();
    for mode in &config.authorization.modes {
        if !seen.insert(mode) {
            errors.push(ConfigError::DuplicateAuthorizationMode(format!("{:?}", mode)));
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::types::*;

    #[test]
    fn test_invalid_jwt_secret() {
        let mut config = test_config();
        config.authentication.token.jwt_secret = Some("short".to_string());

        let result = validate_config(&config);
        assert!(result.is_err());
        assert!(result.unwrap_err().iter().any(|e| matches!(e, ConfigError::InvalidJwtSecret)));
    }

    #[test]
    fn test_invalid_port() {
        let mut config = test_config();
        config.server.port = 0;

        let result = validate_config(&config);
        assert!(result.is_err());
        assert!(result.unwrap_err().iter().any(|e| matches!(e, ConfigError::InvalidPort(0))));
    }

    #[test]
    fn test_invalid_bind_address() {
        let mut config = test_config();
        config.server.host = "nowhere:at:all".to_string();

        let result = validate_config(&config);
        assert!(result.unwrap_err().iter().any(|e| matches!(e, ConfigError::InvalidBindAddress(_))));
    }

    #[test]
    fn test_invalid_log_level() {
        let mut config = test_config();
        config.logging.level = "invalid".to_string();

        let result = validate_config(&config);
        assert!(result.is_err());
        assert!(result.unwrap_err().iter().any(|e| matches!(e, ConfigError::InvalidLogLevel(_))));
    }

    #[test]
    fn test_invalid_log_format() {
        let mut config = test_config();
        config.logging.format = "xml".to_string();

        let result = validate_config(&config);
        assert!(result.unwrap_err().iter().any(|e| matches!(e, ConfigError::InvalidLogFormat(_))));
    }

    #[test]
    fn test_empty_audit_buffer() {
        let mut config = test_config();
        config.audit.buffer_size = 0;

        let result = validate_config(&config);
        assert!(result.unwrap_err().iter().any(|e| matches!(e, ConfigError::InvalidAuditBuffer)));
    }

    #[test]
    fn test_duplicate_modes() {
        let mut config = test_config();
        config.authorization.modes = vec![
            AuthorizationMode::AlwaysDeny,
            AuthorizationMode::AlwaysAllow,
            AuthorizationMode::AlwaysDeny,
        ];

        let errors = validate_config(&config).unwrap_err();
        assert_eq!(errors.len(), 1);
        assert!(matches!(&errors[0], ConfigError::DuplicateAuthorizationMode(m) if m == "AlwaysDeny"));
    }

    #[test]
    fn test_collects_every_error() {
        let mut config = test_config();
        config.server.port = 0;
        config.logging.level = "loud".to_string();
        config.audit.buffer_size = 0;

        assert_eq!(validate_config(&config).unwrap_err().len(), 3);
    }

    #[test]
    fn test_valid_config() {
        let config = test_config();
        let result = validate_config(&config);
        assert!(result.is_ok());
    }

    #[test]
    fn test_disabled_authorization_is_valid() {
        let mut config = test_config();
        config.authorization.modes.clear();
        assert!(validate_config(&config).is_ok());
    }

    fn test_config() -> ServerConfig {
        let mut config = ServerConfig::default();
        config.server.host = "127.0.0.1".to_string();
        config.authentication.token.jwt_secret = Some("a".repeat(32));
        config.authorization.modes = vec![AuthorizationMode::AlwaysAllow];
        config
    }
}
