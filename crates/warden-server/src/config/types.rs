//! Server configuration types.

use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::time::Duration;

/// Main server configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Server binding configuration.
    #[serde(default)]
    pub server: ServerBindConfig,
    /// Authentication configuration.
    #[serde(default)]
    pub authentication: AuthenticationConfig,
    /// Authorization configuration.
    #[serde(default)]
    pub authorization: AuthorizationConfig,
    /// Audit configuration.
    #[serde(default)]
    pub audit: AuditConfig,
    /// Logging configuration.
    #[serde(default)]
    pub logging: LoggingConfig,
    /// Metrics configuration.
    #[serde(default)]
    pub metrics: MetricsConfig,
}

/// Server binding configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerBindConfig {
    /// Host to bind to.
    #[serde(default = "default_host")]
    pub host: String,
    /// Port to bind to.
    #[serde(default = "default_port")]
    pub port: u16,
    /// Request timeout.
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

fn default_request_timeout() -> u64 {
    60
}

impl Default for ServerBindConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            request_timeout_secs: default_request_timeout(),
        }
    }
}

impl ServerBindConfig {
    pub fn socket_addr(&self) -> Result<SocketAddr, std::net::AddrParseError> {
        format!("{}:{}", self.host, self.port).parse()
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

/// Authentication configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthenticationConfig {
    /// Treat requests without credentials as `system:anonymous`.
    #[serde(default = "default_true")]
    pub anonymous: bool,
    /// Identity asserted by a trusted front proxy.
    #[serde(default)]
    pub request_header: RequestHeaderConfig,
    /// Bearer token authentication.
    #[serde(default)]
    pub token: TokenConfig,
}

fn default_true() -> bool {
    true
}

impl Default for AuthenticationConfig {
    fn default() -> Self {
        Self {
            anonymous: true,
            request_header: RequestHeaderConfig::default(),
            token: TokenConfig::default(),
        }
    }
}

/// Request-header authentication configuration.
///
/// No proxy identity is verified. Enable only when every request passes
/// through a front proxy that controls these headers.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RequestHeaderConfig {
    /// Enable request-header authentication.
    #[serde(default)]
    pub enabled: bool,
    /// Headers checked, in order, for the user name.
    #[serde(default = "default_username_headers")]
    pub username_headers: Vec<String>,
    /// Headers carrying group names.
    #[serde(default = "default_group_headers")]
    pub group_headers: Vec<String>,
    /// Header prefixes carrying extra attributes.
    #[serde(default = "default_extra_header_prefixes")]
    pub extra_header_prefixes: Vec<String>,
}

fn default_username_headers() -> Vec<String> {
    vec!["X-Remote-User".to_string()]
}

fn default_group_headers() -> Vec<String> {
    vec!["X-Remote-Group".to_string()]
}

fn default_extra_header_prefixes() -> Vec<String> {
    vec!["X-Remote-Extra-".to_string()]
}

impl Default for RequestHeaderConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            username_headers: default_username_headers(),
            group_headers: default_group_headers(),
            extra_header_prefixes: default_extra_header_prefixes(),
        }
    }
}

/// Bearer token configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TokenConfig {
    /// HMAC secret for HS256 tokens. Token authentication is off without one.
    #[serde(default)]
    pub jwt_secret: Option<String>,
    /// Required `iss` claim.
    #[serde(default)]
    pub issuer: Option<String>,
}

/// Authorization configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthorizationConfig {
    /// Authorizers to consult, in order. Empty disables authorization.
    #[serde(default)]
    pub modes: Vec<AuthorizationMode>,
}

/// Built-in authorizer kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AuthorizationMode {
    AlwaysAllow,
    AlwaysDeny,
}

/// Audit configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditConfig {
    /// Enable request auditing.
    #[serde(default = "default_true")]
    pub enabled: bool,
    /// Events buffered before new ones are dropped.
    #[serde(default = "default_audit_buffer")]
    pub buffer_size: usize,
}

fn default_audit_buffer() -> usize {
    10_000
}

impl Default for AuditConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            buffer_size: default_audit_buffer(),
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level.
    #[serde(default = "default_log_level")]
    pub level: String,
    /// Log format (pretty, compact or json).
    #[serde(default = "default_log_format")]
    pub format: String,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "pretty".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

/// Metrics configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetricsConfig {
    /// Serve `/metrics` and record authorization metrics.
    #[serde(default = "default_true")]
    pub enabled: bool,
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self { enabled: true }
    }
}
