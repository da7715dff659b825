//! Configuration loading utilities.

use super::types::ServerConfig;
use anyhow::{Context, Result};
use std::path::Path;
use tracing::{info, warn};

/// Environment variable naming an optional configuration file.
pub const CONFIG_PATH_ENV: &str = "WARDEN_CONFIG";

/// Load configuration from various sources.
///
/// Later sources override earlier ones: built-in defaults, then the
/// configuration file, then `WARDEN__SECTION__KEY` environment variables.
pub struct ConfigLoader {
    config_path: Option<String>,
    env_prefix: String,
}

impl ConfigLoader {
    pub fn new() -> Self {
        Self {
            config_path: None,
            env_prefix: "WARDEN".to_string(),
        }
    }

    /// Set config file path.
    pub fn with_config_path(mut self, path: impl Into<String>) -> Self {
        self.config_path = Some(path.into());
        self
    }

    /// Set environment variable prefix.
    pub fn with_env_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.env_prefix = prefix.into();
        self
    }

    /// Load configuration.
    pub fn load(&self) -> Result<ServerConfig> {
        let mut builder = config::Config::builder();

        // Add default values
        builder = builder.add_source(config::File::from_str(
            include_str!("defaults.toml"),
            config::FileFormat::Toml,
        ));

        // Add config file if specified
        if let Some(path) = &self.config_path {
            if Path::new(path).exists() {
                info!(path = %path, "Loading config file");
                builder = builder.add_source(config::File::with_name(path));
            } else {
                warn!(path = %path, "Config file not found, using defaults");
            }
        }

        // Add environment variables
        builder = builder.add_source(
            config::Environment::with_prefix(&self.env_prefix)
                .separator("__")
                .list_separator(",")
                .with_list_parse_key("authorization.modes")
                .with_list_parse_key("authentication.request_header.username_headers")
                .with_list_parse_key("authentication.request_header.group_headers")
                .with_list_parse_key("authentication.request_header.extra_header_prefixes")
                .try_parsing(true),
        );

        let config = builder
            .build()
            .context("Failed to build configuration")?;

        config
            .try_deserialize()
            .context("Failed to deserialize configuration")
    }
}

impl Default for ConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}

/// Load configuration from the default sources.
pub fn load_config() -> Result<ServerConfig> {
    let mut loader = ConfigLoader::new();
    if let Ok(path) = std::env::var(CONFIG_PATH_ENV) {
        loader = loader.with_config_path(path);
    }

    loader.load()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AuthorizationMode;
    use std::io::Write;

    #[test]
    fn test_defaults() {
        let config = ConfigLoader::new()
            .with_env_prefix("WARDEN_TEST_DEFAULTS")
            .load()
            .unwrap();

        assert_eq!(config.server.port, 8080);
        assert_eq!(config.authorization.modes, vec![AuthorizationMode::AlwaysAllow]);
        assert!(config.authentication.anonymous);
        assert!(!config.authentication.request_header.enabled);
        assert_eq!(
            config.authentication.request_header.username_headers,
            vec!["X-Remote-User".to_string()]
        );
        assert!(config.authentication.token.jwt_secret.is_none());
        assert!(config.audit.enabled);
    }

    #[test]
    fn test_file_overrides_defaults() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(
            file,
            r#"
[server]
port = 6443

[authorization]
modes = ["AlwaysDeny"]

[authentication.token]
jwt_secret = "0123456789abcdef0123456789abcdef"
"#
        )
        .unwrap();

        let config = ConfigLoader::new()
            .with_env_prefix("WARDEN_TEST_FILE")
            .with_config_path(file.path().to_string_lossy())
            .load()
            .unwrap();

        assert_eq!(config.server.port, 6443);
        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.authorization.modes, vec![AuthorizationMode::AlwaysDeny]);
        assert_eq!(
            config.authentication.token.jwt_secret.as_deref(),
            Some("0123456789abcdef0123456789abcdef")
        );
    }

    #[test]
    fn test_env_overrides() {
        std::env::set_var("WARDEN_TEST_ENV__SERVER__PORT", "9443");
        std::env::set_var("WARDEN_TEST_ENV__AUTHORIZATION__MODES", "AlwaysDeny,AlwaysAllow");

        let config = ConfigLoader::new()
            .with_env_prefix("WARDEN_TEST_ENV")
            .load()
            .unwrap();

        assert_eq!(config.server.port, 9443);
        assert_eq!(
            config.authorization.modes,
            vec![AuthorizationMode::AlwaysDeny, AuthorizationMode::AlwaysAllow]
        );
    }

    #[test]
    fn test_missing_file_falls_back_to_defaults() {
        let config = ConfigLoader::new()
            .with_env_prefix("WARDEN_TEST_MISSING")
            .with_config_path("/nonexistent/warden.toml")
            .load()
            .unwrap();
        assert_eq!(config.server.port, 8080);
    }
}
