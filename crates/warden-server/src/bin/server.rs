//! Warden Server Binary

use anyhow::Result;
use warden_common_log::{LogConfig, LogFormat, LogLevel};
use warden_server::{
    config::{load_config, validate_config},
    Server,
};
use tracing::{error, info};

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let config = load_config()?;

    let mut log_config = LogConfig::from_env();
    if let Some(level) = LogLevel::parse(&config.logging.level) {
        log_config.level = level;
    }
    if let Some(format) = LogFormat::parse(&config.logging.format) {
        log_config.format = format;
    }
    warden_common_log::init(log_config)?;

    if let Err(errors) = validate_config(&config) {
        for err in &errors {
            error!(error = %err, "Invalid configuration");
        }
        anyhow::bail!("configuration has {} error(s)", errors.len());
    }

    info!("Starting Warden Server v{}", env!("CARGO_PKG_VERSION"));

    let server = Server::new(config).await?;
    server.run().await?;

    info!("Server shutdown complete");
    Ok(())
}
