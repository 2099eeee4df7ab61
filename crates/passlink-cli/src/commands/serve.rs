//! Serve command - run the gateway.

use std::path::Path;

use passlink_gateway::GatewayConfig;

/// Load configuration, apply overrides, and run until shutdown.
pub(crate) async fn run_gateway(
    config_path: Option<&Path>,
    bind: Option<String>,
    port: Option<u16>,
    verbose: bool,
) -> anyhow::Result<()> {
    let mut config = GatewayConfig::load_or_default(config_path)?;
    if let Some(bind) = bind {
        config.server.bind = bind;
    }
    if let Some(port) = port {
        config.server.port = port;
    }
    if verbose {
        config.logging.level = "debug".to_string();
    }

    passlink_telemetry::setup_logging(&config.logging)?;
    tracing::debug!(config = ?config_path, "Configuration loaded");

    passlink_gateway::serve(&config).await?;
    Ok(())
}
