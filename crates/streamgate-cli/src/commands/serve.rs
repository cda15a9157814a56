//! `streamgate serve` - Run the HTTP gateway until Ctrl-C.

use anyhow::Context;
use std::path::Path;
use streamgate_core::GatewayConfig;
use streamgate_server::AppState;

pub async fn run(config_path: Option<&Path>) -> anyhow::Result<()> {
    let config = GatewayConfig::load(config_path).context("Failed to load configuration")?;

    for finding in config.validate() {
        if finding.is_error() {
            tracing::error!(field = %finding.field, "{}", finding.message);
        } else {
            tracing::warn!(field = %finding.field, "{}", finding.message);
        }
    }

    let state = AppState::from_config(&config)
        .await
        .context("Failed to initialize gateway")?;

    streamgate_server::serve(state, &config.server.bind_address(), shutdown_signal()).await?;
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for Ctrl-C");
        return;
    }
    tracing::info!("Shutdown requested");
}
