mod checks;
mod command;
mod config;
mod publish;
mod registry;
mod transport;

use anyhow::{Context, Result};
use clap::Parser;
use command::{DirectiveRouter, HandlerContext};
use config::BridgeConfig;
use mqtthome_shared::DirectiveRequest;
use publish::SessionPublisher;
use registry::JsonTableRegistry;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use transport::MqttConnector;

use tracing::{error, info};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Handle one smart-home directive and print the response
#[derive(Debug, Parser)]
#[command(name = "mqtthome-bridge", version)]
struct Cli {
    /// Directive JSON file; read from stdin when omitted
    #[arg(short, long)]
    directive: Option<PathBuf>,

    /// TOML configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Override the registry table path
    #[arg(long)]
    registry: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut config = BridgeConfig::load(cli.config.as_deref())?;
    if let Some(path) = cli.registry {
        config.registry_path = path;
    }

    // Initialize tracing; stdout carries the response
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.log_level));
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();

    info!("Registry table: {}", config.registry_path.display());

    let raw = read_directive(cli.directive.as_ref()).await?;
    let request = DirectiveRequest::from_json(&raw).map_err(|e| {
        error!("[REQUEST] {}", e);
        e
    })?;

    let router = build_router(&config)?;

    let response = router.route(&request).await?;
    let body = response.to_json().context("failed to encode response")?;

    let mut stdout = tokio::io::stdout();
    stdout.write_all(body.as_bytes()).await?;
    stdout.write_all(b"\n").await?;
    stdout.flush().await?;
    Ok(())
}

fn build_router(config: &BridgeConfig) -> Result<DirectiveRouter> {
    let registry = JsonTableRegistry::new(config.registry_path.clone());
    let publisher = SessionPublisher::new(MqttConnector::from_config(config)?);

    Ok(DirectiveRouter::new(HandlerContext::new(
        Arc::new(registry),
        Arc::new(publisher),
    )))
}

async fn read_directive(path: Option<&PathBuf>) -> Result<String> {
    match path {
        Some(path) => tokio::fs::read_to_string(path)
            .await
            .with_context(|| format!("failed to read directive {}", path.display())),
        None => {
            let mut raw = String::new();
            tokio::io::stdin()
                .read_to_string(&mut raw)
                .await
                .context("failed to read directive from stdin")?;
            Ok(raw)
        }
    }
}
