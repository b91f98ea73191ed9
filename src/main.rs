use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::EnvFilter;

use complexity_analyzer::{AnalyzerServer, ServerConfig};

/// Empirical time-complexity analysis server
#[derive(Debug, Parser)]
#[command(name = "complexity-analyzer", version, about)]
struct Cli {
    /// Path to a TOML configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Address to bind, overrides the configuration
    #[arg(long)]
    host: Option<String>,

    /// Port to listen on, overrides the configuration
    #[arg(short, long)]
    port: Option<u16>,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_target(false)
        .init();

    let cli = Cli::parse();

    info!("🚀 Starting complexity analyzer...");

    let mut config = ServerConfig::load(cli.config.as_deref())?;
    if let Some(host) = cli.host {
        config.host = host;
    }
    if let Some(port) = cli.port {
        config.port = port;
    }
    config.validate()?;
    info!("✅ Configuration loaded");

    info!("Cache capacity: {} entries per store", config.cache.capacity);
    match (&config.publisher.enabled, &config.publisher.cloud_name) {
        (true, Some(cloud)) => info!("Charts will be published to image host cloud '{}'", cloud),
        _ => info!("No image host configured, charts are served from /download"),
    }

    let server = AnalyzerServer::from_config(config)?;
    server.run().await?;

    Ok(())
}
