use bindlab::config::StudioConfig;
use bindlab::gateway::GeminiGateway;
use bindlab::http_server::HttpServer;
use bindlab::locale::Locale;
use bindlab::metrics::StudioMetrics;
use bindlab::{Studio, StudioEngine, WorkspaceStore};
use clap::Parser;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

/// BIND configuration workbench with AI-assisted validation
#[derive(Debug, Parser)]
#[command(name = "bindlab", version, about)]
struct Cli {
    /// TOML configuration file
    #[arg(long)]
    config: Option<PathBuf>,

    /// Address for the control API (overrides configuration)
    #[arg(long)]
    bind: Option<SocketAddr>,

    /// Response language: en, ru, de or es (overrides configuration)
    #[arg(long)]
    locale: Option<Locale>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    let mut config = StudioConfig::load(cli.config.as_deref())?;
    if let Some(bind) = cli.bind {
        config.http_bind_addr = bind;
    }
    if let Some(locale) = cli.locale {
        config.default_locale = locale;
    }

    if config.gateway.api_key.is_none() {
        warn!("No analysis API key configured; validate, explain and lookup will return degraded results");
    }

    let metrics = Arc::new(StudioMetrics::new()?);
    let gateway = Arc::new(GeminiGateway::new(config.gateway.clone())?);
    let studio = Studio::new(WorkspaceStore::seeded(), config.default_locale);

    info!(
        "Using model {} with locale {}",
        config.gateway.model, config.default_locale
    );

    let handle = StudioEngine::spawn(studio, gateway, metrics.clone(), config.command_buffer);

    HttpServer::new(handle, metrics, config.http_bind_addr)
        .start()
        .await
}
