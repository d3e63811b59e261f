//! Notehub Server — real-time chat hub
//!
//! Main entry point: loads configuration, initializes logging, and runs
//! the WebSocket accept loop.

use clap::Parser;
use tracing_subscriber::{EnvFilter, fmt};

use notehub_core::AppResult;
use notehub_core::config::AppConfig;
use notehub_hub::HubServer;

#[derive(Debug, Parser)]
#[command(name = "notehub-server", about = "Notehub real-time chat hub")]
struct Args {
    /// Listen address (overrides configuration).
    #[arg(long)]
    host: Option<String>,
    /// Listen port (overrides configuration).
    #[arg(long)]
    port: Option<u16>,
}

#[tokio::main]
async fn main() {
    let args = Args::parse();

    let config = match load_configuration(&args) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Failed to load configuration: {e}");
            std::process::exit(1);
        }
    };

    init_logging(&config);

    if let Err(e) = run(config).await {
        tracing::error!("Server error: {}", e);
        std::process::exit(1);
    }
}

/// Load configuration from file and environment, with CLI overrides
fn load_configuration(args: &Args) -> AppResult<AppConfig> {
    let env = std::env::var("NOTEHUB_ENV").unwrap_or_else(|_| "development".to_string());
    let mut config = AppConfig::load(&env)?;
    if let Some(host) = &args.host {
        config.server.host = host.clone();
    }
    if let Some(port) = args.port {
        config.server.port = port;
    }
    Ok(config)
}

/// Initialize tracing/logging
fn init_logging(config: &AppConfig) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.logging.level));

    match config.logging.format.as_str() {
        "json" => {
            fmt().json().with_env_filter(filter).with_target(true).init();
        }
        _ => {
            fmt().pretty().with_env_filter(filter).with_target(true).init();
        }
    }
}

/// Bind the listener and serve until the process is terminated. A bind
/// failure occurs before any session exists and aborts the process.
async fn run(config: AppConfig) -> AppResult<()> {
    tracing::info!("Starting Notehub v{}", env!("CARGO_PKG_VERSION"));

    let server = HubServer::bind(&config.server).await?;
    server.run().await
}
