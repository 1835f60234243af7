//! Path-encoding forwarding proxy.
//!
//! Serves `https://proxy.example/https://target.example/page`: the target
//! URL rides in the proxy's own path, and every link, redirect, cookie and
//! embedded resource on a proxied page is kept consistent with that scheme.
//!
//! ```text
//!   inbound request
//!       → resolve  → (home page | shortcut redirect | target URL)
//!       → forward  → sanitize → rewrite
//!       → response
//! ```

use std::path::PathBuf;

use clap::Parser;
use tokio::net::TcpListener;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use mirrorgate::config::{load_config, ProxyConfig};
use mirrorgate::http::HttpServer;
use mirrorgate::observability::metrics;

#[derive(Parser)]
#[command(name = "mirrorgate")]
#[command(about = "Transparent forwarding proxy with path-encoded targets", long_about = None)]
struct Cli {
    /// Path to a TOML configuration file. Defaults apply when omitted.
    #[arg(short, long)]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "mirrorgate=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("mirrorgate v0.1.0 starting");

    let config = match &cli.config {
        Some(path) => load_config(path)?,
        None => ProxyConfig::default(),
    };

    tracing::info!(
        bind_address = %config.listener.bind_address,
        request_timeout_secs = config.timeouts.request_secs,
        shortcuts = config.shortcuts.len(),
        "Configuration loaded"
    );

    let listener = TcpListener::bind(&config.listener.bind_address).await?;
    let local_addr = listener.local_addr()?;

    tracing::info!(address = %local_addr, "Listening for connections");

    if config.observability.metrics_enabled {
        if let Ok(addr) = config.observability.metrics_address.parse() {
            metrics::init_metrics(addr);
        } else {
            tracing::error!(
                metrics_address = %config.observability.metrics_address,
                "Failed to parse metrics address"
            );
        }
    }

    let server = HttpServer::new(config)?;
    server.run(listener).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
