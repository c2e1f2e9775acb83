//! playd - Play Store badge daemon.
//!
//! Serves endpoint badges for Play Store apps over HTTP.

use std::net::SocketAddr;
use std::sync::Arc;

use clap::Parser;
use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::EnvFilter;

use playbadge::server::config::Config;
use playbadge::server::{AppState, router};

/// Play Store badge daemon.
#[derive(Parser)]
#[command(name = "playd")]
#[command(version = playbadge::PKG_VERSION)]
#[command(about = "Endpoint badges for Play Store apps")]
struct Args {
    /// Path to configuration file.
    #[arg(short, long)]
    config: Option<std::path::PathBuf>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = Config::load(args.config.as_deref())?;
    let service = config.service_builder().build()?;

    let addr: SocketAddr = config.server.address.parse().map_err(|e| {
        playbadge::BadgeError::Configuration(format!("Invalid address: {e}"))
    })?;

    info!(version = playbadge::version_string(), %addr, "playd starting");

    let state = AppState::new(Arc::new(service), config.server.cache_control_max_age);
    let listener = TcpListener::bind(addr).await?;
    axum::serve(listener, router(state)).await?;

    Ok(())
}
