//! Javis Daemon - Main entry point
//!
//! Serves a part catalog directory over HTTP for the viewer.

mod api;
mod server;
mod state;

use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

#[derive(Parser, Debug)]
#[command(name = "javis-daemon")]
#[command(about = "Javis part catalog server")]
#[command(version)]
struct Args {
    /// Path to configuration file
    #[arg(short, long, default_value = "javis.toml")]
    config: PathBuf,

    /// Bind address for web server
    #[arg(short, long)]
    bind: Option<String>,

    /// Catalog directory to serve (overrides daemon.catalog_root)
    #[arg(long)]
    catalog: Option<String>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, default_value = "info")]
    log_level: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Initialize logging
    let level = match args.log_level.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };

    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(true)
        .finish();

    tracing::subscriber::set_global_default(subscriber)?;

    info!("Javis daemon v{}", env!("CARGO_PKG_VERSION"));

    let mut config = javis_core::load_config(&args.config)?;

    if let Some(bind) = args.bind {
        config.daemon.bind = bind;
    }
    if let Some(catalog) = args.catalog {
        config.daemon.catalog_root = Some(catalog);
    }
    config.validate()?;

    info!(
        catalog = %config.daemon_root(),
        listing = %config.catalog.listing,
        "Configuration loaded"
    );

    let state = state::AppState::new(config)?;
    let bind = state.config.daemon.bind.clone();
    server::run(state, &bind).await
}
