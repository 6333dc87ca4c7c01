//! Javis Viewer - compose 3D parts from a catalog on the desktop

mod app;

use anyhow::Result;
use bevy::app::AppExit;
use bevy::log::Level;
use clap::Parser;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "javis")]
#[command(about = "Interactive 3D part composition viewer")]
#[command(version)]
struct Args {
    /// Path to configuration file
    #[arg(short, long, default_value = "javis.toml")]
    config: PathBuf,

    /// Catalog directory or base URL (overrides catalog.root)
    #[arg(long)]
    catalog: Option<String>,

    /// Catalog entry to open at startup
    #[arg(short, long)]
    entry: Option<String>,

    /// Idle time in milliseconds before auto-rotation
    #[arg(long)]
    idle_delay_ms: Option<u64>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, default_value = "info")]
    log_level: String,
}

fn main() -> Result<()> {
    let args = Args::parse();

    let level = match args.log_level.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };

    let mut config = javis_core::load_config(&args.config)?;

    if let Some(catalog) = args.catalog {
        config.catalog.root = catalog;
    }
    if let Some(entry) = args.entry {
        config.catalog.initial = Some(entry);
    }
    if let Some(idle_delay_ms) = args.idle_delay_ms {
        config.viewer.idle_delay_ms = idle_delay_ms;
    }
    config.validate()?;

    match app::build(config, level).run() {
        AppExit::Success => Ok(()),
        AppExit::Error(code) => anyhow::bail!("Viewer exited with code {}", code),
    }
}
