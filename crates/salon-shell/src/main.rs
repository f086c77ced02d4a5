//! Salon shell - an interactive client for the beauty salon backend.
//!
//! Boots the session from durable storage, then accepts navigation and
//! account commands. Every navigation goes through the login guard.

mod app;
mod command;

use std::path::{Path, PathBuf};

use anyhow::Result;
use clap::Parser;
use salon_core::{Config, StorageBackend};
use tracing::{info, warn};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use app::App;

/// Log file name in the cache directory
const LOG_FILE: &str = "salon.log";

#[derive(Debug, Parser)]
#[command(name = "salon", version, about = "Interactive shell for the beauty salon backend")]
struct Args {
    /// Path to open first
    #[arg(default_value = "/")]
    path: String,

    /// Session storage backend (file, keyring, memory)
    #[arg(long)]
    storage: Option<StorageBackend>,

    /// Backend base URL
    #[arg(long)]
    api_url: Option<String>,

    /// Config file to use instead of the default location
    #[arg(long)]
    config: Option<PathBuf>,
}

/// Initialize the tracing subscriber, logging to a file in `log_dir`.
///
/// Use RUST_LOG env var to control log level (e.g., RUST_LOG=debug).
fn init_tracing(log_dir: &Path) -> Option<WorkerGuard> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));

    let appender = RollingFileAppender::builder()
        .rotation(Rotation::NEVER)
        .filename_prefix(LOG_FILE)
        .build(log_dir);

    match appender {
        Ok(appender) => {
            let (writer, guard) = tracing_appender::non_blocking(appender);
            tracing_subscriber::registry()
                .with(fmt::layer().with_writer(writer).with_ansi(false))
                .with(filter)
                .init();
            Some(guard)
        }
        Err(e) => {
            eprintln!("Logging to stderr, cannot open log file: {}", e);
            tracing_subscriber::registry()
                .with(fmt::layer().with_writer(std::io::stderr))
                .with(filter)
                .init();
            None
        }
    }
}

fn load_config(path: &Path) -> (Config, Option<String>) {
    match Config::load_from(path) {
        Ok(config) => (config, None),
        Err(e) => (Config::default(), Some(format!("{:#}", e))),
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present (silently ignore if not found)
    let _ = dotenvy::dotenv();

    let args = Args::parse();

    let config_path = match args.config {
        Some(path) => Some(path),
        None => Config::config_path().ok(),
    };
    let (mut config, config_error) = match config_path {
        Some(ref path) => load_config(path),
        None => (Config::default(), None),
    };
    config.apply_env();
    if let Some(storage) = args.storage {
        config.storage = storage;
    }
    if let Some(url) = args.api_url {
        config.api_base_url = url;
    }

    let cache_dir = config.cache_dir().unwrap_or_else(|_| PathBuf::from("./cache"));
    let _log_guard = init_tracing(&cache_dir);
    info!(api = %config.api_base_url, storage = %config.storage, "Salon shell starting");
    if let Some(e) = config_error {
        warn!(error = %e, "Failed to load config, using defaults");
    }

    let (mut app, first) = App::new(config, config_path, &cache_dir, &args.path)?;
    if first.was_redirected() {
        println!("Not logged in. Type 'login' to sign in, 'help' for commands.");
    }

    let result = app.run().await;
    if let Err(ref e) = result {
        eprintln!("Error: {}", e);
    }

    info!("Salon shell shutting down");
    result
}
