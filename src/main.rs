//! domscout - continuous discovery of interactable page elements.
//!
//! Main entry point for the domscout CLI.

mod adapters;
mod browser;
mod cli;
mod cmd_config;
mod cmd_observe;

use std::sync::OnceLock;

use clap::Parser;
use tracing::{info, warn};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

use domscout_config::{ConfigLoader, LoggingConfig};

use crate::cli::{Cli, Commands};

static LOG_GUARD: OnceLock<WorkerGuard> = OnceLock::new();

/// Initialize tracing with console output and an optional daily log file.
///
/// `RUST_LOG` wins over `logging.level`.
fn init_tracing(logging: &LoggingConfig) -> Result<(), Box<dyn std::error::Error>> {
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&logging.level))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    let file_layer = if logging.file_enabled {
        let log_dir = logging.resolved_directory();
        std::fs::create_dir_all(&log_dir)?;

        let file_appender = RollingFileAppender::builder()
            .rotation(Rotation::DAILY)
            .filename_prefix("domscout")
            .filename_suffix("log")
            .max_log_files(14)
            .build(&log_dir)?;
        let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);
        let _ = LOG_GUARD.set(guard);

        Some(fmt::layer().with_writer(non_blocking).with_ansi(false).boxed())
    } else {
        None
    };

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt::layer().with_target(true).with_writer(std::io::stderr))
        .with(file_layer)
        .init();

    Ok(())
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let config = ConfigLoader::load_or_default(&cli.config)?;
    init_tracing(&config.logging)?;

    if !cli.config.exists() {
        warn!("{} not found, using defaults", cli.config.display());
    }
    info!("domscout v{}", env!("CARGO_PKG_VERSION"));

    match cli.command {
        Commands::Watch { url, duration, output } => {
            cmd_observe::watch(config, cli.endpoint, &url, duration, output).await
        }
        Commands::Scan { url, output } => {
            cmd_observe::scan(config, cli.endpoint, &url, output).await
        }
        Commands::Config { action } => cmd_config::handle_config_command(action, &cli.config, &config),
    }
}
