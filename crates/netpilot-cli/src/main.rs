//! NetPilot CLI
//!
//! Discovers network hardware, loads drivers and firmware, and optionally
//! persists the result to the boot and startup configuration.

mod cli;
mod commands;
mod error;

use clap::Parser;
use colored::Colorize;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, fmt};

use cli::Cli;
use error::Result;

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        eprintln!("{}: {}", "error".red().bold(), e);
        std::process::exit(1);
    }
}

async fn run() -> Result<()> {
    let cli = Cli::parse();
    init_logging(&cli);

    if cli.show_coverage {
        return commands::run_coverage(cli.json);
    }
    commands::run_discovery(&cli).await
}

/// Log to stderr so `--json` output on stdout stays machine-readable.
fn init_logging(cli: &Cli) {
    let filter = match cli.log_level() {
        Some(level) => EnvFilter::new(level),
        None => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
    };

    let layer = fmt::layer()
        .compact()
        .with_writer(std::io::stderr)
        .with_target(cli.verbose);

    if tracing_subscriber::registry().with(filter).with(layer).try_init().is_err() {
        eprintln!("{}: logging was already initialized", "warning".yellow().bold());
    }
    tracing::debug!("Verbose mode enabled");
}
