//! Neuroseg CLI
//!
//! Command-line interface for the MRI segmentation backend: start
//! processing, inspect task status, watch a task to completion, and
//! fetch results and preview images.

mod commands;
mod config;

use anyhow::Result;
use clap::Parser;
use commands::{Commands, handle_command};
use config::Config;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "neuroseg")]
#[command(about = "MRI segmentation task client", long_about = None)]
struct Cli {
    /// Segmentation backend URL
    #[arg(
        long,
        env = "NEUROSEG_SERVER_URL",
        default_value = "http://localhost:5000"
    )]
    server_url: String,

    #[command(subcommand)]
    command: Commands,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "neuroseg=warn".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();

    let config = Config {
        server_url: cli.server_url,
    };

    handle_command(cli.command, &config).await
}
