//! Commands module
//!
//! Defines all CLI commands and their handlers.

mod task;

use std::path::PathBuf;

use anyhow::Result;
use clap::Subcommand;

use crate::config::Config;
use neuroseg_core::domain::segmentation::SegmentationChannel;

/// Top-level CLI commands
#[derive(Subcommand)]
pub enum Commands {
    /// Start server-side processing of an uploaded scan
    Process {
        /// Identifier of the uploaded image
        image_id: String,
    },
    /// Fetch one status snapshot for a task
    Status {
        /// Task ID
        task_id: String,
    },
    /// Poll a task until it finishes, printing progress
    Watch {
        /// Task ID
        task_id: String,

        /// Also fetch the tissue preview images on success
        #[arg(long)]
        previews: bool,

        /// Directory to write fetched preview PNGs into (implies --previews)
        #[arg(long)]
        out_dir: Option<PathBuf>,
    },
    /// Fetch the volumetric results of a completed task
    Results {
        /// Task ID
        task_id: String,
    },
    /// Fetch one segmentation preview image
    Preview {
        /// Task ID
        task_id: String,

        /// Channel to fetch: gm, wm, csf or original
        #[arg(long, default_value = "gm")]
        channel: SegmentationChannel,

        /// Output PNG path
        #[arg(short, long)]
        output: PathBuf,
    },
}

/// Handle a CLI command
///
/// Routes the command to the appropriate handler.
pub async fn handle_command(command: Commands, config: &Config) -> Result<()> {
    match command {
        Commands::Process { image_id } => task::process(config, &image_id).await,
        Commands::Status { task_id } => task::status(config, &task_id).await,
        Commands::Watch {
            task_id,
            previews,
            out_dir,
        } => task::watch(config, &task_id, previews, out_dir).await,
        Commands::Results { task_id } => task::results(config, &task_id).await,
        Commands::Preview {
            task_id,
            channel,
            output,
        } => task::preview(config, &task_id, channel, &output).await,
    }
}
