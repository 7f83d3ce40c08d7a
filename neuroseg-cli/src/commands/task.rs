//! Task command handlers
//!
//! Handles starting processing, one-shot status queries, watching a task
//! through the poller, and fetching results and previews.

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use anyhow::{Context, Result, bail};
use colored::*;

use crate::config::Config;
use neuroseg_client::{
    PollerConfig, SegmentationApi, SegmentationClient, TaskEvent, TaskFailure, TaskObserver,
    TaskPoller,
};
use neuroseg_core::domain::segmentation::SegmentationChannel;
use neuroseg_core::domain::task::TaskStatus;
use neuroseg_core::domain::volumetrics::VolumetricResults;

fn client(config: &Config) -> SegmentationClient {
    SegmentationClient::new(&config.server_url)
}

/// Start processing an uploaded scan
pub async fn process(config: &Config, image_id: &str) -> Result<()> {
    let task_id = client(config)
        .start_processing(image_id)
        .await
        .context("Failed to start processing")?;

    println!("{} {}", "Processing started, task:".bold(), task_id);
    println!("Run {} to follow it.", format!("neuroseg watch {task_id}").cyan());

    Ok(())
}

/// Fetch and display one status snapshot
pub async fn status(config: &Config, task_id: &str) -> Result<()> {
    let snapshot = client(config)
        .task_status(task_id)
        .await
        .context("Failed to fetch task status")?;

    println!(
        "{} {} ({}%)",
        "Status:".bold(),
        status_label(snapshot.status),
        snapshot.progress
    );
    if let Some(error) = &snapshot.error {
        println!("{} {}", "Error:".red().bold(), error);
    }
    if let Some(log) = &snapshot.log {
        println!();
        println!("{}", "Backend log:".bold());
        println!("{log}");
    }

    Ok(())
}

/// Poll a task until it terminates, printing progress as it goes
pub async fn watch(
    config: &Config,
    task_id: &str,
    previews: bool,
    out_dir: Option<PathBuf>,
) -> Result<()> {
    let poller_config = apply_preview_flags(PollerConfig::from_env(), previews, out_dir.as_deref());
    poller_config.validate()?;

    let observer = Arc::new(ConsoleObserver::default());
    let poller = TaskPoller::new(Arc::new(client(config)), poller_config);

    let session = poller.start(task_id, observer.clone())?;
    session.wait().await;

    match observer.take_terminal() {
        Some(TaskEvent::Completed { results, previews }) => {
            println!();
            print_results(&results);

            if let (Some(previews), Some(dir)) = (previews, out_dir) {
                std::fs::create_dir_all(&dir)
                    .with_context(|| format!("Failed to create {}", dir.display()))?;
                for channel in SegmentationChannel::TISSUES {
                    match previews.get(channel) {
                        Some(image) => {
                            let path = dir.join(format!("{channel}.png"));
                            std::fs::write(&path, &image.png)
                                .with_context(|| format!("Failed to write {}", path.display()))?;
                            println!("Wrote {}", path.display().to_string().green());
                        }
                        None => {
                            println!("{}", format!("No preview for {channel}").yellow());
                        }
                    }
                }
            }
            Ok(())
        }
        Some(TaskEvent::Failed(failure)) => bail!("{failure}"),
        _ => bail!("polling ended without a terminal event"),
    }
}

/// Fetch and display the volumetric results of a completed task
pub async fn results(config: &Config, task_id: &str) -> Result<()> {
    let results = client(config)
        .task_results(task_id)
        .await
        .context("Failed to fetch results")?;

    print_results(&results);
    Ok(())
}

/// Fetch one preview image and write it to disk
pub async fn preview(
    config: &Config,
    task_id: &str,
    channel: SegmentationChannel,
    output: &Path,
) -> Result<()> {
    let image = client(config)
        .channel_preview(task_id, channel)
        .await
        .with_context(|| format!("Failed to fetch {channel} preview"))?;

    std::fs::write(output, &image.png)
        .with_context(|| format!("Failed to write {}", output.display()))?;

    println!(
        "Wrote {} preview to {}",
        channel,
        output.display().to_string().green()
    );
    Ok(())
}

/// Turn the watch flags into poller configuration.
///
/// The flags only ever opt in: without them the NEUROSEG_FETCH_PREVIEWS
/// environment setting stands as-is.
fn apply_preview_flags(
    mut config: PollerConfig,
    previews: bool,
    out_dir: Option<&Path>,
) -> PollerConfig {
    if previews || out_dir.is_some() {
        config.fetch_previews = true;
    }
    config
}

/// Observer that prints progress lines and keeps the terminal event.
#[derive(Default)]
struct ConsoleObserver {
    terminal: Mutex<Option<TaskEvent>>,
}

impl ConsoleObserver {
    fn take_terminal(&self) -> Option<TaskEvent> {
        self.terminal.lock().unwrap().take()
    }
}

impl TaskObserver for ConsoleObserver {
    fn on_event(&self, event: TaskEvent) {
        let stamp = chrono::Local::now().format("%H:%M:%S");
        match &event {
            TaskEvent::Progress {
                status, progress, ..
            } => {
                println!("[{stamp}] {} {progress:>3}%", status_label(*status));
            }
            TaskEvent::Completed { .. } => {
                println!("[{stamp}] {}", "completed".green().bold());
                *self.terminal.lock().unwrap() = Some(event);
            }
            TaskEvent::Failed(failure) => {
                let label = match failure {
                    TaskFailure::TimedOut(_) => "timed out",
                    TaskFailure::NotFound(_) => "not found",
                    TaskFailure::ResultsUnavailable(_) => "results unavailable",
                    TaskFailure::Processing(_) => "failed",
                };
                println!("[{stamp}] {}", label.red().bold());
                *self.terminal.lock().unwrap() = Some(event);
            }
        }
    }
}

fn status_label(status: TaskStatus) -> ColoredString {
    match status {
        TaskStatus::Pending => "pending".yellow(),
        TaskStatus::Processing => "processing".cyan(),
        TaskStatus::Completed => "completed".green(),
        TaskStatus::Failed => "failed".red(),
    }
}

/// Print the volumetric results with TIV percentages.
fn print_results(results: &VolumetricResults) {
    println!("{}", "Volumetric results (mm³):".bold());
    for (name, channel) in [
        ("Grey matter ", SegmentationChannel::GreyMatter),
        ("White matter", SegmentationChannel::WhiteMatter),
        ("CSF         ", SegmentationChannel::Csf),
    ] {
        let volume = results.volume(channel).unwrap_or(0.0);
        match results.tissue_fraction(channel) {
            Some(fraction) => println!(
                "  {name} {volume:>12.1}  ({:.1}% of TIV)",
                fraction * 100.0
            ),
            None => println!("  {name} {volume:>12.1}"),
        }
    }
    println!("  {} {:>12.1}", "TIV         ", results.tiv_volume);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flags_opt_into_previews() {
        let base = PollerConfig::default();
        assert!(!base.fetch_previews);

        let config = apply_preview_flags(base.clone(), true, None);
        assert!(config.fetch_previews);

        let config = apply_preview_flags(base, false, Some(Path::new("/tmp/previews")));
        assert!(config.fetch_previews);
    }

    #[test]
    fn test_no_flags_leave_config_untouched() {
        // An environment-sourced setting must survive a flagless watch.
        let enabled = PollerConfig {
            fetch_previews: true,
            ..PollerConfig::default()
        };
        assert!(apply_preview_flags(enabled, false, None).fetch_previews);

        let disabled = PollerConfig::default();
        assert!(!apply_preview_flags(disabled, false, None).fetch_previews);
    }
}
