//! Task poller
//!
//! Owns the lifecycle of repeated status queries for a single task:
//! immediate first poll, interval adaptation over elapsed time, a hard
//! ceiling on total polling time, and one-shot result fetching when the
//! task completes. All outcomes reach the caller through observer
//! events; nothing escapes the polling loop as a panic or error.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::{Instant, sleep};
use tracing::{debug, warn};

use crate::error::{ClientError, Result};
use crate::observer::{ChannelPreviews, TaskEvent, TaskFailure, TaskObserver};
use crate::tasks::SegmentationApi;
use neuroseg_core::domain::segmentation::{PreviewImage, SegmentationChannel};
use neuroseg_core::domain::task::{CumulativeLog, TaskStatus};
use neuroseg_core::schedule;

/// Poller configuration
///
/// Intervals come from the shared schedule in `neuroseg_core::schedule`;
/// only the knobs that vary per deployment live here.
#[derive(Debug, Clone)]
pub struct PollerConfig {
    /// Maximum total polling time before the session fails with a timeout
    pub poll_ceiling: Duration,

    /// Whether to fetch the three tissue previews after a successful run
    pub fetch_previews: bool,

    /// Attempts per preview channel before degrading to an absent image
    pub preview_attempts: u32,

    /// Base delay between preview attempts; grows linearly per attempt
    pub preview_retry_delay: Duration,
}

impl Default for PollerConfig {
    fn default() -> Self {
        Self {
            poll_ceiling: schedule::POLL_CEILING,
            fetch_previews: false,
            preview_attempts: 3,
            preview_retry_delay: Duration::from_secs(2),
        }
    }
}

impl PollerConfig {
    /// Creates configuration from environment variables, falling back to
    /// defaults for anything unset
    ///
    /// Recognized variables:
    /// - NEUROSEG_POLL_CEILING_SECS
    /// - NEUROSEG_FETCH_PREVIEWS ("1" or "true")
    /// - NEUROSEG_PREVIEW_ATTEMPTS
    /// - NEUROSEG_PREVIEW_RETRY_DELAY_SECS
    pub fn from_env() -> Self {
        let defaults = Self::default();

        let poll_ceiling = std::env::var("NEUROSEG_POLL_CEILING_SECS")
            .ok()
            .and_then(|s| s.parse::<u64>().ok())
            .map(Duration::from_secs)
            .unwrap_or(defaults.poll_ceiling);

        let fetch_previews = std::env::var("NEUROSEG_FETCH_PREVIEWS")
            .map(|s| s == "1" || s.eq_ignore_ascii_case("true"))
            .unwrap_or(defaults.fetch_previews);

        let preview_attempts = std::env::var("NEUROSEG_PREVIEW_ATTEMPTS")
            .ok()
            .and_then(|s| s.parse::<u32>().ok())
            .unwrap_or(defaults.preview_attempts);

        let preview_retry_delay = std::env::var("NEUROSEG_PREVIEW_RETRY_DELAY_SECS")
            .ok()
            .and_then(|s| s.parse::<u64>().ok())
            .map(Duration::from_secs)
            .unwrap_or(defaults.preview_retry_delay);

        Self {
            poll_ceiling,
            fetch_previews,
            preview_attempts,
            preview_retry_delay,
        }
    }

    /// Validates the configuration
    pub fn validate(&self) -> Result<()> {
        if self.poll_ceiling.is_zero() {
            return Err(ClientError::InvalidRequest(
                "poll_ceiling must be greater than 0".to_string(),
            ));
        }
        if self.preview_attempts == 0 {
            return Err(ClientError::InvalidRequest(
                "preview_attempts must be greater than 0".to_string(),
            ));
        }
        Ok(())
    }
}

/// Handle to one active polling loop.
///
/// The session *is* the cancellation handle: there is no global polling
/// state anywhere, so dropping or stopping the session is the only way
/// its timer survives or dies. Cloning yields another handle to the
/// same session.
#[derive(Clone)]
pub struct PollSession {
    inner: Arc<SessionInner>,
}

struct SessionInner {
    task_id: String,
    stop_requested: AtomicBool,
    finished: AtomicBool,
    handle: Mutex<Option<JoinHandle<()>>>,
}

impl PollSession {
    fn new(task_id: &str) -> Self {
        Self {
            inner: Arc::new(SessionInner {
                task_id: task_id.to_string(),
                stop_requested: AtomicBool::new(false),
                finished: AtomicBool::new(false),
                handle: Mutex::new(None),
            }),
        }
    }

    /// The task this session is tracking.
    pub fn task_id(&self) -> &str {
        &self.inner.task_id
    }

    /// Cancel the pending poll timer.
    ///
    /// Idempotent: safe to call repeatedly, and a no-op after the session
    /// has already terminated naturally. An in-flight status request
    /// cannot be aborted mid-transfer; its late response is discarded.
    pub fn stop(&self) {
        self.inner.stop_requested.store(true, Ordering::SeqCst);
        let handle = self.inner.handle.lock().unwrap().take();
        if let Some(handle) = handle {
            handle.abort();
        }
    }

    /// Whether the session has stopped, either naturally or via `stop()`.
    pub fn is_finished(&self) -> bool {
        self.inner.finished.load(Ordering::SeqCst)
            || self.inner.stop_requested.load(Ordering::SeqCst)
    }

    /// Wait for the session to terminate.
    pub async fn wait(&self) {
        let handle = self.inner.handle.lock().unwrap().take();
        if let Some(handle) = handle {
            // Abort errors are expected when stop() raced with completion.
            let _ = handle.await;
        }
    }

    fn stop_requested(&self) -> bool {
        self.inner.stop_requested.load(Ordering::SeqCst)
    }

    fn mark_finished(&self) {
        self.inner.finished.store(true, Ordering::SeqCst);
    }

    fn attach(&self, handle: JoinHandle<()>) {
        *self.inner.handle.lock().unwrap() = Some(handle);
    }
}

/// Drives polling loops against a segmentation backend.
///
/// At most one session started through a given poller is active at a
/// time: `start()` stops any previous session before its replacement's
/// first poll can fire, so two loops can never poll concurrently.
pub struct TaskPoller {
    api: Arc<dyn SegmentationApi>,
    config: PollerConfig,
    active: Mutex<Option<PollSession>>,
}

impl TaskPoller {
    /// Creates a new poller
    pub fn new(api: Arc<dyn SegmentationApi>, config: PollerConfig) -> Self {
        Self {
            api,
            config,
            active: Mutex::new(None),
        }
    }

    /// Begin polling a task. The first status query is issued immediately.
    ///
    /// Must be called from within a Tokio runtime. Any session previously
    /// started through this poller is stopped first. Polling failures
    /// after this returns never surface as errors; they arrive at the
    /// observer as a [`TaskEvent::Failed`].
    pub fn start(&self, task_id: &str, observer: Arc<dyn TaskObserver>) -> Result<PollSession> {
        if task_id.is_empty() {
            return Err(ClientError::InvalidRequest(
                "task id cannot be empty".to_string(),
            ));
        }

        let session = PollSession::new(task_id);

        let mut active = self.active.lock().unwrap();
        if let Some(previous) = active.take() {
            debug!(
                previous = previous.task_id(),
                replacement = task_id,
                "stopping superseded poll session"
            );
            previous.stop();
        }

        let handle = tokio::spawn(run_session(
            Arc::clone(&self.api),
            self.config.clone(),
            session.clone(),
            observer,
        ));
        session.attach(handle);
        *active = Some(session.clone());

        Ok(session)
    }
}

/// The polling loop for one session.
///
/// Terminates on: terminal task status, task-not-found, or the elapsed
/// ceiling. Transport errors are logged and retried at the next
/// scheduled interval.
async fn run_session(
    api: Arc<dyn SegmentationApi>,
    config: PollerConfig,
    session: PollSession,
    observer: Arc<dyn TaskObserver>,
) {
    let started = Instant::now();
    let mut log = CumulativeLog::new();

    loop {
        if started.elapsed() >= config.poll_ceiling {
            session.mark_finished();
            observer.on_event(TaskEvent::Failed(TaskFailure::TimedOut(config.poll_ceiling)));
            return;
        }

        let snapshot = api.task_status(session.task_id()).await;

        // The session may have been stopped while the request was in
        // flight; a late response must not produce events.
        if session.stop_requested() {
            return;
        }

        match snapshot {
            Ok(snapshot) => {
                if let Some(text) = &snapshot.log {
                    log.absorb(text);
                }

                match snapshot.status {
                    TaskStatus::Completed => {
                        finish_success(&api, &config, &session, &observer).await;
                        return;
                    }
                    TaskStatus::Failed => {
                        let message = snapshot.error.unwrap_or_else(|| {
                            "processing failed on the server".to_string()
                        });
                        session.mark_finished();
                        observer.on_event(TaskEvent::Failed(TaskFailure::Processing(message)));
                        return;
                    }
                    status => {
                        observer.on_event(TaskEvent::Progress {
                            status,
                            progress: snapshot.progress,
                            log: (!log.is_empty()).then(|| log.text().to_string()),
                        });
                    }
                }
            }
            Err(e) if e.is_task_not_found() => {
                session.mark_finished();
                observer.on_event(TaskEvent::Failed(TaskFailure::NotFound(
                    session.task_id().to_string(),
                )));
                return;
            }
            Err(e) => {
                warn!(
                    task_id = session.task_id(),
                    error = %e,
                    "status poll failed, retrying at next interval"
                );
            }
        }

        sleep(schedule::interval_for(started.elapsed())).await;
    }
}

/// One-shot result fetch after a terminal success, plus optional previews.
async fn finish_success(
    api: &Arc<dyn SegmentationApi>,
    config: &PollerConfig,
    session: &PollSession,
    observer: &Arc<dyn TaskObserver>,
) {
    let results = api.task_results(session.task_id()).await;

    if session.stop_requested() {
        return;
    }

    match results {
        Ok(results) => {
            let previews = if config.fetch_previews {
                Some(fetch_previews(api, session.task_id(), config).await)
            } else {
                None
            };

            if session.stop_requested() {
                return;
            }

            session.mark_finished();
            observer.on_event(TaskEvent::Completed { results, previews });
        }
        Err(e) => {
            session.mark_finished();
            observer.on_event(TaskEvent::Failed(TaskFailure::ResultsUnavailable(
                e.to_string(),
            )));
        }
    }
}

/// Fetch the three tissue previews in parallel.
///
/// Channels fail independently: one exhausting its retries leaves a gap
/// in [`ChannelPreviews`] without touching the other two.
async fn fetch_previews(
    api: &Arc<dyn SegmentationApi>,
    task_id: &str,
    config: &PollerConfig,
) -> ChannelPreviews {
    let (grey_matter, white_matter, csf) = tokio::join!(
        fetch_channel(api, task_id, SegmentationChannel::GreyMatter, config),
        fetch_channel(api, task_id, SegmentationChannel::WhiteMatter, config),
        fetch_channel(api, task_id, SegmentationChannel::Csf, config),
    );

    ChannelPreviews {
        grey_matter,
        white_matter,
        csf,
    }
}

/// Fetch one channel with bounded retries and linear backoff.
async fn fetch_channel(
    api: &Arc<dyn SegmentationApi>,
    task_id: &str,
    channel: SegmentationChannel,
    config: &PollerConfig,
) -> Option<PreviewImage> {
    for attempt in 1..=config.preview_attempts {
        match api.channel_preview(task_id, channel).await {
            Ok(image) => return Some(image),
            Err(e) => {
                warn!(
                    task_id,
                    %channel,
                    attempt,
                    error = %e,
                    "preview fetch failed"
                );
                if attempt < config.preview_attempts {
                    sleep(config.preview_retry_delay * attempt).await;
                }
            }
        }
    }

    warn!(task_id, %channel, "preview retries exhausted, channel degraded");
    None
}
