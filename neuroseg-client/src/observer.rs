//! Observer events emitted by the task poller
//!
//! These events are the only way polling outcomes reach the caller.
//! Nothing is ever thrown out of the polling loop: every terminal
//! condition, including transport-level ones, arrives here exactly once.

use std::time::Duration;

use neuroseg_core::domain::segmentation::{PreviewImage, SegmentationChannel};
use neuroseg_core::domain::task::TaskStatus;
use neuroseg_core::domain::volumetrics::VolumetricResults;

/// Receives events from a poll session.
///
/// Implementations must not block; they are invoked from the polling
/// task itself.
pub trait TaskObserver: Send + Sync {
    fn on_event(&self, event: TaskEvent);
}

/// An event observed while tracking a task.
#[derive(Debug, Clone)]
pub enum TaskEvent {
    /// A successful non-terminal poll.
    Progress {
        status: TaskStatus,
        /// Completion percentage, 0-100.
        progress: u8,
        /// Full cumulative backend log observed so far, if any.
        log: Option<String>,
    },

    /// The task finished and its results were fetched.
    ///
    /// Fired exactly once, after which the session self-terminates.
    /// `previews` is `None` when preview fetching is disabled.
    Completed {
        results: VolumetricResults,
        previews: Option<ChannelPreviews>,
    },

    /// The session ended without results.
    ///
    /// Fired exactly once, after which the session self-terminates.
    Failed(TaskFailure),
}

/// Why a session ended without results.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum TaskFailure {
    /// The backend reported the task as failed.
    #[error("processing failed: {0}")]
    Processing(String),

    /// The server does not know this task id; it will never become valid.
    #[error("task '{0}' not found on the server")]
    NotFound(String),

    /// No terminal status within the polling ceiling.
    #[error("task did not finish within {} minutes", .0.as_secs() / 60)]
    TimedOut(Duration),

    /// Processing succeeded but the follow-up results fetch failed.
    ///
    /// Deliberately distinct from [`TaskFailure::Processing`]: the task
    /// itself did not fail, only the retrieval of its output.
    #[error("task completed but results could not be fetched: {0}")]
    ResultsUnavailable(String),
}

/// Preview images for the three tissue channels.
///
/// Each channel degrades independently: a channel whose fetch exhausted
/// its retries is simply absent and does not affect the other two.
#[derive(Debug, Clone, Default)]
pub struct ChannelPreviews {
    pub grey_matter: Option<PreviewImage>,
    pub white_matter: Option<PreviewImage>,
    pub csf: Option<PreviewImage>,
}

impl ChannelPreviews {
    pub fn get(&self, channel: SegmentationChannel) -> Option<&PreviewImage> {
        match channel {
            SegmentationChannel::GreyMatter => self.grey_matter.as_ref(),
            SegmentationChannel::WhiteMatter => self.white_matter.as_ref(),
            SegmentationChannel::Csf => self.csf.as_ref(),
            SegmentationChannel::Original => None,
        }
    }

    /// All three tissue channels were fetched successfully.
    pub fn is_complete(&self) -> bool {
        self.grey_matter.is_some() && self.white_matter.is_some() && self.csf.is_some()
    }
}
