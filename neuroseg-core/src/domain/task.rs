//! Task domain types

use serde::{Deserialize, Serialize};

/// Canonical task status
///
/// The backend reports status as a raw string and is not consistent about
/// its vocabulary (`completed` vs `success`, `failed` vs `error`). All of
/// those spellings are collapsed onto this enum at the wire boundary via
/// [`TaskStatus::from_wire`]; nothing downstream ever branches on the raw
/// string.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TaskStatus {
    Pending,
    Processing,
    Completed,
    Failed,
}

impl TaskStatus {
    /// Map a raw backend status string onto the canonical enum.
    ///
    /// Returns `None` for spellings this client has never seen; callers
    /// decide how to handle an unknown status (the poller treats it as
    /// non-terminal and keeps polling).
    pub fn from_wire(raw: &str) -> Option<Self> {
        match raw {
            "pending" | "queued" => Some(Self::Pending),
            "processing" | "running" => Some(Self::Processing),
            "completed" | "success" => Some(Self::Completed),
            "failed" | "error" => Some(Self::Failed),
            _ => None,
        }
    }

    /// Whether polling must stop after observing this status.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed | Self::Failed)
    }
}

/// One status snapshot of a server-side task, as observed by a single poll.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskSnapshot {
    pub status: TaskStatus,
    /// Completion percentage, clamped to 0-100 at the wire boundary.
    pub progress: u8,
    /// Human-readable failure description; present only on failure.
    pub error: Option<String>,
    /// Cumulative log text from the backend processing tool.
    pub log: Option<String>,
}

/// Cumulative backend log, retained across polls.
///
/// The backend streams its processing log as a cumulative string that grows
/// with every snapshot. Transient backend states occasionally return a
/// shorter (or empty) log; text already observed is never discarded.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CumulativeLog {
    text: String,
}

impl CumulativeLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Merge a log snapshot into the retained text.
    ///
    /// A snapshot at least as long as what we hold replaces it; a shorter
    /// one is ignored so the log never shrinks.
    pub fn absorb(&mut self, snapshot: &str) {
        if snapshot.len() >= self.text.len() {
            self.text = snapshot.to_string();
        }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_wire_canonical_spellings() {
        assert_eq!(TaskStatus::from_wire("pending"), Some(TaskStatus::Pending));
        assert_eq!(
            TaskStatus::from_wire("processing"),
            Some(TaskStatus::Processing)
        );
        assert_eq!(
            TaskStatus::from_wire("completed"),
            Some(TaskStatus::Completed)
        );
        assert_eq!(TaskStatus::from_wire("failed"), Some(TaskStatus::Failed));
    }

    #[test]
    fn test_from_wire_alternate_spellings() {
        assert_eq!(
            TaskStatus::from_wire("success"),
            Some(TaskStatus::Completed)
        );
        assert_eq!(TaskStatus::from_wire("error"), Some(TaskStatus::Failed));
        assert_eq!(TaskStatus::from_wire("queued"), Some(TaskStatus::Pending));
        assert_eq!(
            TaskStatus::from_wire("running"),
            Some(TaskStatus::Processing)
        );
    }

    #[test]
    fn test_from_wire_unknown() {
        assert_eq!(TaskStatus::from_wire("exploded"), None);
        assert_eq!(TaskStatus::from_wire(""), None);
    }

    #[test]
    fn test_terminal_statuses() {
        assert!(TaskStatus::Completed.is_terminal());
        assert!(TaskStatus::Failed.is_terminal());
        assert!(!TaskStatus::Pending.is_terminal());
        assert!(!TaskStatus::Processing.is_terminal());
    }

    #[test]
    fn test_cumulative_log_grows() {
        let mut log = CumulativeLog::new();
        log.absorb("step 1\n");
        log.absorb("step 1\nstep 2\n");
        assert_eq!(log.text(), "step 1\nstep 2\n");
    }

    #[test]
    fn test_cumulative_log_never_truncates() {
        let mut log = CumulativeLog::new();
        log.absorb("step 1\nstep 2\n");
        log.absorb("");
        log.absorb("step");
        assert_eq!(log.text(), "step 1\nstep 2\n");
    }

    #[test]
    fn test_cumulative_log_equal_length_replaces() {
        let mut log = CumulativeLog::new();
        log.absorb("aaaa");
        log.absorb("bbbb");
        assert_eq!(log.text(), "bbbb");
    }
}
