//! Adaptive polling schedule
//!
//! The polling interval is a pure function of elapsed time since the first
//! poll, not of the number of polls. The three-phase shape is tuned to the
//! backend tool's observed completion-time distribution: most segmentation
//! runs finish between 7 and 13 minutes, so that window is polled densely
//! and the bands on either side are polled cheaply.

use std::time::Duration;

/// Start of the high-frequency window.
pub const FAST_WINDOW_START: Duration = Duration::from_secs(7 * 60);
/// End of the high-frequency window.
pub const FAST_WINDOW_END: Duration = Duration::from_secs(13 * 60);

/// Interval before the fast window.
pub const EARLY_INTERVAL: Duration = Duration::from_secs(30);
/// Interval inside the fast window.
pub const FAST_INTERVAL: Duration = Duration::from_secs(10);
/// Interval after the fast window, for stragglers.
pub const LATE_INTERVAL: Duration = Duration::from_secs(60);

/// Hard ceiling on total polling time.
///
/// The backend tool can hang indefinitely on malformed input; a session
/// that reaches this elapsed time is failed with a timeout rather than
/// polled forever.
pub const POLL_CEILING: Duration = Duration::from_secs(30 * 60);

/// Delay before the next poll, given time elapsed since the first one.
pub fn interval_for(elapsed: Duration) -> Duration {
    if elapsed < FAST_WINDOW_START {
        EARLY_INTERVAL
    } else if elapsed < FAST_WINDOW_END {
        FAST_INTERVAL
    } else {
        LATE_INTERVAL
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_early_phase() {
        assert_eq!(interval_for(Duration::ZERO), EARLY_INTERVAL);
        assert_eq!(interval_for(Duration::from_secs(60)), EARLY_INTERVAL);
        assert_eq!(
            interval_for(FAST_WINDOW_START - Duration::from_secs(1)),
            EARLY_INTERVAL
        );
    }

    #[test]
    fn test_fast_window_boundaries() {
        // The window is inclusive at 7:00 and exclusive at 13:00.
        assert_eq!(interval_for(FAST_WINDOW_START), FAST_INTERVAL);
        assert_eq!(interval_for(Duration::from_secs(10 * 60)), FAST_INTERVAL);
        assert_eq!(
            interval_for(FAST_WINDOW_END - Duration::from_secs(1)),
            FAST_INTERVAL
        );
        assert_eq!(interval_for(FAST_WINDOW_END), LATE_INTERVAL);
    }

    #[test]
    fn test_late_phase() {
        assert_eq!(interval_for(Duration::from_secs(20 * 60)), LATE_INTERVAL);
        assert_eq!(interval_for(Duration::from_secs(3 * 3600)), LATE_INTERVAL);
    }
}
