//! Free-interval detection.
//!
//! Given a window and a set of occupied blocks, produce the complementary
//! free intervals. Pure and total: bad input only yields fewer gaps.

use chrono::{DateTime, Duration, Local};
use serde::{Deserialize, Serialize};

use crate::schedule::TimeBlock;

/// A half-open free interval `[start, end)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeSlot {
    pub start: DateTime<Local>,
    pub end: DateTime<Local>,
}

impl TimeSlot {
    /// Create a slot. An inverted range collapses to an empty slot at `start`.
    pub fn new(start: DateTime<Local>, end: DateTime<Local>) -> Self {
        Self {
            start,
            end: end.max(start),
        }
    }

    pub fn duration(&self) -> Duration {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.end <= self.start
    }

    /// Check if this slot can hold something of the given length
    pub fn can_fit(&self, duration: Duration) -> bool {
        self.duration() >= duration
    }
}

/// Find free intervals inside `window` not covered by any of `blocks`.
///
/// Blocks may overlap each other and may stick out of the window; only the
/// parts inside the window matter. A trailing gap up to `window.end` is
/// always emitted when one remains.
pub fn find_gaps(window: TimeSlot, blocks: &[TimeBlock]) -> Vec<TimeSlot> {
    if window.is_empty() {
        return Vec::new();
    }

    let mut occupied: Vec<(DateTime<Local>, DateTime<Local>)> = blocks
        .iter()
        .filter(|b| b.duration_secs > 0 && b.overlaps(window.start, window.end))
        .map(|b| (b.start_time, b.end_time()))
        .collect();
    occupied.sort_by_key(|(start, _)| *start);

    let mut gaps = Vec::new();
    let mut cursor = window.start;

    for (start, end) in occupied {
        if start > cursor {
            gaps.push(TimeSlot::new(cursor, start.min(window.end)));
        }
        if end > cursor {
            cursor = end.min(window.end);
        }
        if cursor >= window.end {
            break;
        }
    }

    if cursor < window.end {
        gaps.push(TimeSlot::new(cursor, window.end));
    }

    gaps
}
