//! Time block: the unit of scheduling.

use chrono::{DateTime, Duration, Local};
use serde::{Deserialize, Serialize};

use super::{bounded_secs, EnergyType, FlowState, GlassState};

/// A scheduled activity.
///
/// Invariant: `is_staged` implies `glass_state == GlassState::Mist`, and a
/// block that is not staged is in one of the committed glass states.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimeBlock {
    pub id: String,
    pub title: String,
    pub start_time: DateTime<Local>,
    pub duration_secs: i64,
    pub energy: EnergyType,
    pub flow: FlowState,
    pub glass_state: GlassState,
    #[serde(default)]
    pub is_staged: bool,
    #[serde(default)]
    pub staged_by: Option<String>,
    #[serde(default)]
    pub explanation: Option<String>,
    /// Whether the activity was actually done.
    #[serde(default)]
    pub completed: bool,
}

impl TimeBlock {
    /// Create a committed block with a fresh id.
    pub fn new(
        title: impl Into<String>,
        start_time: DateTime<Local>,
        duration: Duration,
        energy: EnergyType,
        flow: FlowState,
    ) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            title: title.into(),
            start_time,
            duration_secs: bounded_secs(duration.num_seconds()),
            energy,
            flow,
            glass_state: GlassState::Solid,
            is_staged: false,
            staged_by: None,
            explanation: None,
            completed: false,
        }
    }

    pub fn with_completed(mut self, completed: bool) -> Self {
        self.completed = completed;
        self
    }

    /// Length of the block, clamped to `[0, MAX_BLOCK_SECS]`.
    pub fn duration(&self) -> Duration {
        Duration::seconds(bounded_secs(self.duration_secs))
    }

    /// End of the block; a start at the edge of the representable range
    /// yields a zero-length block rather than overflowing.
    pub fn end_time(&self) -> DateTime<Local> {
        self.start_time
            .checked_add_signed(self.duration())
            .unwrap_or(self.start_time)
    }

    /// Whether this block intersects the half-open range `[start, end)`.
    pub fn overlaps(&self, start: DateTime<Local>, end: DateTime<Local>) -> bool {
        self.start_time < end && self.end_time() > start
    }

    /// Mark the block as a staged proposal.
    pub(crate) fn mark_staged(&mut self, explanation: Option<String>, staged_by: Option<String>) {
        self.is_staged = true;
        self.glass_state = GlassState::Mist;
        self.explanation = explanation;
        self.staged_by = staged_by;
    }

    /// Promote a staged proposal to a fully committed block.
    pub(crate) fn mark_committed(&mut self) {
        self.is_staged = false;
        self.glass_state = GlassState::Solid;
    }

    /// Check the staged/glass invariant.
    pub fn is_consistent(&self) -> bool {
        if self.is_staged {
            self.glass_state == GlassState::Mist
        } else {
            self.glass_state.is_committed()
        }
    }
}
