//! Chains: ordered sequences of blocks applied as one unit.

use chrono::Duration;
use serde::{Deserialize, Serialize};

use super::{bounded_secs, EnergyType, FlowState};

/// Completions needed before a chain becomes a routine.
pub const ROUTINE_PROMOTION_THRESHOLD: u32 = 3;

/// One step of a chain.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChainLink {
    pub title: String,
    pub duration_secs: i64,
    pub energy: EnergyType,
    pub flow: FlowState,
}

impl ChainLink {
    pub fn new(
        title: impl Into<String>,
        duration: Duration,
        energy: EnergyType,
        flow: FlowState,
    ) -> Self {
        Self {
            title: title.into(),
            duration_secs: bounded_secs(duration.num_seconds()),
            energy,
            flow,
        }
    }

    pub fn duration(&self) -> Duration {
        Duration::seconds(bounded_secs(self.duration_secs))
    }
}

/// An ordered group of blocks, e.g. "morning routine".
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Chain {
    pub id: String,
    pub name: String,
    pub links: Vec<ChainLink>,
    #[serde(default)]
    pub completion_count: u32,
    #[serde(default)]
    pub is_routine: bool,
}

impl Chain {
    pub fn new(name: impl Into<String>, links: Vec<ChainLink>) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            name: name.into(),
            links,
            completion_count: 0,
            is_routine: false,
        }
    }

    /// Sum of link durations, without buffers.
    pub fn total_duration(&self) -> Duration {
        self.links.iter().map(ChainLink::duration).sum()
    }

    pub fn contains_title(&self, title: &str) -> bool {
        self.links.iter().any(|l| l.title == title)
    }

    /// Count a full run-through; returns true when this call promoted the
    /// chain to a routine.
    pub fn record_completion(&mut self) -> bool {
        self.completion_count += 1;
        if !self.is_routine && self.completion_count >= ROUTINE_PROMOTION_THRESHOLD {
            self.is_routine = true;
            return true;
        }
        false
    }
}
