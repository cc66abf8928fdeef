use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};

use crate::learning::Suggestion;
use crate::schedule::{Chain, Day, TimeBlock};

/// Something the user did that the learning engine can mine.
/// Immutable once created; owned by the event log.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BehaviorEvent {
    pub timestamp: DateTime<Local>,
    pub kind: BehaviorEventKind,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum BehaviorEventKind {
    BlockCreated {
        block: TimeBlock,
    },
    BlockCompleted {
        block: TimeBlock,
        success: bool,
    },
    BlockModified {
        block: TimeBlock,
        change_description: String,
    },
    ChainApplied {
        chain: Chain,
    },
    SuggestionAccepted {
        suggestion: Suggestion,
    },
    SuggestionRejected {
        suggestion: Suggestion,
    },
    /// End-of-day review with a 1-5 rating.
    DayReviewed {
        day: Day,
        rating: u8,
    },
}

impl BehaviorEvent {
    pub fn new(kind: BehaviorEventKind) -> Self {
        Self {
            timestamp: Local::now(),
            kind,
        }
    }

    pub fn at(timestamp: DateTime<Local>, kind: BehaviorEventKind) -> Self {
        Self { timestamp, kind }
    }

    pub fn block_completed(block: TimeBlock, success: bool) -> Self {
        Self::new(BehaviorEventKind::BlockCompleted { block, success })
    }

    pub fn chain_applied(chain: Chain) -> Self {
        Self::new(BehaviorEventKind::ChainApplied { chain })
    }

    /// The completed block and its outcome, if this is a completion.
    pub fn as_completion(&self) -> Option<(&TimeBlock, bool)> {
        match &self.kind {
            BehaviorEventKind::BlockCompleted { block, success } => Some((block, *success)),
            _ => None,
        }
    }

    pub fn as_chain(&self) -> Option<&Chain> {
        match &self.kind {
            BehaviorEventKind::ChainApplied { chain } => Some(chain),
            _ => None,
        }
    }

    /// Short label for listings and logs.
    pub fn label(&self) -> &'static str {
        match self.kind {
            BehaviorEventKind::BlockCreated { .. } => "block_created",
            BehaviorEventKind::BlockCompleted { .. } => "block_completed",
            BehaviorEventKind::BlockModified { .. } => "block_modified",
            BehaviorEventKind::ChainApplied { .. } => "chain_applied",
            BehaviorEventKind::SuggestionAccepted { .. } => "suggestion_accepted",
            BehaviorEventKind::SuggestionRejected { .. } => "suggestion_rejected",
            BehaviorEventKind::DayReviewed { .. } => "day_reviewed",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schedule::{EnergyType, FlowState};
    use chrono::Duration;

    #[test]
    fn completion_serializes_with_type_tag() {
        let block = TimeBlock::new(
            "Deep work",
            Local::now(),
            Duration::minutes(90),
            EnergyType::Sunrise,
            FlowState::Crystal,
        );
        let event = BehaviorEvent::block_completed(block, true);
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["kind"]["type"], "block_completed");
        assert_eq!(json["kind"]["success"], true);

        let decoded: BehaviorEvent = serde_json::from_value(json).unwrap();
        assert_eq!(decoded.label(), "block_completed");
        assert!(decoded.as_completion().unwrap().1);
        assert!(decoded.as_chain().is_none());
    }
}
