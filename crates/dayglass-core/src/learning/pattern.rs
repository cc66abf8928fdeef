//! Pattern types produced by the analyzer.

use serde::{Deserialize, Serialize};

use crate::schedule::{EnergyType, FlowState};

/// Dimension a pattern was mined from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PatternType {
    Temporal,
    Energy,
    Flow,
    Behavioral,
    Environmental,
}

/// One (energy, hour) bucket that performs well.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EnergyHourMatch {
    pub energy: EnergyType,
    pub hour: u32,
    pub success_rate: f64,
}

/// Typed payload for each kind of pattern.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PatternData {
    /// Best focus hours, strongest first.
    Temporal { hours: Vec<u32> },
    /// Typical length of mist-flow (break) blocks.
    BreakLength { average_minutes: f64, samples: usize },
    Energy { matches: Vec<EnergyHourMatch> },
    /// Most frequent three-step flow sequence.
    Flow { sequence: Vec<FlowState>, count: usize },
    /// Relative productivity change when chains are used. `derived` is false
    /// when the estimate is the fixed fallback rather than measured.
    Chain { improvement_estimate: f64, derived: bool },
}

/// A confidence-scored behavior pattern.
///
/// Ids are stable per pattern kind so that a re-mined pattern replaces its
/// predecessor in the UI.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Pattern {
    pub id: String,
    pub pattern_type: PatternType,
    pub description: String,
    /// Always within [0, 1].
    pub confidence: f64,
    pub suggestion_text: String,
    pub data: PatternData,
}

impl Pattern {
    pub fn new(
        id: impl Into<String>,
        pattern_type: PatternType,
        description: impl Into<String>,
        confidence: f64,
        suggestion_text: impl Into<String>,
        data: PatternData,
    ) -> Self {
        Self {
            id: id.into(),
            pattern_type,
            description: description.into(),
            confidence: confidence.clamp(0.0, 1.0),
            suggestion_text: suggestion_text.into(),
            data,
        }
    }

    /// Focus hours, if this is an hour-of-day pattern.
    pub fn hours(&self) -> Option<&[u32]> {
        match &self.data {
            PatternData::Temporal { hours } => Some(hours),
            _ => None,
        }
    }

    pub fn flow_sequence(&self) -> Option<&[FlowState]> {
        match &self.data {
            PatternData::Flow { sequence, .. } => Some(sequence),
            _ => None,
        }
    }
}

/// Stable sort, highest confidence first.
pub fn sort_by_confidence(patterns: &mut [Pattern]) {
    patterns.sort_by(|a, b| b.confidence.total_cmp(&a.confidence));
}

/// Mean confidence, or 0 when there are no patterns.
pub fn overall_confidence(patterns: &[Pattern]) -> f64 {
    if patterns.is_empty() {
        return 0.0;
    }
    patterns.iter().map(|p| p.confidence).sum::<f64>() / patterns.len() as f64
}
