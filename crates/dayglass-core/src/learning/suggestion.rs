//! On-demand scheduling suggestions driven by the pattern cache.

use chrono::{DateTime, Duration, Local, NaiveDate, Timelike};
use serde::{Deserialize, Serialize};

use super::pattern::{Pattern, PatternData, PatternType};
use crate::schedule::{EnergyType, FlowState, Mood, Pillar, TimeBlock};

/// A proposed block, not yet staged.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Suggestion {
    pub id: String,
    pub title: String,
    pub duration_secs: i64,
    pub suggested_time: DateTime<Local>,
    pub energy: EnergyType,
    pub flow: FlowState,
    pub explanation: String,
    pub confidence: f64,
}

impl Suggestion {
    pub fn duration(&self) -> Duration {
        Duration::seconds(self.duration_secs)
    }

    /// Turn the suggestion into a (committed-shape) block; the staging
    /// scheduler marks it as a proposal.
    pub fn to_block(&self) -> TimeBlock {
        let mut block = TimeBlock::new(
            self.title.clone(),
            self.suggested_time,
            self.duration(),
            self.energy,
            self.flow,
        );
        block.explanation = Some(self.explanation.clone());
        block
    }
}

/// What the caller knows about "right now".
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SchedulingContext {
    pub date: NaiveDate,
    #[serde(default)]
    pub existing_blocks: Vec<TimeBlock>,
    pub current_energy: EnergyType,
    #[serde(default)]
    pub preferred_flows: Vec<FlowState>,
    pub available_time_secs: i64,
    #[serde(default)]
    pub mood: Option<Mood>,
    #[serde(default)]
    pub weather_context: Option<String>,
    #[serde(default)]
    pub pillar_guidance: Option<String>,
    #[serde(default)]
    pub actionable_pillars: Vec<Pillar>,
}

impl SchedulingContext {
    /// A context for `now` with energy derived from the hour.
    pub fn for_now(now: DateTime<Local>) -> Self {
        Self {
            date: now.date_naive(),
            existing_blocks: Vec::new(),
            current_energy: EnergyType::for_hour(now.hour()),
            preferred_flows: Vec::new(),
            available_time_secs: 0,
            mood: None,
            weather_context: None,
            pillar_guidance: None,
            actionable_pillars: Vec::new(),
        }
    }
}

fn strongest(patterns: &[Pattern], pattern_type: PatternType) -> impl Iterator<Item = &Pattern> {
    let mut matching: Vec<&Pattern> = patterns
        .iter()
        .filter(|p| p.pattern_type == pattern_type)
        .collect();
    matching.sort_by(|a, b| b.confidence.total_cmp(&a.confidence));
    matching.into_iter()
}

/// Build suggestions from the strongest temporal, energy and flow patterns.
///
/// Patterns without usable data are skipped; this never fails.
pub fn generate_suggestions(
    patterns: &[Pattern],
    context: &SchedulingContext,
    now: DateTime<Local>,
) -> Vec<Suggestion> {
    let mut suggestions = Vec::new();
    let hour = now.hour();
    let next_hour = (hour + 1) % 24;

    if let Some(pattern) = strongest(patterns, PatternType::Temporal)
        .find(|p| p.hours().is_some_and(|hours| !hours.is_empty()))
    {
        let hours = pattern.hours().unwrap_or_default();
        if hours.contains(&hour) || hours.contains(&next_hour) {
            let start = now
                .with_minute(0)
                .and_then(|t| t.with_second(0))
                .and_then(|t| t.with_nanosecond(0))
                .unwrap_or(now);
            suggestions.push(Suggestion {
                id: uuid::Uuid::new_v4().to_string(),
                title: "Focus Session".to_string(),
                duration_secs: Duration::minutes(90).num_seconds(),
                suggested_time: start,
                energy: context.current_energy,
                flow: FlowState::Crystal,
                explanation: format!(
                    "You're usually at your best around this time. {}",
                    pattern.suggestion_text
                ),
                confidence: pattern.confidence,
            });
        }
    }

    if let Some(pattern) = strongest(patterns, PatternType::Energy)
        .find(|p| matches!(p.data, PatternData::Energy { .. }))
    {
        let energy = EnergyType::for_hour(hour);
        suggestions.push(Suggestion {
            id: uuid::Uuid::new_v4().to_string(),
            title: format!("{} Task", capitalized(energy.label())),
            duration_secs: Duration::minutes(60).num_seconds(),
            suggested_time: now + Duration::minutes(15),
            energy,
            flow: context.preferred_flows.first().copied().unwrap_or(FlowState::Water),
            explanation: format!("Matches your {} energy pattern", energy.label()),
            confidence: pattern.confidence,
        });
    }

    if let Some((pattern, first)) = strongest(patterns, PatternType::Flow).find_map(|p| {
        let first = p.flow_sequence()?.first().copied()?;
        Some((p, first))
    }) {
        suggestions.push(Suggestion {
            id: uuid::Uuid::new_v4().to_string(),
            title: format!("{} Flow Block", capitalized(first.label())),
            duration_secs: Duration::minutes(45).num_seconds(),
            suggested_time: now + Duration::minutes(30),
            energy: context.current_energy,
            flow: first,
            explanation: "Follows your natural flow sequence".to_string(),
            confidence: pattern.confidence,
        });
    }

    suggestions.sort_by(|a, b| b.confidence.total_cmp(&a.confidence));
    suggestions
}

fn capitalized(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
