//! Human-readable insights derived from the pattern cache.

use serde::{Deserialize, Serialize};

use super::pattern::{Pattern, PatternData, PatternType};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InsightCategory {
    Timing,
    Energy,
    Flow,
    Productivity,
    Wellbeing,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Insight {
    pub id: String,
    pub title: String,
    pub description: String,
    pub actionable_text: String,
    pub confidence: f64,
    pub category: InsightCategory,
}

struct Template {
    pattern_type: PatternType,
    id: &'static str,
    title: &'static str,
    description: &'static str,
    actionable_text: &'static str,
    category: InsightCategory,
}

const TEMPLATES: [Template; 3] = [
    Template {
        pattern_type: PatternType::Temporal,
        id: "insight-timing",
        title: "Your peak hours",
        description: "You consistently complete focused work at certain times of day.",
        actionable_text: "Schedule your most important work during your peak hours.",
        category: InsightCategory::Timing,
    },
    Template {
        pattern_type: PatternType::Energy,
        id: "insight-energy",
        title: "Energy alignment",
        description: "Matching task energy to the time of day raises your completion rate.",
        actionable_text: "Pick tasks whose energy fits the hour you schedule them in.",
        category: InsightCategory::Energy,
    },
    Template {
        pattern_type: PatternType::Flow,
        id: "insight-flow",
        title: "Your natural rhythm",
        description: "You tend to move through work in a recognisable flow sequence.",
        actionable_text: "Arrange your day to follow the rhythm that works for you.",
        category: InsightCategory::Flow,
    },
];

/// One insight per timing/energy/flow category present in `patterns`, with
/// confidence equal to the category's mean pattern confidence.
///
/// Break-length patterns are typed temporal but say nothing about peak
/// hours, so they never feed the timing insight.
pub fn generate_insights(patterns: &[Pattern]) -> Vec<Insight> {
    TEMPLATES
        .iter()
        .filter_map(|template| {
            let confidences: Vec<f64> = patterns
                .iter()
                .filter(|p| p.pattern_type == template.pattern_type)
                .filter(|p| !matches!(p.data, PatternData::BreakLength { .. }))
                .map(|p| p.confidence)
                .collect();
            if confidences.is_empty() {
                return None;
            }
            let mean = confidences.iter().sum::<f64>() / confidences.len() as f64;
            Some(Insight {
                id: template.id.to_string(),
                title: template.title.to_string(),
                description: template.description.to_string(),
                actionable_text: template.actionable_text.to_string(),
                confidence: mean.clamp(0.0, 1.0),
                category: template.category,
            })
        })
        .collect()
}
