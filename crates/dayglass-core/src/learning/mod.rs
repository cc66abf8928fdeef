//! Behavior learning: event history, pattern mining, insights and suggestions.

mod analyzer;
mod debounce;
mod engine;
mod event_log;
mod insight;
mod pattern;
mod suggestion;

pub use analyzer::{
    alignment_score, analyze_chains, analyze_energy, analyze_flow, analyze_temporal,
    blend_confidence, mine_patterns, run_full_analysis, run_incremental_analysis, AnalysisMode,
    PatternAnalyzer, BREAK_PATTERN_ID, CHAIN_PATTERN_ID, ENERGY_PATTERN_ID, FLOW_PATTERN_ID,
    TEMPORAL_PATTERN_ID,
};
pub use debounce::{Debouncer, Scheduled};
pub use engine::{LearningEngine, LearningHistory, PatternSnapshot};
pub use event_log::{EventLog, DEFAULT_MAX_EVENTS};
pub use insight::{generate_insights, Insight, InsightCategory};
pub use pattern::{
    overall_confidence, sort_by_confidence, EnergyHourMatch, Pattern, PatternData, PatternType,
};
pub use suggestion::{generate_suggestions, SchedulingContext, Suggestion};
