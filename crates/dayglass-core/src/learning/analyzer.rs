//! Pattern mining over the behavior history.
//!
//! Two modes:
//! - **Full**: four independent miners (temporal, energy, flow, chain) run
//!   over an immutable snapshot and the cache is replaced by their results.
//! - **Incremental**: existing patterns are nudged toward how well the most
//!   recent events agree with them. No patterns are created.
//!
//! The miners are simple ratio heuristics, not statistical models.

use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::Arc;

use chrono::Timelike;
use serde::{Deserialize, Serialize};

use super::pattern::{
    overall_confidence, sort_by_confidence, EnergyHourMatch, Pattern, PatternData, PatternType,
};
use crate::events::BehaviorEvent;
use crate::schedule::{EnergyType, FlowState, TimeBlock};
use crate::storage::config::LearningConfig;

const TEMPORAL_MIN_SAMPLES: usize = 10;
const TEMPORAL_MIN_RATIO: f64 = 0.7;
const BREAK_MIN_SAMPLES: usize = 5;
const BREAK_CONFIDENCE: f64 = 0.6;
const ENERGY_MIN_SAMPLES: usize = 15;
const ENERGY_MIN_RATIO: f64 = 0.8;
const FLOW_WINDOW: usize = 3;
const FLOW_MIN_WINDOWS: usize = 5;
const FLOW_MIN_REPEATS: usize = 3;
const FLOW_MAX_CONFIDENCE: f64 = 0.9;
const CHAIN_MIN_APPLIED: usize = 3;
const CHAIN_CONFIDENCE: f64 = 0.7;
const CHAIN_FALLBACK_IMPROVEMENT: f64 = 0.4;
const CHAIN_MIN_GROUP_SAMPLES: usize = 3;
const TOP_MATCHES: usize = 3;

const NEUTRAL_ALIGNMENT: f64 = 0.5;
const CARRY_WEIGHT: f64 = 0.8;
const ALIGNMENT_WEIGHT: f64 = 0.2;
const MIN_BLENDED_CONFIDENCE: f64 = 0.1;
const MAX_BLENDED_CONFIDENCE: f64 = 1.0;

pub const TEMPORAL_PATTERN_ID: &str = "temporal-focus-hours";
pub const BREAK_PATTERN_ID: &str = "temporal-break-length";
pub const ENERGY_PATTERN_ID: &str = "energy-hour-match";
pub const FLOW_PATTERN_ID: &str = "flow-sequence";
pub const CHAIN_PATTERN_ID: &str = "behavioral-chain-boost";

/// Which kind of analysis a run performs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnalysisMode {
    Full,
    Incremental,
}

/// Analyzer bookkeeping: the pattern cache and how much history it reflects.
#[derive(Debug, Clone)]
pub struct PatternAnalyzer {
    config: LearningConfig,
    last_analyzed_event_count: usize,
    cached_patterns: Vec<Pattern>,
}

impl PatternAnalyzer {
    pub fn new(config: LearningConfig) -> Self {
        Self {
            config,
            last_analyzed_event_count: 0,
            cached_patterns: Vec::new(),
        }
    }

    /// Seed the cache from persisted patterns.
    pub fn with_cache(mut self, patterns: Vec<Pattern>, analyzed_event_count: usize) -> Self {
        self.cached_patterns = patterns;
        sort_by_confidence(&mut self.cached_patterns);
        self.last_analyzed_event_count = analyzed_event_count;
        self
    }

    pub fn patterns(&self) -> &[Pattern] {
        &self.cached_patterns
    }

    pub fn last_analyzed_event_count(&self) -> usize {
        self.last_analyzed_event_count
    }

    pub fn overall_confidence(&self) -> f64 {
        overall_confidence(&self.cached_patterns)
    }

    /// Full when the cache is empty, the history grew by more than the delta
    /// since the last run, or there is too little history for incremental
    /// updates to mean anything.
    pub fn choose_mode(&self, current_event_count: usize) -> AnalysisMode {
        let grown = current_event_count.saturating_sub(self.last_analyzed_event_count);
        if self.cached_patterns.is_empty()
            || grown > self.config.full_reanalysis_delta
            || current_event_count < self.config.min_events_for_incremental
        {
            AnalysisMode::Full
        } else {
            AnalysisMode::Incremental
        }
    }

    pub fn recent_window(&self) -> usize {
        self.config.recent_window
    }

    /// Install the result of a run. Full results replace the cache;
    /// incremental results are the same patterns with adjusted confidence.
    pub fn apply(&mut self, mut patterns: Vec<Pattern>, current_event_count: usize) {
        sort_by_confidence(&mut patterns);
        self.cached_patterns = patterns;
        self.last_analyzed_event_count = current_event_count;
    }
}

/// Run the four miners one after another and return the sorted result.
pub fn mine_patterns(events: &[BehaviorEvent]) -> Vec<Pattern> {
    let mut patterns = analyze_temporal(events);
    patterns.extend(analyze_energy(events));
    patterns.extend(analyze_flow(events));
    patterns.extend(analyze_chains(events));
    sort_by_confidence(&mut patterns);
    patterns
}

/// Run the four miners concurrently on blocking workers over one snapshot.
///
/// A miner whose worker fails contributes nothing; the others still count.
pub async fn run_full_analysis(snapshot: Arc<[BehaviorEvent]>) -> Vec<Pattern> {
    let spawn = |miner: fn(&[BehaviorEvent]) -> Vec<Pattern>| {
        let events = Arc::clone(&snapshot);
        tokio::task::spawn_blocking(move || miner(&events))
    };

    let (temporal, energy, flow, chain) = tokio::join!(
        spawn(analyze_temporal),
        spawn(analyze_energy),
        spawn(analyze_flow),
        spawn(analyze_chains),
    );

    let mut patterns = Vec::new();
    for (dimension, result) in [
        ("temporal", temporal),
        ("energy", energy),
        ("flow", flow),
        ("chain", chain),
    ] {
        match result {
            Ok(found) => patterns.extend(found),
            Err(err) => tracing::warn!(dimension, error = %err, "pattern miner failed"),
        }
    }

    sort_by_confidence(&mut patterns);
    patterns
}

/// Re-score cached patterns against the most recent events.
pub fn run_incremental_analysis(cached: &[Pattern], recent: &[BehaviorEvent]) -> Vec<Pattern> {
    let mut updated: Vec<Pattern> = cached
        .iter()
        .map(|pattern| {
            let alignment = alignment_score(pattern, recent);
            let mut next = pattern.clone();
            next.confidence = blend_confidence(pattern.confidence, alignment);
            next
        })
        .collect();
    sort_by_confidence(&mut updated);
    updated
}

/// `old * 0.8 + alignment * 0.2`, clamped to [0.1, 1.0].
pub fn blend_confidence(old: f64, alignment: f64) -> f64 {
    (old * CARRY_WEIGHT + alignment * ALIGNMENT_WEIGHT)
        .clamp(MIN_BLENDED_CONFIDENCE, MAX_BLENDED_CONFIDENCE)
}

/// How well `recent` agrees with `pattern`, in [0, 1].
pub fn alignment_score(pattern: &Pattern, recent: &[BehaviorEvent]) -> f64 {
    match (&pattern.pattern_type, &pattern.data) {
        (PatternType::Temporal, PatternData::Temporal { hours }) => success_ratio(
            completions(recent)
                .filter(|(b, _)| is_focus(b.flow) && hours.contains(&b.start_time.hour())),
        ),
        (PatternType::Energy, PatternData::Energy { matches }) => success_ratio(
            completions(recent).filter(|(b, _)| {
                matches
                    .iter()
                    .any(|m| m.energy == b.energy && m.hour == b.start_time.hour())
            }),
        ),
        (PatternType::Flow, PatternData::Flow { sequence, .. }) => {
            let flows: Vec<FlowState> = completions(recent)
                .filter(|(_, success)| *success)
                .map(|(b, _)| b.flow)
                .collect();
            if flows.is_empty() || sequence.is_empty() {
                NEUTRAL_ALIGNMENT
            } else if flows.windows(sequence.len()).any(|w| w == sequence.as_slice()) {
                0.9
            } else {
                0.3
            }
        }
        _ => NEUTRAL_ALIGNMENT,
    }
}

/// Focused work: the flows the temporal miner and its alignment count.
fn is_focus(flow: FlowState) -> bool {
    matches!(flow, FlowState::Crystal | FlowState::Water)
}

fn completions(events: &[BehaviorEvent]) -> impl Iterator<Item = (&TimeBlock, bool)> {
    events.iter().filter_map(BehaviorEvent::as_completion)
}

fn success_ratio<'a>(outcomes: impl Iterator<Item = (&'a TimeBlock, bool)>) -> f64 {
    let (mut successes, mut total) = (0usize, 0usize);
    for (_, success) in outcomes {
        total += 1;
        if success {
            successes += 1;
        }
    }
    if total == 0 {
        NEUTRAL_ALIGNMENT
    } else {
        successes as f64 / total as f64
    }
}

#[derive(Debug, Default, Clone, Copy)]
struct Tally {
    successes: usize,
    total: usize,
}

impl Tally {
    fn add(&mut self, success: bool) {
        self.total += 1;
        if success {
            self.successes += 1;
        }
    }

    fn ratio(&self) -> f64 {
        if self.total == 0 {
            0.0
        } else {
            self.successes as f64 / self.total as f64
        }
    }
}

/// Best-performing focus hours, plus typical break length.
pub fn analyze_temporal(events: &[BehaviorEvent]) -> Vec<Pattern> {
    let mut patterns = Vec::new();

    let mut by_hour: BTreeMap<u32, Tally> = BTreeMap::new();
    for (block, success) in completions(events) {
        if is_focus(block.flow) {
            by_hour.entry(block.start_time.hour()).or_default().add(success);
        }
    }

    let samples: usize = by_hour.values().map(|t| t.total).sum();
    if samples >= TEMPORAL_MIN_SAMPLES {
        let mut strong: Vec<(u32, f64)> = by_hour
            .iter()
            .map(|(hour, tally)| (*hour, tally.ratio()))
            .filter(|(_, ratio)| *ratio > TEMPORAL_MIN_RATIO)
            .collect();
        strong.sort_by(|a, b| b.1.total_cmp(&a.1).then(a.0.cmp(&b.0)));
        strong.truncate(TOP_MATCHES);

        if let Some(&(best_hour, best_ratio)) = strong.first() {
            let hours: Vec<u32> = strong.iter().map(|(h, _)| *h).collect();
            let listed = hours
                .iter()
                .map(|h| format!("{h:02}:00"))
                .collect::<Vec<_>>()
                .join(", ");
            patterns.push(Pattern::new(
                TEMPORAL_PATTERN_ID,
                PatternType::Temporal,
                format!("Focused work lands best around {listed}"),
                best_ratio,
                format!("Protect {best_hour:02}:00 for your most demanding work"),
                PatternData::Temporal { hours },
            ));
        }
    }

    let break_minutes: Vec<f64> = completions(events)
        .filter(|(b, _)| b.flow == FlowState::Mist)
        .map(|(b, _)| b.duration().num_seconds() as f64 / 60.0)
        .collect();
    if break_minutes.len() >= BREAK_MIN_SAMPLES {
        let average = break_minutes.iter().sum::<f64>() / break_minutes.len() as f64;
        patterns.push(Pattern::new(
            BREAK_PATTERN_ID,
            PatternType::Temporal,
            format!("Your breaks usually last about {:.0} minutes", average),
            BREAK_CONFIDENCE,
            format!("Plan {:.0}-minute breaks between focus blocks", average),
            PatternData::BreakLength {
                average_minutes: average,
                samples: break_minutes.len(),
            },
        ));
    }

    patterns
}

/// (energy, hour) combinations with very high success.
pub fn analyze_energy(events: &[BehaviorEvent]) -> Vec<Pattern> {
    let mut buckets: BTreeMap<(EnergyType, u32), Tally> = BTreeMap::new();
    for (block, success) in completions(events) {
        buckets
            .entry((block.energy, block.start_time.hour()))
            .or_default()
            .add(success);
    }

    let samples: usize = buckets.values().map(|t| t.total).sum();
    if samples < ENERGY_MIN_SAMPLES {
        return Vec::new();
    }

    let mut matches: Vec<EnergyHourMatch> = buckets
        .iter()
        .map(|((energy, hour), tally)| EnergyHourMatch {
            energy: *energy,
            hour: *hour,
            success_rate: tally.ratio(),
        })
        .filter(|m| m.success_rate > ENERGY_MIN_RATIO)
        .collect();
    matches.sort_by(|a, b| {
        b.success_rate
            .total_cmp(&a.success_rate)
            .then(a.hour.cmp(&b.hour))
            .then(a.energy.cmp(&b.energy))
    });
    matches.truncate(TOP_MATCHES);

    let Some(best) = matches.first().copied() else {
        return Vec::new();
    };

    vec![Pattern::new(
        ENERGY_PATTERN_ID,
        PatternType::Energy,
        format!(
            "{} energy work at {:02}:00 succeeds {:.0}% of the time",
            capitalize(best.energy.label()),
            best.hour,
            best.success_rate * 100.0
        ),
        best.success_rate,
        format!("Schedule {} tasks near {:02}:00", best.energy.label(), best.hour),
        PatternData::Energy { matches },
    )]
}

/// The most repeated three-step flow sequence among successful blocks.
pub fn analyze_flow(events: &[BehaviorEvent]) -> Vec<Pattern> {
    let flows: Vec<FlowState> = completions(events)
        .filter(|(_, success)| *success)
        .map(|(b, _)| b.flow)
        .collect();

    let windows: Vec<&[FlowState]> = flows.chunks_exact(FLOW_WINDOW).collect();
    if windows.len() < FLOW_MIN_WINDOWS {
        return Vec::new();
    }

    // count + first position, for a deterministic tie-break
    let mut counts: HashMap<&[FlowState], (usize, usize)> = HashMap::new();
    for (index, window) in windows.iter().enumerate() {
        counts.entry(*window).or_insert((0, index)).0 += 1;
    }

    let Some((sequence, (count, _))) = counts
        .into_iter()
        .max_by(|a, b| a.1 .0.cmp(&b.1 .0).then(b.1 .1.cmp(&a.1 .1)))
    else {
        return Vec::new();
    };
    if count < FLOW_MIN_REPEATS {
        return Vec::new();
    }

    let confidence = (count as f64 / windows.len() as f64).min(FLOW_MAX_CONFIDENCE);
    let listed = sequence
        .iter()
        .map(FlowState::label)
        .collect::<Vec<_>>()
        .join(" → ");

    vec![Pattern::new(
        FLOW_PATTERN_ID,
        PatternType::Flow,
        format!("You often move through {listed} ({count} times)"),
        confidence,
        format!("Try arranging your next blocks as {listed}"),
        PatternData::Flow {
            sequence: sequence.to_vec(),
            count,
        },
    )]
}

/// Whether applying chains coincides with better completion.
pub fn analyze_chains(events: &[BehaviorEvent]) -> Vec<Pattern> {
    let chains: Vec<_> = events.iter().filter_map(BehaviorEvent::as_chain).collect();
    if chains.len() < CHAIN_MIN_APPLIED {
        return Vec::new();
    }

    let chain_titles: HashSet<&str> = chains
        .iter()
        .flat_map(|c| c.links.iter().map(|l| l.title.as_str()))
        .collect();

    let (mut in_chain, mut outside) = (Tally::default(), Tally::default());
    for (block, success) in completions(events) {
        if chain_titles.contains(block.title.as_str()) {
            in_chain.add(success);
        } else {
            outside.add(success);
        }
    }

    let measured = in_chain.total >= CHAIN_MIN_GROUP_SAMPLES
        && outside.total >= CHAIN_MIN_GROUP_SAMPLES
        && outside.ratio() > 0.0;
    let (improvement, derived) = if measured {
        let relative = (in_chain.ratio() - outside.ratio()) / outside.ratio();
        (relative.clamp(-1.0, 1.0), true)
    } else {
        (CHAIN_FALLBACK_IMPROVEMENT, false)
    };

    let description = if improvement >= 0.0 {
        format!(
            "Chains seem to improve your productivity by about {:.0}%",
            improvement * 100.0
        )
    } else {
        format!(
            "Chained blocks complete about {:.0}% less often than others",
            -improvement * 100.0
        )
    };

    vec![Pattern::new(
        CHAIN_PATTERN_ID,
        PatternType::Behavioral,
        description,
        CHAIN_CONFIDENCE,
        "Group related activities into a chain",
        PatternData::Chain {
            improvement_estimate: improvement,
            derived,
        },
    )]
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
