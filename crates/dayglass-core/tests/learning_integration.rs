//! Integration tests for the learning engine: debounce, full vs incremental
//! analysis, restore, and suggestions.

use chrono::{DateTime, Duration, Local, TimeZone};
use dayglass_core::learning::{
    mine_patterns, AnalysisMode, InsightCategory, LearningEngine, LearningHistory, Scheduled,
    ENERGY_PATTERN_ID, FLOW_PATTERN_ID, TEMPORAL_PATTERN_ID,
};
use dayglass_core::storage::config::LearningConfig;
use dayglass_core::{BehaviorEvent, CoreError, EnergyType, FlowState, SchedulingContext, TimeBlock};

fn start(day: i64, hour: u32) -> DateTime<Local> {
    Local.with_ymd_and_hms(2024, 3, 1, hour, 0, 0).unwrap() + Duration::days(day)
}

/// A successful 09:00 deep-work completion on day `i`.
fn focus_completion(i: usize) -> BehaviorEvent {
    let block = TimeBlock::new(
        "Deep work",
        start(i as i64, 9),
        Duration::minutes(50),
        EnergyType::Sunrise,
        FlowState::Crystal,
    )
    .with_completed(true);
    BehaviorEvent::block_completed(block, true)
}

fn history(n: usize) -> Vec<BehaviorEvent> {
    (0..n).map(focus_completion).collect()
}

#[test]
fn engine_needs_a_runtime() {
    let result = LearningEngine::new(LearningConfig::default());
    assert!(matches!(result, Err(CoreError::Runtime(_))));
}

#[tokio::test(start_paused = true)]
async fn burst_triggers_one_full_analysis() {
    let engine = LearningEngine::new(LearningConfig::default()).unwrap();
    let mut updates = engine.subscribe();

    for event in history(25) {
        engine.record(event);
    }
    updates.changed().await.unwrap();
    let snapshot = updates.borrow_and_update().clone();

    assert_eq!(snapshot.version, 1);
    assert_eq!(snapshot.last_mode, Some(AnalysisMode::Full));
    assert_eq!(snapshot.analyzed_event_count, 25);

    let ids: Vec<&str> = snapshot.patterns.iter().map(|p| p.id.as_str()).collect();
    assert!(ids.contains(&TEMPORAL_PATTERN_ID));
    assert!(ids.contains(&ENERGY_PATTERN_ID));
    assert!(ids.contains(&FLOW_PATTERN_ID));
    assert!(snapshot
        .patterns
        .windows(2)
        .all(|w| w[0].confidence >= w[1].confidence));

    let categories: Vec<InsightCategory> = snapshot.insights.iter().map(|i| i.category).collect();
    assert_eq!(
        categories,
        vec![InsightCategory::Timing, InsightCategory::Energy, InsightCategory::Flow]
    );
    assert!((snapshot.confidence - (1.0 + 1.0 + 0.9) / 3.0).abs() < 1e-9);
}

#[tokio::test(start_paused = true)]
async fn small_delta_is_debounced_and_incremental() {
    let engine = LearningEngine::new(LearningConfig::default()).unwrap();
    let mut updates = engine.subscribe();

    for event in history(25) {
        engine.record(event);
    }
    updates.changed().await.unwrap();

    let mut decisions = Vec::new();
    for i in 25..28 {
        decisions.push(engine.record(focus_completion(i)));
    }
    assert!(decisions
        .iter()
        .all(|d| *d == Scheduled::Delayed(std::time::Duration::from_secs(2))));
    assert!(engine.has_pending_analysis());

    updates.changed().await.unwrap();
    let snapshot = updates.borrow_and_update().clone();
    assert_eq!(snapshot.version, 2);
    assert_eq!(snapshot.last_mode, Some(AnalysisMode::Incremental));
    assert_eq!(snapshot.analyzed_event_count, 28);

    let flow = snapshot.patterns.iter().find(|p| p.id == FLOW_PATTERN_ID).unwrap();
    assert!((flow.confidence - 0.9).abs() < 1e-9);
}

#[tokio::test(start_paused = true)]
async fn large_delta_forces_full_analysis() {
    let engine = LearningEngine::new(LearningConfig::default()).unwrap();
    let mut updates = engine.subscribe();

    for event in history(25) {
        engine.record(event);
    }
    updates.changed().await.unwrap();

    for i in 25..36 {
        engine.record(focus_completion(i));
    }
    updates.changed().await.unwrap();
    let snapshot = updates.borrow_and_update().clone();
    assert_eq!(snapshot.last_mode, Some(AnalysisMode::Full));
    assert_eq!(snapshot.analyzed_event_count, 36);
}

#[tokio::test]
async fn too_little_history_yields_nothing() {
    let engine = LearningEngine::new(LearningConfig::default()).unwrap();
    for event in history(5) {
        engine.record(event);
    }
    assert_eq!(engine.analyze_now().await, AnalysisMode::Full);
    assert!(engine.patterns().is_empty());
    assert!(engine.insights().is_empty());
    assert_eq!(engine.overall_confidence(), 0.0);
    assert!(!engine.has_pending_analysis());
}

#[tokio::test]
async fn restored_engine_goes_incremental() {
    let events = history(25);
    let patterns = mine_patterns(&events);
    assert!(!patterns.is_empty());

    let engine = LearningEngine::restore(
        LearningConfig::default(),
        tokio::runtime::Handle::current(),
        LearningHistory {
            events,
            total_recorded: 25,
            patterns: patterns.clone(),
            analyzed_event_count: 25,
        },
    );
    assert_eq!(engine.patterns(), patterns);
    assert_eq!(engine.insights().len(), 3);

    engine.record(focus_completion(25));
    assert_eq!(engine.analyze_now().await, AnalysisMode::Incremental);

    let saved = engine.history();
    assert_eq!(saved.total_recorded, 26);
    assert_eq!(saved.analyzed_event_count, 26);
}

#[tokio::test]
async fn lifetime_count_survives_the_cap() {
    let config = LearningConfig {
        max_events: 50,
        ..LearningConfig::default()
    };
    let engine = LearningEngine::new(config).unwrap();
    for event in history(60) {
        engine.record(event);
    }
    engine.analyze_now().await;
    assert_eq!(engine.event_count(), 50);
    assert_eq!(engine.history().total_recorded, 60);
    assert_eq!(engine.snapshot().analyzed_event_count, 60);
}

#[tokio::test]
async fn suggestions_follow_learned_patterns() {
    let engine = LearningEngine::new(LearningConfig::default()).unwrap();
    for event in history(25) {
        engine.record(event);
    }
    engine.analyze_now().await;

    let now = Local.with_ymd_and_hms(2024, 4, 2, 9, 20, 0).unwrap();
    let context = SchedulingContext::for_now(now);
    let suggestions = engine.suggestions(&context, now);

    assert_eq!(suggestions.len(), 3);
    let focus = suggestions.iter().find(|s| s.title == "Focus Session").unwrap();
    assert_eq!(focus.suggested_time, Local.with_ymd_and_hms(2024, 4, 2, 9, 0, 0).unwrap());
    assert!(suggestions
        .windows(2)
        .all(|w| w[0].confidence >= w[1].confidence));
}
