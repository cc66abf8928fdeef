//! The learning engine: sole owner of the event log and pattern cache.
//!
//! `record` is cheap and never blocks on analysis. Analysis runs on the
//! tokio runtime over an immutable snapshot, and its result is merged back
//! under the lock in one step. Consumers either poll [`LearningEngine::snapshot`]
//! or watch [`LearningEngine::subscribe`] for changes.

use std::sync::{Arc, Mutex, MutexGuard};

use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};
use tokio::runtime::Handle;
use tokio::sync::watch;
use tokio::time::Instant;

use super::analyzer::{run_full_analysis, run_incremental_analysis, AnalysisMode, PatternAnalyzer};
use super::debounce::{Debouncer, Scheduled};
use super::event_log::EventLog;
use super::insight::{generate_insights, Insight};
use super::pattern::Pattern;
use super::suggestion::{generate_suggestions, SchedulingContext, Suggestion};
use crate::error::Result;
use crate::events::BehaviorEvent;
use crate::storage::config::LearningConfig;

/// What consumers see after each analysis run.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PatternSnapshot {
    pub patterns: Vec<Pattern>,
    pub insights: Vec<Insight>,
    /// Mean pattern confidence, 0 when there are none.
    pub confidence: f64,
    pub last_mode: Option<AnalysisMode>,
    pub analyzed_event_count: usize,
    /// Bumped on every published change.
    pub version: u64,
}

/// Persisted learning state used to warm-start an engine.
#[derive(Debug, Clone, Default)]
pub struct LearningHistory {
    pub events: Vec<BehaviorEvent>,
    pub total_recorded: usize,
    pub patterns: Vec<Pattern>,
    pub analyzed_event_count: usize,
}

struct LearningState {
    log: EventLog,
    analyzer: PatternAnalyzer,
    insights: Vec<Insight>,
    debouncer: Debouncer,
    version: u64,
    last_mode: Option<AnalysisMode>,
}

impl LearningState {
    fn snapshot(&self) -> PatternSnapshot {
        PatternSnapshot {
            patterns: self.analyzer.patterns().to_vec(),
            insights: self.insights.clone(),
            confidence: self.analyzer.overall_confidence(),
            last_mode: self.last_mode,
            analyzed_event_count: self.analyzer.last_analyzed_event_count(),
            version: self.version,
        }
    }
}

struct Inner {
    runtime: Handle,
    state: Mutex<LearningState>,
    updates: watch::Sender<PatternSnapshot>,
}

impl Inner {
    fn lock(&self) -> MutexGuard<'_, LearningState> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }
}

/// Work captured under the lock for one analysis run.
enum Job {
    Full(Arc<[BehaviorEvent]>),
    Incremental {
        cached: Vec<Pattern>,
        recent: Vec<BehaviorEvent>,
    },
}

/// Cloneable handle to the learning engine.
#[derive(Clone)]
pub struct LearningEngine {
    inner: Arc<Inner>,
}

impl LearningEngine {
    /// Create an engine on the current tokio runtime.
    ///
    /// # Errors
    /// Returns [`crate::CoreError::Runtime`] when called outside a runtime.
    pub fn new(config: LearningConfig) -> Result<Self> {
        Ok(Self::with_runtime(config, Handle::try_current()?))
    }

    pub fn with_runtime(config: LearningConfig, runtime: Handle) -> Self {
        Self::restore(config, runtime, LearningHistory::default())
    }

    /// Create an engine seeded with persisted history and patterns.
    /// Restoring does not trigger analysis.
    pub fn restore(config: LearningConfig, runtime: Handle, history: LearningHistory) -> Self {
        let log = EventLog::from_history(history.events, config.max_events)
            .with_total_recorded(history.total_recorded);

        let insights = generate_insights(&history.patterns);
        let debouncer = Debouncer::new(config.debounce());
        let analyzer = PatternAnalyzer::new(config)
            .with_cache(history.patterns, history.analyzed_event_count);

        let state = LearningState {
            log,
            analyzer,
            insights,
            debouncer,
            version: 0,
            last_mode: None,
        };
        let (updates, _) = watch::channel(state.snapshot());

        Self {
            inner: Arc::new(Inner {
                runtime,
                state: Mutex::new(state),
                updates,
            }),
        }
    }

    /// Append an event and schedule a (debounced) analysis run.
    pub fn record(&self, event: BehaviorEvent) -> Scheduled {
        let mut state = self.inner.lock();
        tracing::trace!(kind = event.label(), "recording behavior event");
        state.log.record(event);

        let run = run_analysis(Arc::clone(&self.inner));
        let decision = state
            .debouncer
            .schedule(&self.inner.runtime, Instant::now(), async move {
                run.await;
            });
        tracing::debug!(?decision, events = state.log.len(), "analysis scheduled");
        decision
    }

    /// Cancel any pending run and analyze right away.
    pub async fn analyze_now(&self) -> AnalysisMode {
        self.inner.lock().debouncer.cancel();
        run_analysis(Arc::clone(&self.inner)).await
    }

    pub fn has_pending_analysis(&self) -> bool {
        self.inner.lock().debouncer.has_pending()
    }

    pub fn patterns(&self) -> Vec<Pattern> {
        self.inner.lock().analyzer.patterns().to_vec()
    }

    pub fn insights(&self) -> Vec<Insight> {
        self.inner.lock().insights.clone()
    }

    pub fn overall_confidence(&self) -> f64 {
        self.inner.lock().analyzer.overall_confidence()
    }

    /// Ranked suggestions for `context` at `now`.
    pub fn suggestions(
        &self,
        context: &SchedulingContext,
        now: DateTime<Local>,
    ) -> Vec<Suggestion> {
        let state = self.inner.lock();
        generate_suggestions(state.analyzer.patterns(), context, now)
    }

    pub fn snapshot(&self) -> PatternSnapshot {
        self.inner.lock().snapshot()
    }

    /// Receive a new [`PatternSnapshot`] after every analysis run.
    pub fn subscribe(&self) -> watch::Receiver<PatternSnapshot> {
        self.inner.updates.subscribe()
    }

    pub fn event_count(&self) -> usize {
        self.inner.lock().log.len()
    }

    /// Everything needed to restore this engine later.
    pub fn history(&self) -> LearningHistory {
        let state = self.inner.lock();
        LearningHistory {
            events: state.log.to_vec(),
            total_recorded: state.log.total_recorded(),
            patterns: state.analyzer.patterns().to_vec(),
            analyzed_event_count: state.analyzer.last_analyzed_event_count(),
        }
    }
}

/// One analysis run: decide, compute off-lock, merge.
async fn run_analysis(inner: Arc<Inner>) -> AnalysisMode {
    let (mode, job, event_count) = {
        let mut state = inner.lock();
        state.debouncer.mark_run(Instant::now());
        let event_count = state.log.total_recorded();
        let mode = state.analyzer.choose_mode(event_count);
        let job = match mode {
            AnalysisMode::Full => Job::Full(state.log.snapshot()),
            AnalysisMode::Incremental => Job::Incremental {
                cached: state.analyzer.patterns().to_vec(),
                recent: state.log.recent(state.analyzer.recent_window()),
            },
        };
        (mode, job, event_count)
    };

    tracing::debug!(?mode, event_count, "running pattern analysis");
    let patterns = match job {
        Job::Full(snapshot) => run_full_analysis(snapshot).await,
        Job::Incremental { cached, recent } => run_incremental_analysis(&cached, &recent),
    };

    let snapshot = {
        let mut state = inner.lock();
        state.analyzer.apply(patterns, event_count);
        state.insights = generate_insights(state.analyzer.patterns());
        state.last_mode = Some(mode);
        state.version += 1;
        state.snapshot()
    };
    tracing::debug!(
        ?mode,
        patterns = snapshot.patterns.len(),
        confidence = snapshot.confidence,
        "pattern analysis complete"
    );
    inner.updates.send_replace(snapshot);
    mode
}
