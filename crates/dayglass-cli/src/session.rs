//! Load the planner state, hand out the core components, save it back.

use std::error::Error;
use std::sync::Arc;

use dayglass_core::learning::AnalysisMode;
use dayglass_core::storage::data_dir;
use dayglass_core::{
    AppState, BehaviorEvent, Config, JsonFileRepository, LearningEngine, LearningHistory,
    LocalCalendarMirror, Repository, StagingScheduler, VibeTracker,
};
use tokio::runtime::{Builder, Runtime};

pub type CliResult<T = ()> = Result<T, Box<dyn Error>>;

pub struct Session {
    pub config: Config,
    pub state: AppState,
    repo: JsonFileRepository,
}

impl Session {
    pub fn open() -> CliResult<Self> {
        let config = Config::load()?;
        let repo = JsonFileRepository::open_default()?;
        let state = repo.load()?.unwrap_or_default();
        tracing::debug!(path = %repo.path().display(), events = state.events.len(), "state loaded");
        Ok(Self { config, state, repo })
    }

    pub fn save(&self) -> CliResult {
        self.repo.save(&self.state)?;
        Ok(())
    }

    /// Learning engine warm-started from the saved history.
    pub fn engine(&self, runtime: &Runtime) -> LearningEngine {
        LearningEngine::restore(
            self.config.learning.clone(),
            runtime.handle().clone(),
            LearningHistory {
                events: self.state.events.clone(),
                total_recorded: self.state.events_recorded,
                patterns: self.state.patterns.clone(),
                analyzed_event_count: self.state.analyzed_event_count,
            },
        )
    }

    pub fn store_learning(&mut self, engine: &LearningEngine) {
        let history = engine.history();
        self.state.events = history.events;
        self.state.events_recorded = history.total_recorded;
        self.state.patterns = history.patterns;
        self.state.analyzed_event_count = history.analyzed_event_count;
        self.state.insights = engine.insights();
    }

    /// Record events and settle analysis before the process exits.
    pub fn record(&mut self, events: Vec<BehaviorEvent>) -> CliResult<AnalysisMode> {
        let runtime = runtime()?;
        let engine = self.engine(&runtime);
        for event in events {
            engine.record(event);
        }
        let mode = runtime.block_on(engine.analyze_now());
        self.store_learning(&engine);
        Ok(mode)
    }

    /// Scheduler over the saved blocks, mirroring commits to
    /// `<data_dir>/calendar.json`.
    pub fn scheduler(&self) -> CliResult<StagingScheduler> {
        let mirror = LocalCalendarMirror::new(data_dir()?.join("calendar.json"));
        Ok(StagingScheduler::new(self.config.staging.clone(), Arc::new(mirror))
            .with_blocks(self.state.committed_blocks(), self.state.staged.clone()))
    }

    pub fn store_schedule(&mut self, scheduler: StagingScheduler) {
        let (committed, staged) = scheduler.into_parts();
        self.state.set_committed_blocks(committed);
        self.state.staged = staged;
    }

    pub fn tracker(&self) -> VibeTracker {
        VibeTracker::restore(
            self.config.vibe.clone(),
            self.state.vibe_history.clone(),
            self.state.seasonal_patterns.clone(),
        )
    }

    pub fn store_vibes(&mut self, tracker: VibeTracker) {
        let (history, seasonal) = tracker.into_parts();
        self.state.vibe_history = history;
        self.state.seasonal_patterns = seasonal;
    }
}

/// Single-threaded runtime for one command's background analysis.
pub fn runtime() -> std::io::Result<Runtime> {
    Builder::new_current_thread().enable_all().build()
}
