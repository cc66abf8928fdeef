//! # Dayglass Core Library
//!
//! The scheduling intelligence behind the Dayglass day planner. It learns from
//! what the user actually does, describes each day's vibe, and proposes time
//! blocks through a stage/commit/undo workflow. Everything is usable from the
//! standalone CLI; a GUI is expected to be a thin layer over the same library.
//!
//! ## Architecture
//!
//! - **Learning**: a bounded behavior-event log feeding a debounced pattern
//!   analyzer (full or incremental runs on a tokio runtime), plus insight and
//!   suggestion generation from the pattern cache
//! - **Vibe**: day classification and seasonal trend tracking
//! - **Timeline**: free-interval (gap) detection
//! - **Scheduler**: staging of manual, chain and pillar blocks with best-effort
//!   calendar mirroring on commit
//! - **Storage**: TOML configuration and a JSON state repository
//!
//! ## Key Components
//!
//! - [`LearningEngine`]: owner of the event log and pattern cache
//! - [`VibeTracker`]: vibe history and seasonal patterns
//! - [`StagingScheduler`]: staged and committed blocks
//! - [`Config`]: application configuration management

pub mod error;
pub mod events;
pub mod learning;
pub mod schedule;
pub mod scheduler;
pub mod storage;
pub mod sync;
pub mod timeline;
pub mod vibe;

pub use error::{ConfigError, CoreError, ValidationError};
pub use events::{BehaviorEvent, BehaviorEventKind};
pub use learning::{
    AnalysisMode, Insight, InsightCategory, LearningEngine, LearningHistory, Pattern, PatternData,
    PatternSnapshot, PatternType, SchedulingContext, Suggestion,
};
pub use schedule::{
    Chain, ChainLink, Day, EnergyType, FlowState, GlassState, Mood, Pillar, PillarFrequency,
    TimeBlock, TimeWindow,
};
pub use scheduler::{CommitReport, StagingScheduler};
pub use storage::{AppState, Config, JsonFileRepository, Repository};
pub use sync::{CalendarSync, LocalCalendarMirror, NoopCalendar, SyncError};
pub use timeline::{find_gaps, Gap, TimeSlot};
pub use vibe::{classify, Season, SeasonalPattern, Vibe, VibeData, VibeTracker};
