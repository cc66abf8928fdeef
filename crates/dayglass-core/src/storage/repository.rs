//! Whole-state persistence.
//!
//! The core does not care how state is stored; it only needs `load` and
//! `save`. The bundled implementation is a pretty-printed JSON file.

use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::data_dir;
use crate::error::Result;
use crate::events::BehaviorEvent;
use crate::learning::{Insight, Pattern};
use crate::schedule::{Chain, Day, Pillar, TimeBlock};
use crate::vibe::{SeasonalPattern, VibeData};

/// Everything the planner persists between runs.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AppState {
    #[serde(default)]
    pub days: Vec<Day>,
    #[serde(default)]
    pub staged: Vec<TimeBlock>,
    #[serde(default)]
    pub events: Vec<BehaviorEvent>,
    /// Lifetime count of recorded events (the history itself is capped).
    #[serde(default)]
    pub events_recorded: usize,
    #[serde(default)]
    pub analyzed_event_count: usize,
    #[serde(default)]
    pub patterns: Vec<Pattern>,
    #[serde(default)]
    pub insights: Vec<Insight>,
    #[serde(default)]
    pub vibe_history: Vec<VibeData>,
    #[serde(default)]
    pub seasonal_patterns: Vec<SeasonalPattern>,
    #[serde(default)]
    pub chains: Vec<Chain>,
    #[serde(default)]
    pub pillars: Vec<Pillar>,
}

impl AppState {
    pub fn day(&self, date: NaiveDate) -> Option<&Day> {
        self.days.iter().find(|d| d.date == date)
    }

    /// The day for `date`, created (in date order) if missing.
    pub fn day_mut(&mut self, date: NaiveDate) -> &mut Day {
        let pos = match self.days.binary_search_by_key(&date, |d| d.date) {
            Ok(pos) => pos,
            Err(pos) => {
                self.days.insert(pos, Day::new(date));
                pos
            }
        };
        &mut self.days[pos]
    }

    /// All committed blocks across days.
    pub fn committed_blocks(&self) -> Vec<TimeBlock> {
        self.days.iter().flat_map(|d| d.blocks.iter().cloned()).collect()
    }

    /// Replace the committed blocks, regrouping them by local date.
    pub fn set_committed_blocks(&mut self, blocks: Vec<TimeBlock>) {
        for day in &mut self.days {
            day.blocks.clear();
        }
        for block in blocks {
            let date = block.start_time.date_naive();
            self.day_mut(date).insert_block(block);
        }
    }

    pub fn chain_by_name(&self, name: &str) -> Option<&Chain> {
        self.chains.iter().find(|c| c.name.eq_ignore_ascii_case(name))
    }

    pub fn pillar_by_name(&self, name: &str) -> Option<&Pillar> {
        self.pillars.iter().find(|p| p.name.eq_ignore_ascii_case(name))
    }
}

/// Storage collaborator for [`AppState`].
pub trait Repository: Send + Sync {
    /// Load saved state; `None` when nothing has been saved yet.
    fn load(&self) -> Result<Option<AppState>>;

    fn save(&self, state: &AppState) -> Result<()>;
}

/// JSON file repository, `<data_dir>/state.json` by default.
#[derive(Debug, Clone)]
pub struct JsonFileRepository {
    path: PathBuf,
}

impl JsonFileRepository {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Repository at the default location.
    pub fn open_default() -> Result<Self> {
        Ok(Self::new(data_dir()?.join("state.json")))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Repository for JsonFileRepository {
    fn load(&self) -> Result<Option<AppState>> {
        match std::fs::read_to_string(&self.path) {
            Ok(content) => Ok(Some(serde_json::from_str(&content)?)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn save(&self, state: &AppState) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        // write-then-rename: readers never see a partial file
        let tmp = self.path.with_extension("json.tmp");
        std::fs::write(&tmp, serde_json::to_string_pretty(state)?)?;
        std::fs::rename(&tmp, &self.path)?;
        Ok(())
    }
}
