//! Pillars: recurring activity categories with preferred time windows.

use chrono::{DateTime, Duration, Local, NaiveDate, NaiveTime, TimeZone};
use serde::{Deserialize, Serialize};

use super::{bounded_secs, EnergyType, FlowState};

/// How often a pillar should show up.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind", content = "times")]
pub enum PillarFrequency {
    Daily,
    WeeklyTimes(u8),
}

/// A wall-clock window within a day, e.g. 07:00-09:00.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeWindow {
    pub start: NaiveTime,
    pub end: NaiveTime,
}

impl TimeWindow {
    pub fn new(start: NaiveTime, end: NaiveTime) -> Self {
        Self { start, end }
    }

    /// Resolve this window on a concrete date.
    ///
    /// Returns `None` when the window is empty or a bound does not exist in
    /// local time (DST gap).
    pub fn on(&self, date: NaiveDate) -> Option<(DateTime<Local>, DateTime<Local>)> {
        if self.end <= self.start {
            return None;
        }
        let start = Local.from_local_datetime(&date.and_time(self.start)).earliest()?;
        let end = Local.from_local_datetime(&date.and_time(self.end)).earliest()?;
        Some((start, end))
    }
}

/// A recurring user-defined activity category.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Pillar {
    pub id: String,
    pub name: String,
    pub frequency: PillarFrequency,
    pub min_duration_secs: i64,
    pub max_duration_secs: i64,
    #[serde(default)]
    pub preferred_windows: Vec<TimeWindow>,
    pub energy: EnergyType,
    pub flow: FlowState,
}

impl Pillar {
    pub fn new(
        name: impl Into<String>,
        min_duration: Duration,
        max_duration: Duration,
        preferred_windows: Vec<TimeWindow>,
    ) -> Self {
        let min = bounded_secs(min_duration.num_seconds());
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            name: name.into(),
            frequency: PillarFrequency::Daily,
            min_duration_secs: min,
            max_duration_secs: bounded_secs(max_duration.num_seconds()).max(min),
            preferred_windows,
            energy: EnergyType::Daylight,
            flow: FlowState::Water,
        }
    }

    pub fn min_duration(&self) -> Duration {
        Duration::seconds(bounded_secs(self.min_duration_secs))
    }

    pub fn max_duration(&self) -> Duration {
        Duration::seconds(bounded_secs(self.max_duration_secs))
    }
}
