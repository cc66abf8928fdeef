//! Vibe history and per-season vibe counts.

use std::collections::{BTreeMap, HashMap, VecDeque};

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

use super::classifier::VibeData;
use super::{Season, Vibe};
use crate::schedule::Day;
use crate::storage::config::VibeConfig;

/// How often each weekly-majority vibe showed up in a season.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeasonalPattern {
    pub season: Season,
    #[serde(default)]
    pub vibe_counts: BTreeMap<Vibe, u32>,
    #[serde(default)]
    pub suggested_activities: Vec<String>,
    pub last_observed: NaiveDate,
}

impl SeasonalPattern {
    pub fn new(season: Season, observed: NaiveDate) -> Self {
        Self {
            season,
            vibe_counts: BTreeMap::new(),
            suggested_activities: season
                .seed_activities()
                .iter()
                .map(|s| s.to_string())
                .collect(),
            last_observed: observed,
        }
    }

    /// The most counted vibe, if any.
    pub fn dominant_vibe(&self) -> Option<Vibe> {
        self.vibe_counts
            .iter()
            .max_by_key(|(_, count)| **count)
            .map(|(vibe, _)| *vibe)
    }
}

/// Bounded vibe history plus the seasonal store.
#[derive(Debug, Clone)]
pub struct VibeTracker {
    config: VibeConfig,
    history: VecDeque<VibeData>,
    seasonal: Vec<SeasonalPattern>,
}

impl VibeTracker {
    pub fn new(config: VibeConfig) -> Self {
        Self {
            config,
            history: VecDeque::new(),
            seasonal: Vec::new(),
        }
    }

    /// Rebuild from persisted state. History beyond the cap is dropped
    /// oldest-first.
    pub fn restore(
        config: VibeConfig,
        history: Vec<VibeData>,
        seasonal: Vec<SeasonalPattern>,
    ) -> Self {
        let mut tracker = Self::new(config);
        tracker.history.extend(history);
        tracker.trim();
        tracker.seasonal = seasonal;
        tracker
    }

    /// Record a finished day and return its entry.
    ///
    /// Once a full window of days is on record, the window's majority vibe is
    /// counted toward the season of `day`.
    pub fn record_day(&mut self, day: &Day) -> VibeData {
        let data = VibeData::from_day(day);
        self.history.push_back(data.clone());
        self.trim();

        if let Some(majority) = self.trailing_majority() {
            self.observe_season(Season::from_month(day.date.month()), majority, day.date);
        }
        tracing::debug!(date = %data.date, vibe = %data.vibe, "recorded day vibe");
        data
    }

    /// Majority vibe of the trailing window. Ties go to the vibe seen most
    /// recently. `None` until the window is full.
    pub fn trailing_majority(&self) -> Option<Vibe> {
        let window = self.config.season_window.max(1);
        if self.history.len() < window {
            return None;
        }
        let trailing: Vec<Vibe> = self
            .history
            .iter()
            .skip(self.history.len() - window)
            .map(|d| d.vibe)
            .collect();

        let mut counts: HashMap<Vibe, usize> = HashMap::new();
        for vibe in &trailing {
            *counts.entry(*vibe).or_default() += 1;
        }
        let best = counts.values().copied().max()?;
        trailing.iter().rev().copied().find(|v| counts[v] == best)
    }

    fn observe_season(&mut self, season: Season, vibe: Vibe, date: NaiveDate) {
        let idx = match self.seasonal.iter().position(|p| p.season == season) {
            Some(idx) => idx,
            None => {
                self.seasonal.push(SeasonalPattern::new(season, date));
                self.seasonal.len() - 1
            }
        };
        let pattern = &mut self.seasonal[idx];
        *pattern.vibe_counts.entry(vibe).or_insert(0) += 1;
        pattern.last_observed = date;
    }

    fn trim(&mut self) {
        let cap = self.config.history_days.max(1);
        while self.history.len() > cap {
            self.history.pop_front();
        }
    }

    /// Days are recorded in order: only a date after the newest entry is
    /// accepted. The newest entry survives trimming, so this holds even for
    /// dates older than the retained history.
    pub fn can_record(&self, date: NaiveDate) -> bool {
        self.current().map_or(true, |newest| date > newest.date)
    }

    pub fn current(&self) -> Option<&VibeData> {
        self.history.back()
    }

    pub fn history(&self) -> impl Iterator<Item = &VibeData> {
        self.history.iter()
    }

    pub fn len(&self) -> usize {
        self.history.len()
    }

    pub fn is_empty(&self) -> bool {
        self.history.is_empty()
    }

    pub fn seasonal_patterns(&self) -> &[SeasonalPattern] {
        &self.seasonal
    }

    pub fn seasonal_pattern(&self, season: Season) -> Option<&SeasonalPattern> {
        self.seasonal.iter().find(|p| p.season == season)
    }

    /// Split into persistable parts.
    pub fn into_parts(self) -> (Vec<VibeData>, Vec<SeasonalPattern>) {
        (self.history.into(), self.seasonal)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schedule::{EnergyType, FlowState, TimeBlock};
    use chrono::{Duration, Local, TimeZone};

    fn date(month: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, month, d).unwrap()
    }

    /// Two short completed daylight blocks: personal time.
    fn personal_day(date: NaiveDate) -> Day {
        let start = Local
            .from_local_datetime(&date.and_hms_opt(9, 0, 0).unwrap())
            .earliest()
            .unwrap();
        Day::with_blocks(
            date,
            vec![
                TimeBlock::new(
                    "Read",
                    start,
                    Duration::minutes(30),
                    EnergyType::Daylight,
                    FlowState::Water,
                )
                .with_completed(true),
                TimeBlock::new(
                    "Walk",
                    start + Duration::hours(1),
                    Duration::minutes(30),
                    EnergyType::Daylight,
                    FlowState::Water,
                )
                .with_completed(true),
            ],
        )
    }

    fn empty_day(date: NaiveDate) -> Day {
        Day::new(date)
    }

    #[test]
    fn only_later_days_can_be_recorded() {
        let mut tracker = VibeTracker::new(VibeConfig::default());
        assert!(tracker.can_record(date(3, 1)));
        for d in 1..=20 {
            tracker.record_day(&personal_day(date(3, d)));
        }
        assert_eq!(tracker.len(), 14);
        assert!(!tracker.can_record(date(3, 2)));
        assert!(!tracker.can_record(date(3, 20)));
        assert!(tracker.can_record(date(3, 21)));
    }

    #[test]
    fn no_seasonal_update_before_seven_days() {
        let mut tracker = VibeTracker::new(VibeConfig::default());
        for d in 1..=6 {
            tracker.record_day(&personal_day(date(7, d)));
        }
        assert_eq!(tracker.len(), 6);
        assert!(tracker.trailing_majority().is_none());
        assert!(tracker.seasonal_patterns().is_empty());

        tracker.record_day(&personal_day(date(7, 7)));
        let summer = tracker.seasonal_pattern(Season::Summer).unwrap();
        assert_eq!(summer.vibe_counts[&Vibe::PersonalTime], 1);
        assert_eq!(summer.last_observed, date(7, 7));
        assert_eq!(summer.suggested_activities.len(), Season::Summer.seed_activities().len());
    }

    #[test]
    fn history_capped_at_fourteen() {
        let mut tracker = VibeTracker::new(VibeConfig::default());
        for d in 1..=20 {
            tracker.record_day(&personal_day(date(1, d)));
        }
        assert_eq!(tracker.len(), 14);
        assert_eq!(tracker.history().next().unwrap().date, date(1, 7));
        assert_eq!(tracker.current().unwrap().date, date(1, 20));
        // one seasonal observation per day from the 7th on
        let winter = tracker.seasonal_pattern(Season::Winter).unwrap();
        assert_eq!(winter.vibe_counts[&Vibe::PersonalTime], 14);
    }

    #[test]
    fn majority_tie_goes_to_most_recent() {
        let mut tracker = VibeTracker::new(VibeConfig::default());
        // 3 personal, 3 balanced, then 1 personal: personal wins 4-3
        for d in 1..=3 {
            tracker.record_day(&personal_day(date(4, d)));
        }
        for d in 4..=6 {
            tracker.record_day(&empty_day(date(4, d)));
        }
        tracker.record_day(&personal_day(date(4, 7)));
        assert_eq!(tracker.trailing_majority(), Some(Vibe::PersonalTime));

        // window is now 2 personal, 3 balanced, 1 personal, 1 balanced: balanced 4-3
        tracker.record_day(&empty_day(date(4, 8)));
        assert_eq!(tracker.trailing_majority(), Some(Vibe::Balanced));

        // force a tie with a window of 2
        let config = VibeConfig { season_window: 2, ..VibeConfig::default() };
        let mut tracker = VibeTracker::new(config);
        tracker.record_day(&empty_day(date(4, 1)));
        tracker.record_day(&personal_day(date(4, 2)));
        assert_eq!(tracker.trailing_majority(), Some(Vibe::PersonalTime));
        tracker.record_day(&empty_day(date(4, 3)));
        assert_eq!(tracker.trailing_majority(), Some(Vibe::Balanced));
    }

    #[test]
    fn restore_trims_and_keeps_seasons() {
        let history: Vec<VibeData> = (1..=20)
            .map(|d| VibeData::from_day(&empty_day(date(10, d))))
            .collect();
        let mut fall = SeasonalPattern::new(Season::Fall, date(10, 1));
        fall.vibe_counts.insert(Vibe::Balanced, 5);
        let tracker = VibeTracker::restore(VibeConfig::default(), history, vec![fall]);
        assert_eq!(tracker.len(), 14);
        let fall = tracker.seasonal_pattern(Season::Fall).unwrap();
        assert_eq!(fall.dominant_vibe(), Some(Vibe::Balanced));

        let (history, seasonal) = tracker.into_parts();
        assert_eq!(history.len(), 14);
        assert_eq!(seasonal.len(), 1);
    }
}
