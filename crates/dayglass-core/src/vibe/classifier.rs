//! Decision-tree day classification.

use std::collections::{BTreeMap, HashMap};

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::Vibe;
use crate::schedule::{Day, EnergyType};

const LONG_BLOCK_SECS: i64 = 60 * 60;
const FULL_DAY_SECS: i64 = 10 * 60 * 60;
const DOMINANT_ACTIVITY_COUNT: usize = 3;

/// The inputs of the vibe decision tree.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DayMetrics {
    pub completion_rate: f64,
    /// Any block of an hour or more.
    pub has_long_block: bool,
    /// At least one block, and under ten planned hours in total.
    pub has_breaks: bool,
    /// Share of planned time tagged sunrise or daylight; 0.5 for an empty day.
    pub energy_balance: f64,
    pub block_count: usize,
}

impl DayMetrics {
    pub fn of(day: &Day) -> Self {
        let total = day.total_duration_secs();
        let active: i64 = day
            .blocks
            .iter()
            .filter(|b| b.energy.is_active())
            .map(|b| b.duration().num_seconds())
            .sum();
        let energy_balance = if total > 0 {
            active as f64 / total as f64
        } else {
            0.5
        };

        Self {
            completion_rate: day.completion_rate(),
            has_long_block: day
                .blocks
                .iter()
                .any(|b| b.duration().num_seconds() >= LONG_BLOCK_SECS),
            has_breaks: !day.blocks.is_empty() && total < FULL_DAY_SECS,
            energy_balance,
            block_count: day.blocks.len(),
        }
    }

    /// First matching rule wins.
    pub fn vibe(&self) -> Vibe {
        if self.completion_rate > 0.8 && self.has_long_block && self.energy_balance > 0.5 {
            Vibe::Hustle
        } else if self.completion_rate < 0.4 && self.has_breaks {
            Vibe::TakingItSlow
        } else if self.block_count <= 3 && self.has_breaks {
            Vibe::PersonalTime
        } else if self.has_long_block && !self.has_breaks {
            Vibe::Focused
        } else if self.energy_balance < 0.3 {
            Vibe::Recovery
        } else {
            Vibe::Balanced
        }
    }
}

/// Classify a day. Total: an empty day is `Balanced`.
pub fn classify(day: &Day) -> Vibe {
    DayMetrics::of(day).vibe()
}

/// One day's entry in the vibe history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VibeData {
    pub date: NaiveDate,
    pub vibe: Vibe,
    pub completion_rate: f64,
    /// Fraction of planned time per energy; empty when nothing was planned.
    #[serde(default)]
    pub energy_distribution: BTreeMap<EnergyType, f64>,
    #[serde(default)]
    pub dominant_activities: Vec<String>,
}

impl VibeData {
    pub fn from_day(day: &Day) -> Self {
        let metrics = DayMetrics::of(day);
        let total = day.total_duration_secs();

        let mut energy_distribution = BTreeMap::new();
        if total > 0 {
            for block in &day.blocks {
                *energy_distribution.entry(block.energy).or_insert(0.0) +=
                    block.duration().num_seconds() as f64 / total as f64;
            }
        }

        let mut by_title: HashMap<&str, i64> = HashMap::new();
        for block in &day.blocks {
            *by_title.entry(block.title.as_str()).or_default() += block.duration().num_seconds();
        }
        let mut ranked: Vec<(&str, i64)> = by_title.into_iter().collect();
        ranked.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(b.0)));

        Self {
            date: day.date,
            vibe: metrics.vibe(),
            completion_rate: metrics.completion_rate,
            energy_distribution,
            dominant_activities: ranked
                .into_iter()
                .take(DOMINANT_ACTIVITY_COUNT)
                .map(|(title, _)| title.to_string())
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schedule::{FlowState, TimeBlock};
    use chrono::{Duration, Local, TimeZone};

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 5, 6).unwrap()
    }

    /// `count` back-to-back blocks starting at 08:00, the first `done` completed.
    fn blocks(count: usize, minutes: i64, energy: EnergyType, done: usize) -> Vec<TimeBlock> {
        let start = Local.with_ymd_and_hms(2024, 5, 6, 8, 0, 0).unwrap();
        (0..count)
            .map(|i| {
                TimeBlock::new(
                    format!("block-{i}"),
                    start + Duration::minutes(minutes * i as i64),
                    Duration::minutes(minutes),
                    energy,
                    FlowState::Water,
                )
                .with_completed(i < done)
            })
            .collect()
    }

    fn day(blocks: Vec<TimeBlock>) -> Day {
        Day::with_blocks(date(), blocks)
    }

    #[test]
    fn empty_day_is_balanced() {
        let empty = Day::new(date());
        let metrics = DayMetrics::of(&empty);
        assert_eq!(metrics.energy_balance, 0.5);
        assert!(!metrics.has_breaks);
        assert_eq!(classify(&empty), Vibe::Balanced);
    }

    #[test]
    fn hustle() {
        // 9 of 10 done, hour-long blocks, 60% daytime energy
        let mut all = blocks(6, 60, EnergyType::Daylight, 6);
        all.extend(blocks(4, 60, EnergyType::Moonlight, 3));
        let d = day(all);
        let metrics = DayMetrics::of(&d);
        assert!((metrics.completion_rate - 0.9).abs() < 1e-9);
        assert!((metrics.energy_balance - 0.6).abs() < 1e-9);
        assert_eq!(metrics.vibe(), Vibe::Hustle);
    }

    #[test]
    fn taking_it_slow() {
        assert_eq!(classify(&day(blocks(5, 30, EnergyType::Daylight, 1))), Vibe::TakingItSlow);
    }

    #[test]
    fn personal_time() {
        assert_eq!(classify(&day(blocks(2, 30, EnergyType::Daylight, 2))), Vibe::PersonalTime);
    }

    #[test]
    fn focused_without_breaks() {
        // 11 planned hours, 6 of 11 done
        assert_eq!(classify(&day(blocks(11, 60, EnergyType::Daylight, 6))), Vibe::Focused);
    }

    #[test]
    fn recovery_on_evening_energy() {
        assert_eq!(classify(&day(blocks(5, 30, EnergyType::Moonlight, 3))), Vibe::Recovery);
    }

    #[test]
    fn balanced_otherwise() {
        assert_eq!(classify(&day(blocks(5, 30, EnergyType::Daylight, 3))), Vibe::Balanced);
    }

    #[test]
    fn hustle_outranks_focused() {
        // Also matches the focused rule (no breaks), but hustle comes first.
        assert_eq!(classify(&day(blocks(11, 60, EnergyType::Sunrise, 11))), Vibe::Hustle);
    }

    #[test]
    fn vibe_data_distribution_and_activities() {
        let start = Local.with_ymd_and_hms(2024, 5, 6, 8, 0, 0).unwrap();
        let blocks = vec![
            TimeBlock::new(
                "Write",
                start,
                Duration::minutes(90),
                EnergyType::Sunrise,
                FlowState::Crystal,
            ),
            TimeBlock::new(
                "Email",
                start + Duration::hours(2),
                Duration::minutes(30),
                EnergyType::Daylight,
                FlowState::Mist,
            ),
            TimeBlock::new(
                "Write",
                start + Duration::hours(3),
                Duration::minutes(60),
                EnergyType::Daylight,
                FlowState::Crystal,
            ),
            TimeBlock::new(
                "Read",
                start + Duration::hours(5),
                Duration::minutes(45),
                EnergyType::Moonlight,
                FlowState::Water,
            ),
            TimeBlock::new(
                "Walk",
                start + Duration::hours(6),
                Duration::minutes(15),
                EnergyType::Daylight,
                FlowState::Water,
            ),
        ];
        let data = VibeData::from_day(&day(blocks));

        let sum: f64 = data.energy_distribution.values().sum();
        assert!((sum - 1.0).abs() < 1e-9);
        assert!((data.energy_distribution[&EnergyType::Sunrise] - 0.375).abs() < 1e-9);
        assert_eq!(data.dominant_activities, vec!["Write", "Read", "Email"]);
        assert_eq!(data.date, date());
    }

    #[test]
    fn vibe_data_empty_day_has_empty_distribution() {
        let data = VibeData::from_day(&Day::new(date()));
        assert!(data.energy_distribution.is_empty());
        assert!(data.dominant_activities.is_empty());
        assert_eq!(data.vibe, Vibe::Balanced);
    }
}
