//! A calendar day and its blocks.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::TimeBlock;

/// Self-reported mood for a day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Mood {
    Energized,
    Calm,
    Focused,
    Tired,
    Scattered,
}

/// One day of the planner. Blocks are kept ordered by start time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Day {
    pub date: NaiveDate,
    #[serde(default)]
    pub blocks: Vec<TimeBlock>,
    #[serde(default)]
    pub mood: Option<Mood>,
}

impl Day {
    pub fn new(date: NaiveDate) -> Self {
        Self {
            date,
            blocks: Vec::new(),
            mood: None,
        }
    }

    pub fn with_blocks(date: NaiveDate, mut blocks: Vec<TimeBlock>) -> Self {
        blocks.sort_by_key(|b| b.start_time);
        Self {
            date,
            blocks,
            mood: None,
        }
    }

    /// Insert a block, keeping start-time order.
    pub fn insert_block(&mut self, block: TimeBlock) {
        let pos = self
            .blocks
            .partition_point(|b| b.start_time <= block.start_time);
        self.blocks.insert(pos, block);
    }

    /// Fraction of blocks marked completed (0 when there are none).
    pub fn completion_rate(&self) -> f64 {
        if self.blocks.is_empty() {
            return 0.0;
        }
        let done = self.blocks.iter().filter(|b| b.completed).count();
        done as f64 / self.blocks.len() as f64
    }

    pub fn total_duration_secs(&self) -> i64 {
        self.blocks.iter().map(|b| b.duration().num_seconds()).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schedule::{EnergyType, FlowState};
    use chrono::{Duration, Local, TimeZone};

    fn block(h: u32, done: bool) -> TimeBlock {
        TimeBlock::new(
            format!("b{h}"),
            Local.with_ymd_and_hms(2024, 5, 6, h, 0, 0).unwrap(),
            Duration::minutes(30),
            EnergyType::Daylight,
            FlowState::Water,
        )
        .with_completed(done)
    }

    #[test]
    fn insert_keeps_order() {
        let mut day = Day::new(NaiveDate::from_ymd_opt(2024, 5, 6).unwrap());
        day.insert_block(block(14, false));
        day.insert_block(block(9, false));
        day.insert_block(block(11, false));
        let hours: Vec<_> = day.blocks.iter().map(|b| b.title.clone()).collect();
        assert_eq!(hours, vec!["b9", "b11", "b14"]);
    }

    #[test]
    fn completion_rate_counts_done_blocks() {
        let day = Day::with_blocks(
            NaiveDate::from_ymd_opt(2024, 5, 6).unwrap(),
            vec![block(9, true), block(10, false), block(11, true), block(12, true)],
        );
        assert!((day.completion_rate() - 0.75).abs() < 1e-9);
        assert_eq!(Day::new(day.date).completion_rate(), 0.0);
    }
}
