//! Schedule types: time blocks, days, chains and pillars.
//!
//! Blocks carry two qualitative tags (energy and flow) that the learning
//! engine mines for patterns, plus a glass state that records how far the
//! block is through the stage/commit lifecycle.

mod block;
mod chain;
mod day;
mod pillar;

use serde::{Deserialize, Serialize};

pub use block::TimeBlock;
pub use chain::{Chain, ChainLink, ROUTINE_PROMOTION_THRESHOLD};
pub use day::{Day, Mood};
pub use pillar::{Pillar, PillarFrequency, TimeWindow};

/// Longest duration a block, chain step or pillar session may have.
pub const MAX_BLOCK_SECS: i64 = 24 * 60 * 60;

/// Clamp a duration in seconds to `[0, MAX_BLOCK_SECS]`.
pub(crate) fn bounded_secs(secs: i64) -> i64 {
    secs.clamp(0, MAX_BLOCK_SECS)
}

/// Energy tag of a block, roughly the part of the day it suits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EnergyType {
    Sunrise,
    Daylight,
    Moonlight,
}

impl EnergyType {
    /// Fixed hour-of-day mapping: 6-9 sunrise, 10-19 daylight, otherwise moonlight.
    pub fn for_hour(hour: u32) -> Self {
        match hour {
            6..=9 => Self::Sunrise,
            10..=19 => Self::Daylight,
            _ => Self::Moonlight,
        }
    }

    /// Whether this energy counts toward the "active" side of a day.
    pub fn is_active(&self) -> bool {
        matches!(self, Self::Sunrise | Self::Daylight)
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Sunrise => "sunrise",
            Self::Daylight => "daylight",
            Self::Moonlight => "moonlight",
        }
    }
}

impl std::str::FromStr for EnergyType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "sunrise" => Ok(Self::Sunrise),
            "daylight" => Ok(Self::Daylight),
            "moonlight" => Ok(Self::Moonlight),
            other => Err(format!("unknown energy '{other}' (sunrise|daylight|moonlight)")),
        }
    }
}

/// Flow tag of a block: how structured the work is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FlowState {
    /// Sharp, deep focus
    Crystal,
    /// Steady, adaptable work
    Water,
    /// Loose time: breaks, rest, wandering
    Mist,
}

impl FlowState {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Crystal => "crystal",
            Self::Water => "water",
            Self::Mist => "mist",
        }
    }
}

impl std::str::FromStr for FlowState {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "crystal" => Ok(Self::Crystal),
            "water" => Ok(Self::Water),
            "mist" => Ok(Self::Mist),
            other => Err(format!("unknown flow '{other}' (crystal|water|mist)")),
        }
    }
}

/// Commit status of a block.
///
/// `Mist` is reserved for staged proposals; the other three are committed
/// states that differ only in provenance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GlassState {
    Mist,
    Crystal,
    Liquid,
    Solid,
}

impl GlassState {
    pub fn is_committed(&self) -> bool {
        !matches!(self, Self::Mist)
    }
}
