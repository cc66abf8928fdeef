//! Daily vibe classification and seasonal trend tracking.
//!
//! A finished day is reduced to a handful of metrics (completion rate, long
//! blocks, breathing room, daytime energy share) and mapped onto a [`Vibe`].
//! The [`VibeTracker`] keeps a short history of those and folds the weekly
//! majority into per-season counts.

mod classifier;
mod tracker;

use serde::{Deserialize, Serialize};

pub use classifier::{classify, DayMetrics, VibeData};
pub use tracker::{SeasonalPattern, VibeTracker};

/// Qualitative label for a whole day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Vibe {
    Hustle,
    TakingItSlow,
    PersonalTime,
    Focused,
    Recovery,
    Balanced,
}

impl Vibe {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Hustle => "hustle",
            Self::TakingItSlow => "taking it slow",
            Self::PersonalTime => "personal time",
            Self::Focused => "focused",
            Self::Recovery => "recovery",
            Self::Balanced => "balanced",
        }
    }

    /// One-line description for display.
    pub fn summary(&self) -> &'static str {
        match self {
            Self::Hustle => {
                "Big output day: long blocks, nearly everything done, mostly in daylight."
            }
            Self::TakingItSlow => "A gentle day with plenty of room and little pressure to finish.",
            Self::PersonalTime => "A light schedule that left space for yourself.",
            Self::Focused => "Long, unbroken stretches of deep work.",
            Self::Recovery => "Most of the day ran on evening energy. Time to recharge.",
            Self::Balanced => "A steady mix of work, rest and energy.",
        }
    }
}

impl std::fmt::Display for Vibe {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Meteorological season, northern hemisphere.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Season {
    Spring,
    Summer,
    Fall,
    Winter,
}

impl Season {
    /// Dec-Feb winter, Mar-May spring, Jun-Aug summer, Sep-Nov fall.
    pub fn from_month(month: u32) -> Self {
        match month {
            3..=5 => Self::Spring,
            6..=8 => Self::Summer,
            9..=11 => Self::Fall,
            _ => Self::Winter,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Spring => "spring",
            Self::Summer => "summer",
            Self::Fall => "fall",
            Self::Winter => "winter",
        }
    }

    /// Activities a new seasonal pattern starts out suggesting.
    pub fn seed_activities(&self) -> &'static [&'static str] {
        match self {
            Self::Spring => &["Morning walk", "Garden planning", "Spring cleaning"],
            Self::Summer => &["Outdoor workout", "Evening swim", "Picnic lunch"],
            Self::Fall => &["Nature hike", "Reading session", "Meal prep"],
            Self::Winter => &["Indoor yoga", "Journaling", "Cozy reading"],
        }
    }
}
