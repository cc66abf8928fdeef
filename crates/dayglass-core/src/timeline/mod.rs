//! Timeline utilities.
//!
//! Currently just interval arithmetic for finding free time between blocks.

mod gap;

pub use gap::{find_gaps, TimeSlot};

/// Alias used by callers that think in "gaps" rather than "slots".
pub type Gap = TimeSlot;
