//! Staging workflow for proposed time blocks.

mod staging;

pub use staging::{CommitReport, StagingScheduler};
