//! Calendar collaborators.

use std::path::{Path, PathBuf};

use super::types::{CalendarEvent, SyncError};
use crate::schedule::TimeBlock;

const SUMMARY_PREFIX: &str = "[DAYGLASS]";

/// Anything that can receive committed blocks.
pub trait CalendarSync: Send + Sync {
    /// Create one calendar event per block, returning the calendar-side ids.
    fn create_events(&self, blocks: &[TimeBlock]) -> Result<Vec<String>, SyncError>;
}

/// Accepts everything and stores nothing.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopCalendar;

impl CalendarSync for NoopCalendar {
    fn create_events(&self, blocks: &[TimeBlock]) -> Result<Vec<String>, SyncError> {
        Ok(blocks.iter().map(|b| format!("noop-{}", b.id)).collect())
    }
}

/// Convert a block into its calendar representation.
pub fn to_calendar_event(block: &TimeBlock) -> CalendarEvent {
    CalendarEvent {
        id: format!("dayglass-{}", block.id),
        block_id: block.id.clone(),
        summary: format!("{} {}", SUMMARY_PREFIX, block.title),
        start: block.start_time,
        end: block.end_time(),
        description: block.explanation.clone(),
    }
}

/// Mirrors committed blocks into a JSON file, one array of events.
#[derive(Debug, Clone)]
pub struct LocalCalendarMirror {
    path: PathBuf,
}

impl LocalCalendarMirror {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// All mirrored events, oldest first.
    pub fn events(&self) -> Result<Vec<CalendarEvent>, SyncError> {
        if !self.path.exists() {
            return Ok(Vec::new());
        }
        let content = std::fs::read_to_string(&self.path)?;
        if content.trim().is_empty() {
            return Ok(Vec::new());
        }
        Ok(serde_json::from_str(&content)?)
    }
}

impl CalendarSync for LocalCalendarMirror {
    fn create_events(&self, blocks: &[TimeBlock]) -> Result<Vec<String>, SyncError> {
        let mut events = self.events()?;
        let created: Vec<CalendarEvent> = blocks.iter().map(to_calendar_event).collect();
        let ids = created.iter().map(|e| e.id.clone()).collect();
        events.extend(created);

        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(&self.path, serde_json::to_string_pretty(&events)?)?;
        Ok(ids)
    }
}
