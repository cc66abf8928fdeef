//! Calendar sync payloads and errors.

use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};

/// A block as written to an external calendar.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CalendarEvent {
    /// Calendar-side identifier.
    pub id: String,
    /// Id of the mirrored block.
    pub block_id: String,
    pub summary: String,
    pub start: DateTime<Local>,
    pub end: DateTime<Local>,
    #[serde(default)]
    pub description: Option<String>,
}

/// Sync error types.
#[derive(Debug, thiserror::Error)]
pub enum SyncError {
    #[error("Calendar API error: {0}")]
    CalendarApi(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Calendar access denied")]
    AccessDenied,
}
