//! External calendar mirroring.
//!
//! Committing staged blocks mirrors them to a calendar through the
//! [`CalendarSync`] trait. Mirroring is best effort: the scheduler logs a
//! failure and commits locally anyway.

mod calendar;
mod types;

pub use calendar::{to_calendar_event, CalendarSync, LocalCalendarMirror, NoopCalendar};
pub use types::{CalendarEvent, SyncError};
