//! Bounded, append-only behavior history.

use std::collections::VecDeque;
use std::sync::Arc;

use crate::events::BehaviorEvent;

/// Default history cap.
pub const DEFAULT_MAX_EVENTS: usize = 1000;

/// FIFO-evicting event history.
#[derive(Debug, Clone)]
pub struct EventLog {
    events: VecDeque<BehaviorEvent>,
    max_events: usize,
    total_recorded: usize,
}

impl EventLog {
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_MAX_EVENTS)
    }

    pub fn with_capacity(max_events: usize) -> Self {
        let max_events = max_events.max(1);
        Self {
            events: VecDeque::with_capacity(max_events.min(DEFAULT_MAX_EVENTS)),
            max_events,
            total_recorded: 0,
        }
    }

    /// Rebuild a log from persisted history (oldest first).
    pub fn from_history(history: Vec<BehaviorEvent>, max_events: usize) -> Self {
        let mut log = Self::with_capacity(max_events);
        for event in history {
            log.record(event);
        }
        log
    }

    /// Carry over the lifetime counter from a previous session. Never lowers it.
    pub fn with_total_recorded(mut self, total: usize) -> Self {
        self.total_recorded = self.total_recorded.max(total);
        self
    }

    /// Append an event, evicting the oldest entries past the cap.
    pub fn record(&mut self, event: BehaviorEvent) {
        self.events.push_back(event);
        self.total_recorded += 1;
        while self.events.len() > self.max_events {
            self.events.pop_front();
        }
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Events ever recorded, including evicted ones.
    pub fn total_recorded(&self) -> usize {
        self.total_recorded
    }

    /// Immutable copy for background analysis.
    pub fn snapshot(&self) -> Arc<[BehaviorEvent]> {
        self.events.iter().cloned().collect()
    }

    /// The `n` most recent events, oldest first.
    pub fn recent(&self, n: usize) -> Vec<BehaviorEvent> {
        let skip = self.events.len().saturating_sub(n);
        self.events.iter().skip(skip).cloned().collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &BehaviorEvent> {
        self.events.iter()
    }

    pub fn to_vec(&self) -> Vec<BehaviorEvent> {
        self.events.iter().cloned().collect()
    }
}

impl Default for EventLog {
    fn default() -> Self {
        Self::new()
    }
}
