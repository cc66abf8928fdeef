//! Stage, commit and undo of proposed time blocks.
//!
//! Proposals (manual blocks, chain steps, pillar slots) are staged as Mist
//! blocks next to the committed schedule. Staging never reserves time and
//! never rejects a conflicting proposal. A commit turns every staged block
//! Solid and mirrors the batch to the calendar on a best-effort basis; an
//! undo throws the whole staged set away.

use std::sync::Arc;

use chrono::{DateTime, Days, Duration, Local, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::schedule::{Chain, Pillar, TimeBlock};
use crate::storage::config::StagingConfig;
use crate::sync::CalendarSync;
use crate::timeline::{find_gaps, TimeSlot};

/// Outcome of a commit.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CommitReport {
    pub committed: usize,
    /// Calendar-side ids of the mirrored blocks (empty when sync failed).
    pub calendar_ids: Vec<String>,
    pub sync_error: Option<String>,
}

impl CommitReport {
    pub fn synced(&self) -> bool {
        self.sync_error.is_none()
    }
}

pub struct StagingScheduler {
    config: StagingConfig,
    calendar: Arc<dyn CalendarSync>,
    committed: Vec<TimeBlock>,
    staged: Vec<TimeBlock>,
    action_bar: Option<String>,
}

impl StagingScheduler {
    pub fn new(config: StagingConfig, calendar: Arc<dyn CalendarSync>) -> Self {
        Self {
            config,
            calendar,
            committed: Vec::new(),
            staged: Vec::new(),
            action_bar: None,
        }
    }

    /// Seed with persisted blocks.
    pub fn with_blocks(mut self, mut committed: Vec<TimeBlock>, staged: Vec<TimeBlock>) -> Self {
        committed.sort_by_key(|b| b.start_time);
        self.committed = committed;
        self.staged = staged
            .into_iter()
            .map(|mut b| {
                if !(b.is_staged && b.is_consistent()) {
                    let explanation = b.explanation.take();
                    let staged_by = b.staged_by.take();
                    b.mark_staged(explanation, staged_by);
                }
                b
            })
            .collect();
        self
    }

    /// Stage a single block. Always succeeds.
    pub fn stage_block(
        &mut self,
        mut block: TimeBlock,
        explanation: impl Into<String>,
        staged_by: impl Into<String>,
    ) -> &TimeBlock {
        block.mark_staged(Some(explanation.into()), Some(staged_by.into()));
        tracing::debug!(title = %block.title, start = %block.start_time, "staged block");
        self.action_bar = Some(format!("Staged \"{}\"", block.title));
        self.staged.push(block);
        &self.staged[self.staged.len() - 1]
    }

    /// Lay out a chain back to back from `starting_at`, with the configured
    /// buffer between steps, and stage every step.
    pub fn apply_chain(&mut self, chain: &Chain, starting_at: DateTime<Local>) -> Vec<TimeBlock> {
        let buffer = Duration::minutes(self.config.chain_buffer_minutes.max(0));
        let total = chain.links.len();
        let mut start = starting_at;
        let mut staged = Vec::with_capacity(total);

        for (pos, link) in chain.links.iter().enumerate() {
            let block = TimeBlock::new(
                link.title.clone(),
                start,
                link.duration(),
                link.energy,
                link.flow,
            );
            start = block.end_time() + buffer;
            let block = self
                .stage_block(
                    block,
                    format!("Step {} of {} in {}", pos + 1, total, chain.name),
                    format!("chain:{}#{}", chain.name, pos + 1),
                )
                .clone();
            staged.push(block);
        }

        self.action_bar = Some(format!("Staged {} blocks from {}", staged.len(), chain.name));
        staged
    }

    /// Free slots in the pillar's preferred windows over the lookahead
    /// period, at least `min_duration` long, capped per pillar.
    ///
    /// Both committed and staged blocks count as occupied. On the first day,
    /// windows are clipped to start no earlier than `now`.
    pub fn find_available_slots(&self, pillar: &Pillar, now: DateTime<Local>) -> Vec<TimeSlot> {
        let cap = self.config.max_slots_per_pillar;
        let occupied: Vec<TimeBlock> = self
            .committed
            .iter()
            .chain(self.staged.iter())
            .cloned()
            .collect();
        let today = now.date_naive();
        let mut slots = Vec::new();
        if cap == 0 {
            return slots;
        }

        'days: for offset in 0..self.config.lookahead_days {
            let Some(date) = today.checked_add_days(Days::new(u64::from(offset))) else {
                break;
            };
            for window in &pillar.preferred_windows {
                let Some((start, end)) = window.on(date) else {
                    continue;
                };
                let window = TimeSlot::new(start.max(now), end);
                for gap in find_gaps(window, &occupied) {
                    if gap.can_fit(pillar.min_duration()) && !gap.is_empty() {
                        slots.push(gap);
                        if slots.len() >= cap {
                            break 'days;
                        }
                    }
                }
            }
        }
        slots
    }

    /// Stage one block per available slot, each `min(slot, max_duration)` long.
    pub fn stage_pillar(&mut self, pillar: &Pillar, now: DateTime<Local>) -> Vec<TimeBlock> {
        let slots = self.find_available_slots(pillar, now);
        let mut staged = Vec::with_capacity(slots.len());

        for slot in slots {
            let duration = slot.duration().min(pillar.max_duration());
            let block = TimeBlock::new(
                pillar.name.clone(),
                slot.start,
                duration,
                pillar.energy,
                pillar.flow,
            );
            let explanation = format!(
                "Open {} min in your preferred window for {}",
                slot.duration().num_minutes(),
                pillar.name
            );
            let block = self
                .stage_block(block, explanation, format!("pillar:{}", pillar.name))
                .clone();
            staged.push(block);
        }

        self.action_bar = Some(if staged.is_empty() {
            format!("No open slots for {}", pillar.name)
        } else {
            format!("Staged {} slots for {}", staged.len(), pillar.name)
        });
        staged
    }

    /// Commit every staged block and mirror the batch to the calendar.
    ///
    /// A calendar failure is logged and reported; the local commit happens
    /// regardless and the staged set is always cleared.
    pub fn commit_all_staged_blocks(&mut self) -> CommitReport {
        let mut blocks = std::mem::take(&mut self.staged);
        if blocks.is_empty() {
            self.action_bar = Some("Nothing to commit".to_string());
            return CommitReport::default();
        }
        for block in &mut blocks {
            block.mark_committed();
        }

        let report = match self.calendar.create_events(&blocks) {
            Ok(calendar_ids) => CommitReport {
                committed: blocks.len(),
                calendar_ids,
                sync_error: None,
            },
            Err(e) => {
                tracing::warn!(
                    error = %e,
                    count = blocks.len(),
                    "calendar sync failed, committing locally"
                );
                CommitReport {
                    committed: blocks.len(),
                    calendar_ids: Vec::new(),
                    sync_error: Some(e.to_string()),
                }
            }
        };

        self.committed.extend(blocks);
        self.committed.sort_by_key(|b| b.start_time);
        tracing::info!(
            committed = report.committed,
            synced = report.synced(),
            "committed staged blocks"
        );

        self.action_bar = Some(if report.synced() {
            format!("Committed {} blocks", report.committed)
        } else {
            format!("Committed {} blocks (calendar sync failed)", report.committed)
        });
        report
    }

    /// Same as [`StagingScheduler::commit_all_staged_blocks`].
    pub fn commit_staged_items(&mut self) -> CommitReport {
        self.commit_all_staged_blocks()
    }

    /// Discard the whole staged set. Returns how many blocks were dropped.
    pub fn reject_all_staged_blocks(&mut self) -> usize {
        let dropped = self.staged.len();
        self.staged.clear();
        tracing::debug!(dropped, "discarded staged blocks");
        self.action_bar = Some(format!("Discarded {dropped} staged blocks"));
        dropped
    }

    /// Same as [`StagingScheduler::reject_all_staged_blocks`].
    pub fn undo_staged_items(&mut self) -> usize {
        self.reject_all_staged_blocks()
    }

    pub fn committed_blocks(&self) -> &[TimeBlock] {
        &self.committed
    }

    pub fn staged_blocks(&self) -> &[TimeBlock] {
        &self.staged
    }

    /// Status line for the last staging operation.
    pub fn action_bar(&self) -> Option<&str> {
        self.action_bar.as_deref()
    }

    /// Committed and staged blocks starting on `date`, by start time.
    pub fn blocks_on(&self, date: NaiveDate) -> Vec<&TimeBlock> {
        let mut blocks: Vec<&TimeBlock> = self
            .committed
            .iter()
            .chain(self.staged.iter())
            .filter(|b| b.start_time.date_naive() == date)
            .collect();
        blocks.sort_by_key(|b| b.start_time);
        blocks
    }

    /// Hand back the committed and staged sets for persistence.
    pub fn into_parts(self) -> (Vec<TimeBlock>, Vec<TimeBlock>) {
        (self.committed, self.staged)
    }
}
