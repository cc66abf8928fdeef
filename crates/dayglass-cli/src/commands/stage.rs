//! Stage proposals, then commit or discard them as a batch.

use chrono::{Local, Timelike};
use clap::Subcommand;
use dayglass_core::{
    BehaviorEvent, BehaviorEventKind, EnergyType, FlowState, StagingScheduler, TimeBlock,
};

use super::learn::current_suggestions;
use crate::parse;
use crate::session::{CliResult, Session};

#[derive(Subcommand)]
pub enum StageAction {
    /// Stage every step of a chain back to back
    Chain {
        /// Chain name
        name: String,
        /// First step start (HH:MM)
        #[arg(long)]
        at: String,
        /// Date (YYYY-MM-DD), default today
        #[arg(long)]
        date: Option<String>,
    },
    /// Stage sessions of a pillar into its open windows
    Pillar {
        /// Pillar name
        name: String,
    },
    /// Stage a single block
    Block {
        /// Block title
        title: String,
        /// Start time (HH:MM)
        #[arg(long)]
        at: String,
        /// Date (YYYY-MM-DD), default today
        #[arg(long)]
        date: Option<String>,
        /// Length in minutes
        #[arg(long, default_value_t = 30)]
        minutes: i64,
        /// sunrise|daylight|moonlight, default from the hour
        #[arg(long)]
        energy: Option<String>,
        /// crystal|water|mist
        #[arg(long)]
        flow: Option<String>,
        /// Why this block is proposed
        #[arg(long, default_value = "Added by hand")]
        why: String,
    },
    /// Stage one of the current suggestions (see `suggest`)
    Accept {
        /// Suggestion number, 1-based
        #[arg(default_value_t = 1)]
        number: usize,
    },
    /// Turn down one of the current suggestions
    Reject {
        /// Suggestion number, 1-based
        #[arg(default_value_t = 1)]
        number: usize,
    },
    /// Show staged blocks
    List {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Commit every staged block
    Commit,
    /// Discard every staged block
    Undo,
}

pub fn run(action: StageAction) -> CliResult {
    let mut session = Session::open()?;
    let mut scheduler = session.scheduler()?;
    let mut events = Vec::new();

    match action {
        StageAction::Chain { name, at, date } => {
            let chain = session
                .state
                .chain_by_name(&name)
                .cloned()
                .ok_or_else(|| format!("no chain named '{name}'"))?;
            let start = parse::local(parse::date(date.as_deref())?, &at)?;
            let staged = scheduler.apply_chain(&chain, start);
            print_blocks(&staged);
            events.push(BehaviorEvent::chain_applied(chain));
        }
        StageAction::Pillar { name } => {
            let pillar = session
                .state
                .pillar_by_name(&name)
                .cloned()
                .ok_or_else(|| format!("no pillar named '{name}'"))?;
            let staged = scheduler.stage_pillar(&pillar, Local::now());
            print_blocks(&staged);
        }
        StageAction::Block { title, at, date, minutes, energy, flow, why } => {
            let start = parse::local(parse::date(date.as_deref())?, &at)?;
            let energy = parse::energy(energy.as_deref(), EnergyType::for_hour(start.hour()))?;
            let flow = parse::flow(flow.as_deref(), FlowState::Water)?;
            let block = TimeBlock::new(title, start, parse::minutes(minutes)?, energy, flow);
            scheduler.stage_block(block, why, "manual");
        }
        StageAction::Accept { number } => {
            let (_, suggestions) = current_suggestions(&session, None)?;
            let suggestion = pick(suggestions, number)?;
            scheduler.stage_block(
                suggestion.to_block(),
                suggestion.explanation.clone(),
                "suggestion",
            );
            events.push(BehaviorEvent::new(BehaviorEventKind::SuggestionAccepted { suggestion }));
        }
        StageAction::Reject { number } => {
            let (_, suggestions) = current_suggestions(&session, None)?;
            let suggestion = pick(suggestions, number)?;
            println!("Dismissed \"{}\"", suggestion.title);
            events.push(BehaviorEvent::new(BehaviorEventKind::SuggestionRejected { suggestion }));
        }
        StageAction::List { json } => {
            if json {
                println!("{}", serde_json::to_string_pretty(scheduler.staged_blocks())?);
            } else if scheduler.staged_blocks().is_empty() {
                println!("nothing staged");
            } else {
                print_blocks(scheduler.staged_blocks());
            }
            return Ok(());
        }
        StageAction::Commit => {
            let pending: Vec<String> =
                scheduler.staged_blocks().iter().map(|b| b.id.clone()).collect();
            let report = scheduler.commit_all_staged_blocks();
            if let Some(error) = &report.sync_error {
                eprintln!("calendar: {error}");
            }
            events.extend(
                scheduler
                    .committed_blocks()
                    .iter()
                    .filter(|b| pending.contains(&b.id))
                    .map(|block| {
                        BehaviorEvent::new(BehaviorEventKind::BlockCreated {
                            block: block.clone(),
                        })
                    }),
            );
        }
        StageAction::Undo => {
            scheduler.undo_staged_items();
        }
    }

    if let Some(status) = scheduler.action_bar() {
        println!("{status}");
    }
    finish(&mut session, scheduler, events)
}

fn finish(
    session: &mut Session,
    scheduler: StagingScheduler,
    events: Vec<BehaviorEvent>,
) -> CliResult {
    session.store_schedule(scheduler);
    if !events.is_empty() {
        session.record(events)?;
    }
    session.save()
}

fn pick<T>(items: Vec<T>, number: usize) -> CliResult<T> {
    let count = items.len();
    number
        .checked_sub(1)
        .and_then(|i| items.into_iter().nth(i))
        .ok_or_else(|| format!("no suggestion #{number} ({count} available)").into())
}

fn print_blocks(blocks: &[TimeBlock]) {
    for block in blocks {
        println!(
            "  {} {}-{}  {}",
            block.start_time.format("%a %d"),
            block.start_time.format("%H:%M"),
            block.end_time().format("%H:%M"),
            block.title
        );
        if let Some(why) = &block.explanation {
            println!("      {why}");
        }
    }
}
