//! Behavior event recording.

use chrono::Timelike;
use clap::Subcommand;
use dayglass_core::{BehaviorEvent, BehaviorEventKind, Day, EnergyType, FlowState, TimeBlock};

use crate::parse;
use crate::session::{CliResult, Session};

#[derive(Subcommand)]
pub enum EventsAction {
    /// Record a finished (or abandoned) block
    Complete {
        /// Block title
        title: String,
        /// Start time (HH:MM)
        #[arg(long)]
        at: String,
        /// Date (YYYY-MM-DD), default today
        #[arg(long)]
        date: Option<String>,
        /// Length in minutes
        #[arg(long, default_value_t = 50)]
        minutes: i64,
        /// sunrise|daylight|moonlight, default from the hour
        #[arg(long)]
        energy: Option<String>,
        /// crystal|water|mist
        #[arg(long)]
        flow: Option<String>,
        /// The block was not finished
        #[arg(long)]
        failed: bool,
    },
    /// Add a committed block to a day
    Create {
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
    },
    /// Rate a day from 1 to 5
    Review {
        /// Rating (1-5)
        rating: u8,
        /// Date (YYYY-MM-DD), default today
        #[arg(long)]
        date: Option<String>,
    },
    /// List recent events
    List {
        /// How many events to show
        #[arg(long, default_value_t = 20)]
        limit: usize,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

pub fn run(action: EventsAction) -> CliResult {
    match action {
        EventsAction::Complete { title, at, date, minutes, energy, flow, failed } => {
            let mut session = Session::open()?;
            let date = parse::date(date.as_deref())?;
            let start = parse::local(date, &at)?;
            let energy = parse::energy(energy.as_deref(), EnergyType::for_hour(start.hour()))?;
            let flow = parse::flow(flow.as_deref(), FlowState::Water)?;
            let length = parse::minutes(minutes)?;

            let day = session.state.day_mut(date);
            let block = match day
                .blocks
                .iter_mut()
                .find(|b| b.title == title && b.start_time == start)
            {
                Some(existing) => {
                    existing.completed = !failed;
                    existing.clone()
                }
                None => {
                    let block = TimeBlock::new(title, start, length, energy, flow)
                        .with_completed(!failed);
                    day.insert_block(block.clone());
                    block
                }
            };

            let mode = session.record(vec![BehaviorEvent::block_completed(block, !failed)])?;
            session.save()?;
            println!("recorded block_completed ({mode:?} analysis)");
        }
        EventsAction::Create { title, at, date, minutes, energy, flow } => {
            let mut session = Session::open()?;
            let date = parse::date(date.as_deref())?;
            let start = parse::local(date, &at)?;
            let energy = parse::energy(energy.as_deref(), EnergyType::for_hour(start.hour()))?;
            let flow = parse::flow(flow.as_deref(), FlowState::Water)?;

            let block = TimeBlock::new(title, start, parse::minutes(minutes)?, energy, flow);
            session.state.day_mut(date).insert_block(block.clone());
            let id = block.id.clone();
            session.record(vec![BehaviorEvent::new(BehaviorEventKind::BlockCreated { block })])?;
            session.save()?;
            println!("Block created: {id}");
        }
        EventsAction::Review { rating, date } => {
            if !(1..=5).contains(&rating) {
                return Err(format!("rating must be between 1 and 5, got {rating}").into());
            }
            let mut session = Session::open()?;
            let date = parse::date(date.as_deref())?;
            let day = session.state.day(date).cloned().unwrap_or_else(|| Day::new(date));
            let review = BehaviorEvent::new(BehaviorEventKind::DayReviewed { day, rating });
            session.record(vec![review])?;
            session.save()?;
            println!("reviewed {date}: {rating}/5");
        }
        EventsAction::List { limit, json } => {
            let session = Session::open()?;
            let skip = session.state.events.len().saturating_sub(limit);
            let recent = &session.state.events[skip..];
            if json {
                println!("{}", serde_json::to_string_pretty(recent)?);
            } else if recent.is_empty() {
                println!("no events recorded");
            } else {
                for event in recent {
                    println!(
                        "{}  {:<20} {}",
                        event.timestamp.format("%Y-%m-%d %H:%M"),
                        event.label(),
                        subject(event)
                    );
                }
                println!("{} events recorded in total", session.state.events_recorded);
            }
        }
    }
    Ok(())
}

fn subject(event: &BehaviorEvent) -> String {
    match &event.kind {
        BehaviorEventKind::BlockCreated { block } => block.title.clone(),
        BehaviorEventKind::BlockCompleted { block, success } => {
            format!("{} ({})", block.title, if *success { "done" } else { "missed" })
        }
        BehaviorEventKind::BlockModified { block, change_description } => {
            format!("{}: {}", block.title, change_description)
        }
        BehaviorEventKind::ChainApplied { chain } => chain.name.clone(),
        BehaviorEventKind::SuggestionAccepted { suggestion }
        | BehaviorEventKind::SuggestionRejected { suggestion } => suggestion.title.clone(),
        BehaviorEventKind::DayReviewed { day, rating } => {
            format!("{} rated {}/5", day.date, rating)
        }
    }
}
