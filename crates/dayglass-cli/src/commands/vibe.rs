//! Day vibe classification and seasonal trends.

use clap::Subcommand;
use dayglass_core::vibe::DayMetrics;
use dayglass_core::Day;

use crate::parse;
use crate::session::{CliResult, Session};

#[derive(Subcommand)]
pub enum VibeAction {
    /// Classify a day without recording it
    Classify {
        /// Date (YYYY-MM-DD), default today
        #[arg(long)]
        date: Option<String>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Record a finished day's vibe
    Record {
        /// Date (YYYY-MM-DD), default today
        #[arg(long)]
        date: Option<String>,
    },
    /// Show recorded vibes
    History {
        /// How many days to show
        #[arg(long, default_value_t = 14)]
        limit: usize,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Show per-season vibe counts and activity ideas
    Seasons {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

pub fn run(action: VibeAction) -> CliResult {
    match action {
        VibeAction::Classify { date, json } => {
            let session = Session::open()?;
            let date = parse::date(date.as_deref())?;
            let day = session.state.day(date).cloned().unwrap_or_else(|| Day::new(date));
            let metrics = DayMetrics::of(&day);
            let vibe = metrics.vibe();
            if json {
                println!(
                    "{}",
                    serde_json::json!({
                        "date": date,
                        "vibe": vibe,
                        "completion_rate": metrics.completion_rate,
                        "has_long_block": metrics.has_long_block,
                        "has_breaks": metrics.has_breaks,
                        "energy_balance": metrics.energy_balance,
                        "block_count": metrics.block_count,
                    })
                );
            } else {
                println!("{date}: {vibe}");
                println!("  {}", vibe.summary());
                println!(
                    "  {} blocks, {:.0}% done, {:.0}% active energy",
                    metrics.block_count,
                    metrics.completion_rate * 100.0,
                    metrics.energy_balance * 100.0
                );
            }
        }
        VibeAction::Record { date } => {
            let mut session = Session::open()?;
            let date = parse::date(date.as_deref())?;
            let day = session
                .state
                .day(date)
                .filter(|d| !d.blocks.is_empty())
                .cloned()
                .ok_or_else(|| format!("no blocks on {date}; nothing to record"))?;
            let mut tracker = session.tracker();
            if !tracker.can_record(date) {
                return Err(format!("{date} is not after the last recorded day").into());
            }
            let data = tracker.record_day(&day);
            println!("{}: {}", data.date, data.vibe);
            if !data.dominant_activities.is_empty() {
                println!("  mostly {}", data.dominant_activities.join(", "));
            }
            if let Some(majority) = tracker.trailing_majority() {
                println!("  lately: {majority}");
            }
            session.store_vibes(tracker);
            session.save()?;
        }
        VibeAction::History { limit, json } => {
            let session = Session::open()?;
            let history = &session.state.vibe_history;
            let recent = &history[history.len().saturating_sub(limit)..];
            if json {
                println!("{}", serde_json::to_string_pretty(recent)?);
            } else if recent.is_empty() {
                println!("no vibes recorded");
            } else {
                for data in recent {
                    println!(
                        "{}  {:<14} {:>3.0}% done",
                        data.date,
                        data.vibe.label(),
                        data.completion_rate * 100.0
                    );
                }
            }
        }
        VibeAction::Seasons { json } => {
            let session = Session::open()?;
            let tracker = session.tracker();
            if json {
                println!("{}", serde_json::to_string_pretty(tracker.seasonal_patterns())?);
            } else if tracker.seasonal_patterns().is_empty() {
                println!("no seasonal trends yet");
            } else {
                for pattern in tracker.seasonal_patterns() {
                    let counts: Vec<String> = pattern
                        .vibe_counts
                        .iter()
                        .map(|(vibe, n)| format!("{} {n}", vibe.label()))
                        .collect();
                    println!(
                        "{}: {} (last seen {})",
                        pattern.season.label(),
                        counts.join(", "),
                        pattern.last_observed
                    );
                    if let Some(vibe) = pattern.dominant_vibe() {
                        println!("  mostly {vibe}");
                    }
                    if !pattern.suggested_activities.is_empty() {
                        println!("  try: {}", pattern.suggested_activities.join(", "));
                    }
                }
            }
        }
    }
    Ok(())
}
