//! Pillar management: recurring activities with preferred windows.

use clap::Subcommand;
use dayglass_core::{EnergyType, FlowState, Pillar, PillarFrequency};

use crate::parse;
use crate::session::{CliResult, Session};

#[derive(Subcommand)]
pub enum PillarAction {
    /// Define a pillar
    Add {
        /// Pillar name
        name: String,
        /// Shortest useful session in minutes
        #[arg(long, default_value_t = 30)]
        min: i64,
        /// Longest session in minutes
        #[arg(long, default_value_t = 60)]
        max: i64,
        /// Preferred window as HH:MM-HH:MM, repeatable
        #[arg(long = "window", required = true)]
        windows: Vec<String>,
        /// Times per week instead of daily
        #[arg(long)]
        weekly: Option<u8>,
        /// sunrise|daylight|moonlight
        #[arg(long)]
        energy: Option<String>,
        /// crystal|water|mist
        #[arg(long)]
        flow: Option<String>,
    },
    /// List pillars
    List {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Delete a pillar
    Remove {
        /// Pillar name
        name: String,
    },
}

pub fn run(action: PillarAction) -> CliResult {
    match action {
        PillarAction::Add { name, min, max, windows, weekly, energy, flow } => {
            let (min, max) = (parse::minutes(min)?, parse::minutes(max)?);
            if max < min {
                return Err("--max must not be shorter than --min".into());
            }
            let mut session = Session::open()?;
            if session.state.pillar_by_name(&name).is_some() {
                return Err(format!("pillar '{name}' already exists").into());
            }
            let windows = windows.iter().map(|w| parse::window(w)).collect::<Result<Vec<_>, _>>()?;
            let mut pillar = Pillar::new(name, min, max, windows);
            pillar.energy = parse::energy(energy.as_deref(), EnergyType::Daylight)?;
            pillar.flow = parse::flow(flow.as_deref(), FlowState::Water)?;
            if let Some(times) = weekly {
                pillar.frequency = PillarFrequency::WeeklyTimes(times);
            }
            println!("Pillar created: {}", pillar.name);
            session.state.pillars.push(pillar);
            session.save()?;
        }
        PillarAction::List { json } => {
            let session = Session::open()?;
            if json {
                println!("{}", serde_json::to_string_pretty(&session.state.pillars)?);
            } else if session.state.pillars.is_empty() {
                println!("no pillars defined");
            } else {
                for pillar in &session.state.pillars {
                    let frequency = match pillar.frequency {
                        PillarFrequency::Daily => "daily".to_string(),
                        PillarFrequency::WeeklyTimes(n) => format!("{n}x/week"),
                    };
                    let windows: Vec<String> = pillar
                        .preferred_windows
                        .iter()
                        .map(|w| format!("{}-{}", w.start.format("%H:%M"), w.end.format("%H:%M")))
                        .collect();
                    println!(
                        "{}  {}, {}-{} min, {}",
                        pillar.name,
                        frequency,
                        pillar.min_duration().num_minutes(),
                        pillar.max_duration().num_minutes(),
                        windows.join(", ")
                    );
                }
            }
        }
        PillarAction::Remove { name } => {
            let mut session = Session::open()?;
            let before = session.state.pillars.len();
            session.state.pillars.retain(|p| !p.name.eq_ignore_ascii_case(&name));
            if session.state.pillars.len() == before {
                return Err(format!("no pillar named '{name}'").into());
            }
            session.save()?;
            println!("Pillar removed: {name}");
        }
    }
    Ok(())
}
