//! Chain management: named sequences of blocks.

use clap::Subcommand;
use dayglass_core::{BehaviorEvent, Chain};

use crate::parse;
use crate::session::{CliResult, Session};

#[derive(Subcommand)]
pub enum ChainAction {
    /// Define a chain from ordered steps
    Add {
        /// Chain name
        name: String,
        /// Step as title:minutes[:energy[:flow]], repeatable
        #[arg(long = "step", required = true)]
        steps: Vec<String>,
    },
    /// List chains
    List {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Record a full run-through of a chain
    Done {
        /// Chain name
        name: String,
    },
    /// Delete a chain
    Remove {
        /// Chain name
        name: String,
    },
}

pub fn run(action: ChainAction) -> CliResult {
    match action {
        ChainAction::Add { name, steps } => {
            let mut session = Session::open()?;
            if session.state.chain_by_name(&name).is_some() {
                return Err(format!("chain '{name}' already exists").into());
            }
            let links = steps.iter().map(|s| parse::step(s)).collect::<Result<Vec<_>, _>>()?;
            let chain = Chain::new(name, links);
            println!(
                "Chain created: {} ({} steps, {} min)",
                chain.name,
                chain.links.len(),
                chain.total_duration().num_minutes()
            );
            session.state.chains.push(chain);
            session.save()?;
        }
        ChainAction::List { json } => {
            let session = Session::open()?;
            if json {
                println!("{}", serde_json::to_string_pretty(&session.state.chains)?);
            } else if session.state.chains.is_empty() {
                println!("no chains defined");
            } else {
                for chain in &session.state.chains {
                    let routine = if chain.is_routine { " [routine]" } else { "" };
                    println!(
                        "{}{}  {} min, done {}x",
                        chain.name,
                        routine,
                        chain.total_duration().num_minutes(),
                        chain.completion_count
                    );
                    for (i, link) in chain.links.iter().enumerate() {
                        println!(
                            "  {}. {} ({} min, {}, {})",
                            i + 1,
                            link.title,
                            link.duration().num_minutes(),
                            link.energy.label(),
                            link.flow.label()
                        );
                    }
                }
            }
        }
        ChainAction::Done { name } => {
            let mut session = Session::open()?;
            let chain = session
                .state
                .chains
                .iter_mut()
                .find(|c| c.name.eq_ignore_ascii_case(&name))
                .ok_or_else(|| format!("no chain named '{name}'"))?;
            let promoted = chain.record_completion();
            let snapshot = chain.clone();
            if promoted {
                println!("{} is now a routine", snapshot.name);
            } else {
                println!("{} done {}x", snapshot.name, snapshot.completion_count);
            }
            session.record(vec![BehaviorEvent::chain_applied(snapshot)])?;
            session.save()?;
        }
        ChainAction::Remove { name } => {
            let mut session = Session::open()?;
            let before = session.state.chains.len();
            session.state.chains.retain(|c| !c.name.eq_ignore_ascii_case(&name));
            if session.state.chains.len() == before {
                return Err(format!("no chain named '{name}'").into());
            }
            session.save()?;
            println!("Chain removed: {name}");
        }
    }
    Ok(())
}
