use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

mod commands;
mod parse;
mod session;

#[derive(Parser)]
#[command(name = "dayglass-cli", version, about = "Dayglass CLI")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Configuration management
    Config {
        #[command(subcommand)]
        action: commands::config::ConfigAction,
    },
    /// Record and list behavior events
    Events {
        #[command(subcommand)]
        action: commands::events::EventsAction,
    },
    /// Chain definitions
    Chain {
        #[command(subcommand)]
        action: commands::chain::ChainAction,
    },
    /// Pillar definitions
    Pillar {
        #[command(subcommand)]
        action: commands::pillar::PillarAction,
    },
    /// Run pattern analysis now and show the result
    Analyze {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Show insights derived from learned patterns
    Insights {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Suggest blocks for right now
    Suggest {
        /// Override the current energy (sunrise|daylight|moonlight)
        #[arg(long)]
        energy: Option<String>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Day vibe classification and seasonal trends
    Vibe {
        #[command(subcommand)]
        action: commands::vibe::VibeAction,
    },
    /// Show free time on a day
    Gaps {
        /// Date (YYYY-MM-DD), default today
        #[arg(long)]
        date: Option<String>,
        /// Window start (HH:MM)
        #[arg(long, default_value = "08:00")]
        from: String,
        /// Window end (HH:MM)
        #[arg(long, default_value = "18:00")]
        to: String,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Stage, commit and undo proposed blocks
    Stage {
        #[command(subcommand)]
        action: commands::stage::StageAction,
    },
}

fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_env("DAYGLASS_LOG").unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();
}

fn main() {
    init_tracing();

    let cli = Cli::parse();
    let result = match cli.command {
        Commands::Config { action } => commands::config::run(action),
        Commands::Events { action } => commands::events::run(action),
        Commands::Chain { action } => commands::chain::run(action),
        Commands::Pillar { action } => commands::pillar::run(action),
        Commands::Analyze { json } => commands::learn::analyze(json),
        Commands::Insights { json } => commands::learn::insights(json),
        Commands::Suggest { energy, json } => commands::learn::suggest(energy, json),
        Commands::Vibe { action } => commands::vibe::run(action),
        Commands::Gaps { date, from, to, json } => commands::gaps::run(date, from, to, json),
        Commands::Stage { action } => commands::stage::run(action),
    };

    if let Err(e) = result {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}
