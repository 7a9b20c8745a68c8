//! bf - button football rule/AI driver
//!
//! Runs the core against scenario files: what the AI would play, how a
//! scripted turn resolves, calibration lookups, and save snapshots.

#[cfg(feature = "cli")]
use anyhow::Result;
#[cfg(feature = "cli")]
use clap::{Parser, Subcommand};
#[cfg(feature = "cli")]
use std::path::PathBuf;

#[cfg(feature = "cli")]
use bf_core::PolicyKind;

#[cfg(feature = "cli")]
#[derive(Parser)]
#[command(name = "bf")]
#[command(about = "Drive button football rules and AI from scenario files", long_about = None)]
struct Cli {
    /// Engine config (YAML or JSON); defaults to the scenario or BF_CONFIG_PROFILE preset
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[cfg(feature = "cli")]
#[derive(Subcommand)]
enum Commands {
    /// Print the action a policy commits to
    Decide {
        /// Scenario JSON file
        #[arg(long)]
        scenario: PathBuf,

        /// dummy, fuzzy or decourt
        #[arg(long, default_value = "decourt")]
        policy: PolicyKind,
    },

    /// Resolve one scripted turn and print the outcome
    Resolve {
        /// Scenario JSON file
        #[arg(long)]
        scenario: PathBuf,

        /// Turn script JSON file
        #[arg(long)]
        script: PathBuf,
    },

    /// Look up flick forces for travel distances
    Calibration {
        /// Calibration table JSON; built-in table when absent
        #[arg(long)]
        table: Option<PathBuf>,

        /// Distances to look up; prints the whole table when empty
        distances: Vec<f32>,
    },

    /// Write a scenario out as a save file
    Snapshot {
        /// Scenario JSON file
        #[arg(long)]
        scenario: PathBuf,

        /// Output save file
        #[arg(long)]
        out: PathBuf,
    },
}

#[cfg(feature = "cli")]
fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    match cli.command {
        Commands::Decide { scenario, policy } => {
            let scenario: bf_cli::Scenario = bf_cli::read_json(&scenario)?;
            let config = bf_cli::load_config(cli.config.as_deref(), scenario.profile.as_deref())?;
            let session = bf_cli::build_session(&scenario, config, policy)?;
            let action = bf_cli::decide(&session, policy);
            log::info!("{} plays {:?} with {:?}", policy, action.kind, action.actor);
            println!("{}", serde_json::to_string_pretty(&action)?);
        }

        Commands::Resolve { scenario, script } => {
            let scenario: bf_cli::Scenario = bf_cli::read_json(&scenario)?;
            let script: bf_cli::TurnScript = bf_cli::read_json(&script)?;
            let config = bf_cli::load_config(cli.config.as_deref(), scenario.profile.as_deref())?;
            let mut session = bf_cli::build_session(&scenario, config, PolicyKind::default())?;
            let outcome = bf_cli::resolve(&mut session, &script)?;
            println!("{}", serde_json::to_string_pretty(&outcome)?);
            println!("{}", outcome.state.announcement());
        }

        Commands::Calibration { table, distances } => {
            for point in bf_cli::calibration(table.as_deref(), &distances)? {
                println!("{:>8.2} -> {:>8.3}", point.distance, point.force);
            }
        }

        Commands::Snapshot { scenario, out } => {
            let scenario: bf_cli::Scenario = bf_cli::read_json(&scenario)?;
            let config = bf_cli::load_config(cli.config.as_deref(), scenario.profile.as_deref())?;
            let session = bf_cli::build_session(&scenario, config, PolicyKind::default())?;
            let save = bf_cli::snapshot(&session, &out)?;
            println!("Saved to {}", out.display());
            println!("   Version: {}", save.version);
            println!("   Half:    {}", save.clock.half);
            println!("   Score:   {} - {}", save.score.home, save.score.away);
            println!("   State:   {} for {}", save.rules.state, save.rules.active);
        }
    }

    Ok(())
}

#[cfg(not(feature = "cli"))]
fn main() {
    eprintln!("bf CLI is not available. Enable the 'cli' feature to use it.");
    std::process::exit(1);
}
