//! well-schedule - reservoir simulation schedule engine
//!
//! Builds a schedule from a JSON deck and prints per-step state.
//!
//! # Usage
//!
//! ```bash
//! # Per-step summary of the whole deck
//! well-schedule deck.json summary
//!
//! # One well at one report step
//! well-schedule deck.json well --name PROD1 --step 3
//!
//! # Entities that changed at a step
//! well-schedule deck.json changes --step 3
//!
//! # Validate a config file without building anything
//! well-schedule check-config schedule_config.toml
//! ```
//!
//! # Environment Variables
//!
//! - `WELL_SCHEDULE_CONFIG`: Path to the TOML construction config
//! - `RUST_LOG`: Logging level (default: info)

use anyhow::{Context, Result};
use clap::Parser;
use std::path::{Path, PathBuf};
use tracing::info;
use well_schedule::config::{validation, ScheduleConfig};
use well_schedule::{Deck, Schedule};

// ============================================================================
// CLI Arguments
// ============================================================================

#[derive(Parser, Debug)]
#[command(name = "well-schedule")]
#[command(about = "Reservoir simulation schedule engine")]
#[command(version)]
struct CliArgs {
    /// Construction config (TOML). Falls back to the standard search order.
    #[arg(long, env = "WELL_SCHEDULE_CONFIG")]
    config: Option<PathBuf>,

    /// Emit logs as JSON lines
    #[arg(long)]
    json_logs: bool,

    /// JSON deck; required by every command except check-config
    deck: Option<PathBuf>,

    #[command(subcommand)]
    command: SubCommand,
}

#[derive(clap::Subcommand, Debug)]
enum SubCommand {
    /// Print one line per report step
    Summary,

    /// Print a well snapshot as JSON
    Well {
        #[arg(long)]
        name: String,
        #[arg(long)]
        step: usize,
    },

    /// Print the wells and groups that changed at a step
    Changes {
        #[arg(long)]
        step: usize,
    },

    /// Print every group at a step as JSON
    Groups {
        #[arg(long)]
        step: usize,
    },

    /// Validate a config file and report unknown keys
    CheckConfig {
        /// Defaults to ./schedule_config.toml
        path: Option<PathBuf>,
    },
}

// ============================================================================
// Commands
// ============================================================================

fn load_config(path: Option<&Path>) -> Result<ScheduleConfig> {
    match path {
        Some(p) => ScheduleConfig::load_from_file(p)
            .with_context(|| format!("Failed to load config {}", p.display())),
        None => Ok(ScheduleConfig::load()),
    }
}

fn build(deck_path: &Path, config: &ScheduleConfig) -> Result<Schedule> {
    let deck = Deck::load_from_file(deck_path)?;
    Schedule::from_deck(&deck, config)
        .with_context(|| format!("Failed to build schedule from {}", deck_path.display()))
}

fn run_summary(schedule: &Schedule) -> Result<()> {
    let reports = schedule.step_reports().context("Failed to compute step reports")?;
    for r in &reports {
        println!(
            "{:>4}  {}  wells={:<3} open={:<3} groups={:<3} restart={} rft={}",
            r.step,
            r.time.format("%Y-%m-%d"),
            r.num_wells,
            r.open_wells.len(),
            r.num_groups,
            if r.write_restart { "yes" } else { "no" },
            r.rft_wells.join(","),
        );
    }
    Ok(())
}

fn run_check_config(path: &Path) -> Result<()> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    let warnings = validation::validate_unknown_keys(&raw);
    for w in &warnings {
        println!("warning: {w}");
    }
    let config = ScheduleConfig::load_from_file(path)
        .with_context(|| format!("Invalid config {}", path.display()))?;
    println!(
        "ok: grid {}x{}x{}, root group {}, {} warning(s)",
        config.grid.nx,
        config.grid.ny,
        config.grid.nz,
        config.groups.root,
        warnings.len()
    );
    Ok(())
}

fn main() -> Result<()> {
    let args = CliArgs::parse();

    // Initialize logging
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));
    if args.json_logs {
        tracing_subscriber::fmt().json().with_env_filter(filter).init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).with_target(false).init();
    }

    if let SubCommand::CheckConfig { path } = &args.command {
        let path = path.clone().unwrap_or_else(|| PathBuf::from("schedule_config.toml"));
        return run_check_config(&path);
    }

    let deck = args.deck.as_deref().context("A deck path is required")?;
    let config = load_config(args.config.as_deref())?;
    info!(root = %config.groups.root, "Schedule config ready");
    let schedule = build(deck, &config)?;

    match &args.command {
        SubCommand::Summary => run_summary(&schedule),
        SubCommand::Well { name, step } => {
            let well = schedule.get_well(name, *step)?;
            println!("{}", serde_json::to_string_pretty(&well)?);
            Ok(())
        }
        SubCommand::Changes { step } => {
            for name in schedule.changed_entities(*step)? {
                println!("{name}");
            }
            Ok(())
        }
        SubCommand::Groups { step } => {
            let groups = schedule
                .group_names(*step)?
                .iter()
                .map(|name| schedule.get_group(name, *step))
                .collect::<Result<Vec<_>, _>>()?;
            println!("{}", serde_json::to_string_pretty(&groups)?);
            Ok(())
        }
        SubCommand::CheckConfig { .. } => Ok(()),
    }
}
