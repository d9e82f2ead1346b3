//! Course allocation simulator CLI.
//!
//! Loads a JSON roster, runs the simulation and prints the event log and
//! the final report.

use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::{Parser, ValueEnum};
use tracing::{warn, Level};
use tracing_subscriber::FmtSubscriber;

use course_allocation_core::orchestrator::{Orchestrator, SimulationConfig, TimingConfig};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    /// One human-readable line per event, then a summary
    Text,
    /// Events and report as a single JSON document
    Json,
}

#[derive(Parser)]
#[command(name = "course-allocation")]
#[command(version)]
#[command(about = "Concurrent course allocation simulator")]
struct Cli {
    /// Roster file (JSON)
    roster: PathBuf,

    /// Override the roster's RNG seed
    #[arg(long)]
    seed: Option<u64>,

    /// Use millisecond-scale pacing instead of the roster's timing
    #[arg(long)]
    fast: bool,

    /// Output format
    #[arg(long, value_enum, default_value = "text")]
    format: OutputFormat,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let level = if cli.verbose { Level::DEBUG } else { Level::WARN };
    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let mut config = SimulationConfig::from_json_file(&cli.roster)
        .with_context(|| format!("loading roster {}", cli.roster.display()))?;
    if let Some(seed) = cli.seed {
        config.rng_seed = seed;
    }
    if cli.fast {
        config.timing = TimingConfig::fast();
    }

    let orchestrator = Orchestrator::new(config)?;
    let report = orchestrator.run()?;
    let events = orchestrator.state().take_events();

    match cli.format {
        OutputFormat::Text => {
            let state = orchestrator.state();
            for event in events.events() {
                println!("[t={:>3}] {}", event.time(), event.named(state));
            }
            println!();
            println!(
                "{} placed, {} unplaced, {} tutorials, finished at t={}",
                report.placed_count(),
                report.unplaced_count(),
                report.total_tutorials(),
                report.final_time
            );
        }
        OutputFormat::Json => {
            let document = serde_json::json!({
                "events": events,
                "report": report,
            });
            println!("{}", serde_json::to_string_pretty(&document)?);
        }
    }

    let violations = report.check_invariants();
    if !violations.is_empty() {
        for violation in &violations {
            warn!(%violation, "invariant violated");
        }
        bail!("{} invariant violation(s)", violations.len());
    }

    Ok(())
}
