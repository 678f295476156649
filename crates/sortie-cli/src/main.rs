//! Headless Sortie driver.
//!
//! Loads a scenario snapshot, advances it by a fixed number of ticks and
//! prints the resulting snapshot as JSON on stdout. Logs go to stderr.
//!
//! ```text
//! sortie <scenario.json> [--ticks N] [--step SECONDS] [--settings FILE] [--events] [--verbose]
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::Parser;
use sortie_core::{Scenario, ScenarioSnapshot, SimulationSettings};
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

/// Advance a Sortie scenario headlessly and print the resulting snapshot.
#[derive(Debug, Parser)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Scenario snapshot to load (JSON).
    #[arg(value_name = "SCENARIO")]
    scenario: PathBuf,

    /// Number of ticks to run.
    #[arg(long, default_value_t = 1)]
    ticks: usize,

    /// Wall-clock seconds per tick, before time compression.
    #[arg(long = "step", value_name = "SECONDS", default_value_t = 1.0)]
    step_seconds: f64,

    /// Simulation settings file (JSON); defaults apply when omitted.
    #[arg(long, value_name = "FILE")]
    settings: Option<PathBuf>,

    /// Print every tick event to stderr as a JSON line.
    #[arg(long = "events")]
    print_events: bool,

    /// Log per-tick detail.
    #[arg(short, long)]
    verbose: bool,
}

fn load_settings(path: Option<&Path>) -> anyhow::Result<SimulationSettings> {
    let Some(path) = path else {
        return Ok(SimulationSettings::default());
    };
    let text = fs::read_to_string(path)
        .with_context(|| format!("reading settings {}", path.display()))?;
    serde_json::from_str(&text).with_context(|| format!("parsing settings {}", path.display()))
}

fn load_scenario(path: &Path, settings: SimulationSettings) -> anyhow::Result<Scenario> {
    let text = fs::read_to_string(path)
        .with_context(|| format!("reading scenario {}", path.display()))?;
    let snapshot: ScenarioSnapshot = serde_json::from_str(&text)
        .with_context(|| format!("parsing scenario {}", path.display()))?;
    Scenario::from_snapshot(snapshot, settings)
        .with_context(|| format!("loading scenario {}", path.display()))
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let subscriber = FmtSubscriber::builder()
        .with_max_level(if args.verbose { Level::DEBUG } else { Level::INFO })
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let settings = load_settings(args.settings.as_deref())?;
    let mut scenario = load_scenario(&args.scenario, settings)?;
    info!(
        scenario = scenario.id(),
        entities = scenario.store().len(),
        ticks = args.ticks,
        step = args.step_seconds,
        "running"
    );

    for _ in 0..args.ticks {
        let summary = scenario.tick(args.step_seconds)?;
        if args.print_events {
            for event in &summary.events {
                eprintln!("{}", serde_json::to_string(event)?);
            }
        }
        if scenario.clock().has_ended() {
            info!(at = scenario.current_time(), "scenario over; stopping early");
            break;
        }
    }

    println!("{}", serde_json::to_string_pretty(&scenario.snapshot())?);
    Ok(())
}
