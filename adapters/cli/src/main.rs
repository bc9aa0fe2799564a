#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Headless command-line host for the pixel office engine.

mod config;
mod layout_transfer;

use std::{
    fs,
    path::{Path, PathBuf},
    time::Duration,
};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use config::CliConfig;
use pixel_office_core::{AgentId, Event, LayoutSnapshot, NamedSeats, SeatAssignments};
use pixel_office_rendering::HeadlessBackend;
use pixel_office_system_session::OfficeSession;
use pixel_office_world::query;
use serde::Serialize;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

/// Validates, converts and simulates office layouts.
#[derive(Debug, Parser)]
#[command(name = "pixel-office", version, long_about = None)]
struct Cli {
    /// Optional TOML file with `[simulation]`, `[camera]`, `[editor]` and `[logging]` tables.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: CliCommand,
}

#[derive(Debug, Subcommand)]
enum CliCommand {
    /// Loads a layout file and reports structural problems.
    Validate {
        /// Layout JSON file.
        layout: PathBuf,
    },
    /// Prints the clipboard transfer string of a layout file.
    Export {
        /// Layout JSON file.
        layout: PathBuf,
    },
    /// Decodes a clipboard transfer string into layout JSON.
    Import {
        /// Transfer string produced by `export`.
        value: String,
        /// Writes the layout here instead of standard output.
        #[arg(long, short)]
        output: Option<PathBuf>,
    },
    /// Spawns agents into a layout, runs the simulation and prints the seat payloads.
    Simulate {
        /// Layout JSON file; the built-in layout is used when omitted.
        layout: Option<PathBuf>,
        /// Number of agents to spawn.
        #[arg(long, default_value_t = 4)]
        agents: u32,
        /// Number of simulation ticks to run.
        #[arg(long, default_value_t = 600)]
        ticks: u32,
        /// Simulation ticks per second.
        #[arg(long, default_value_t = 60, value_parser = clap::value_parser!(u32).range(1..))]
        tick_hz: u32,
    },
}

/// Seat payloads printed by `simulate`.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct SimulationReport {
    ticks: u32,
    frames: u64,
    seats: SeatAssignments,
    names: NamedSeats,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = CliConfig::load(cli.config.as_deref())?;
    init_tracing(&config.logging.filter);

    match cli.command {
        CliCommand::Validate { layout } => validate(&config, &layout),
        CliCommand::Export { layout } => export(&config, &layout),
        CliCommand::Import { value, output } => import(&config, &value, output.as_deref()),
        CliCommand::Simulate {
            layout,
            agents,
            ticks,
            tick_hz,
        } => simulate(&config, layout.as_deref(), agents, ticks, tick_hz),
    }
}

fn init_tracing(fallback: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(fallback));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .compact()
        .try_init();
}

fn read_layout(path: &Path) -> Result<LayoutSnapshot> {
    let text = fs::read_to_string(path)
        .with_context(|| format!("failed to read layout {}", path.display()))?;
    serde_json::from_str(&text)
        .with_context(|| format!("failed to parse layout {}", path.display()))
}

fn load_session(
    config: &CliConfig,
    layout: LayoutSnapshot,
    source: &str,
) -> Result<OfficeSession> {
    let mut session = OfficeSession::new(config.session());
    session
        .load_layout(layout)
        .with_context(|| format!("layout {source} is malformed"))?;
    Ok(session)
}

fn validate(config: &CliConfig, path: &Path) -> Result<()> {
    let layout = read_layout(path)?;
    let session = load_session(config, layout, &path.display().to_string())?;
    let world = session.world();
    let (columns, rows) = query::dimensions(world);
    let seats = query::seat_view(world).iter().count();
    info!(columns, rows, seats, "layout valid");
    println!(
        "{}: {columns}x{rows} tiles, {} furniture, {seats} seats",
        path.display(),
        query::furniture(world).len(),
    );
    Ok(())
}

fn export(config: &CliConfig, path: &Path) -> Result<()> {
    let layout = read_layout(path)?;
    let _ = load_session(config, layout.clone(), &path.display().to_string())?;
    let encoded = layout_transfer::encode(&layout)?;
    println!("{encoded}");
    Ok(())
}

fn import(config: &CliConfig, value: &str, output: Option<&Path>) -> Result<()> {
    let layout = layout_transfer::decode(value).context("failed to decode layout string")?;
    let _ = load_session(config, layout.clone(), "string")?;
    let json = serde_json::to_string_pretty(&layout).context("failed to serialise layout")?;
    match output {
        Some(path) => fs::write(path, json)
            .with_context(|| format!("failed to write layout {}", path.display()))?,
        None => println!("{json}"),
    }
    Ok(())
}

fn simulate(
    config: &CliConfig,
    path: Option<&Path>,
    agents: u32,
    ticks: u32,
    tick_hz: u32,
) -> Result<()> {
    let mut session = match path {
        Some(path) => load_session(config, read_layout(path)?, &path.display().to_string())?,
        None => OfficeSession::new(config.session()),
    };
    for index in 1..=agents {
        session.add_agent(AgentId::new(index), Some(format!("agent-{index}")), None);
    }

    let dt = Duration::from_secs_f64(1.0 / f64::from(tick_hz));
    let mut backend = HeadlessBackend::default();
    let mut arrivals = 0_usize;
    for _ in 0..ticks {
        let events = session.tick(dt);
        arrivals += events
            .iter()
            .filter(|event| matches!(event, Event::CharacterArrived { .. }))
            .count();
        session.present(&mut backend)?;
    }
    debug!(arrivals, "simulation finished");

    let world = session.world();
    let report = SimulationReport {
        ticks,
        frames: backend.frames(),
        seats: query::seat_assignments(world),
        names: query::named_seats(world),
    };
    info!(
        agents,
        seated = report
            .seats
            .values()
            .filter(|record| record.seat_id.is_some())
            .count(),
        "simulation report ready"
    );
    println!(
        "{}",
        serde_json::to_string_pretty(&report).context("failed to serialise report")?
    );
    Ok(())
}
