use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::EnvFilter;

use warden::app::SimulationApp;
use warden::config::ScenarioConfig;
use warden::scene::default_scenario;

#[derive(Parser)]
#[command(name = "warden", about = "Headless patrol/pursuit AI simulation")]
struct Args {
    /// Scenario TOML file. The bundled arena is used when omitted.
    #[arg(long)]
    scenario: Option<PathBuf>,

    /// Number of fixed steps to run (overrides the scenario).
    #[arg(long)]
    ticks: Option<u32>,

    /// Fixed step in seconds (overrides the scenario).
    #[arg(long)]
    dt: Option<f32>,

    /// Pace steps against the wall clock instead of running flat out.
    #[arg(long)]
    realtime: bool,

    /// Log filter, e.g. `debug` or `warden::fsm=trace`. Falls back to RUST_LOG, then `info`.
    #[arg(long)]
    log: Option<String>,
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(args.log.as_deref());

    let mut config = match &args.scenario {
        Some(path) => ScenarioConfig::load(path)
            .with_context(|| format!("loading scenario {}", path.display()))?,
        None => default_scenario().context("loading bundled arena")?,
    };
    if let Some(ticks) = args.ticks {
        config.simulation.ticks = ticks;
    }
    if let Some(dt) = args.dt {
        config.simulation.dt = dt;
    }

    // Overrides are validated with the rest of the scenario here.
    let mut app = SimulationApp::new(&config).context("building scenario")?;
    let ticks = config.simulation.ticks;
    if args.realtime {
        app.run_realtime(ticks);
    } else {
        app.run_fixed(ticks);
    }
    Ok(())
}

fn init_logging(directive: Option<&str>) {
    let filter = match directive {
        Some(directive) => EnvFilter::new(directive),
        None => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}
