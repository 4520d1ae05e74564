use galsim::{bench_forces, frame_indices, write_trajectories, RunMode, Scenario, ScenarioConfig};

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use tracing::info;
use tracing_subscriber::EnvFilter;

use std::fs;
use std::path::PathBuf;

#[derive(ValueEnum, Debug, Clone, Copy)]
enum Mode {
    Fresh,
    Resume,
    Reverse,
}

impl From<Mode> for RunMode {
    fn from(mode: Mode) -> Self {
        match mode {
            Mode::Fresh => RunMode::Fresh,
            Mode::Resume => RunMode::Resume,
            Mode::Reverse => RunMode::Reverse,
        }
    }
}

/// Interacting galaxies with tracer rings, integrated by leapfrog
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// Scenario file (YAML); built-in defaults when absent
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Initial condition source (overrides the config file)
    #[arg(short, long, value_enum)]
    mode: Option<Mode>,

    /// Output directory for checkpoints and reports (overrides the config file)
    #[arg(short, long, value_name = "DIR")]
    out: Option<PathBuf>,

    /// Time the force pass instead of running a scenario
    #[arg(long)]
    bench: bool,
}

// load here to keep main clean
fn load_scenario(args: &Args) -> Result<ScenarioConfig> {
    let mut cfg = match &args.config {
        Some(path) => ScenarioConfig::load(path).with_context(|| format!("loading {}", path.display()))?,
        None => ScenarioConfig::default(),
    };
    if let Some(mode) = args.mode {
        cfg.mode = mode.into();
    }
    if let Some(out) = &args.out {
        cfg.output_dir = out.clone();
    }
    Ok(cfg)
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let args = Args::parse();
    if args.bench {
        bench_forces()?;
        return Ok(());
    }

    let cfg = load_scenario(&args)?;
    let mut scenario = Scenario::build(&cfg).context("building scenario")?;
    info!(
        bodies = scenario.bodies.len(),
        tracers = scenario.bodies.tracer_count(),
        mode = ?cfg.mode,
        "scenario ready"
    );

    let report = scenario.run().context("integrating")?;

    fs::create_dir_all(&cfg.output_dir).with_context(|| format!("creating {}", cfg.output_dir.display()))?;
    let suffix = match cfg.mode {
        RunMode::Reverse => "_reversed",
        _ => "",
    };
    report
        .write(&cfg.output_dir.join(format!("pericentre{suffix}.txt")))
        .context("writing pericentre report")?;
    write_trajectories(&scenario.bodies, &cfg.output_dir.join(format!("trajectories{suffix}.txt")))
        .context("writing trajectories")?;

    let saved = scenario.bodies.history_len()?;
    let frames = frame_indices(saved, scenario.frames);
    let spacing = scenario.clock.total_steps / scenario.frames.max(1);
    info!(
        frames = frames.len(),
        "time between images is {} {}",
        spacing as f64 * scenario.parameters.dt / scenario.parameters.units.time,
        scenario.parameters.units.time_label
    );

    Ok(())
}
