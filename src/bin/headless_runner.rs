//! Headless ASEP Runner
//!
//! Runs independent seeded trials in parallel with instant transitions and
//! prints ensemble statistics as JSON.

use std::path::PathBuf;

use asep_sim::core::config::{AnimationConfig, BoundaryKind, SimulationParams};
use asep_sim::core::error::Result;
use asep_sim::simulation::output::timed;
use asep_sim::simulation::{run_trial, RunOutput, TrialResult};
use clap::Parser;
use rayon::prelude::*;

/// Headless ASEP Runner - seeded ensembles for density and current
#[derive(Parser, Debug)]
#[command(name = "headless_runner")]
#[command(about = "Run independent ASEP trials and output ensemble statistics")]
struct Args {
    /// TOML preset to start from (see data/presets/)
    #[arg(long)]
    preset: Option<PathBuf>,

    /// Boundary: closed, circular or open
    #[arg(long)]
    boundary: Option<BoundaryKind>,

    /// Number of lattice sites
    #[arg(long)]
    sites: Option<usize>,

    /// Number of particles placed at start
    #[arg(long)]
    particles: Option<usize>,

    #[arg(long)]
    right_rate: Option<f64>,

    #[arg(long)]
    left_rate: Option<f64>,

    #[arg(long)]
    entry_rate: Option<f64>,

    #[arg(long)]
    exit_rate: Option<f64>,

    /// Simulated seconds per trial
    #[arg(long, default_value_t = 100.0)]
    duration: f64,

    /// Step between observations, in simulated seconds
    #[arg(long, default_value_t = 0.1)]
    step: f64,

    /// Number of independent trials
    #[arg(long, default_value_t = 8)]
    trials: u64,

    /// Base seed; trial i uses seed + i
    #[arg(long)]
    seed: Option<u64>,

    /// Output format: json or text
    #[arg(long, default_value = "json")]
    format: String,
}

impl Args {
    fn params(&self) -> Result<SimulationParams> {
        let mut params = match &self.preset {
            Some(path) => SimulationParams::load(path)?,
            None => SimulationParams::default(),
        };
        if let Some(boundary) = self.boundary {
            params.boundary = boundary;
        }
        if let Some(sites) = self.sites {
            params.lattice_size = sites;
        }
        if let Some(particles) = self.particles {
            params.num_particles = particles;
        }
        if let Some(rate) = self.right_rate {
            params.right_rate = rate;
        }
        if let Some(rate) = self.left_rate {
            params.left_rate = rate;
        }
        if let Some(rate) = self.entry_rate {
            params.entry_rate = rate;
        }
        if let Some(rate) = self.exit_rate {
            params.exit_rate = rate;
        }
        params.animation = AnimationConfig::instant();
        params.animation_speed = 1.0;
        params.is_paused = false;
        let params = params.clamped();
        params.validate()?;
        Ok(params)
    }
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "asep_sim=warn".into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    let params = args.params()?;
    let base_seed = args.seed.unwrap_or_else(rand::random);

    tracing::info!(
        trials = args.trials,
        duration = args.duration,
        boundary = params.boundary.name(),
        seed = base_seed,
        "starting headless run"
    );

    let (results, elapsed) = timed(|| {
        (0..args.trials)
            .into_par_iter()
            .map(|i| run_trial(params.clone().with_seed(base_seed.wrapping_add(i)), args.duration, args.step))
            .collect::<Vec<Result<TrialResult>>>()
    });
    let trials = results.into_iter().collect::<Result<Vec<_>>>()?;

    let mut output_params = params;
    output_params.seed = Some(base_seed);
    let output = RunOutput::new(output_params, args.duration, trials, elapsed);

    if args.format == "text" {
        println!("{}", output.summary());
    } else {
        println!("{}", output.to_json());
    }
    Ok(())
}
