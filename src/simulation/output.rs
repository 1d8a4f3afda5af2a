//! Headless run output and serialization

use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::boundary::BoundaryPolicy;
use crate::core::config::SimulationParams;
use crate::core::error::Result;
use crate::simulation::controller::SimulationController;
use crate::simulation::stats::SimulationStats;

/// Result of one independent trial
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct TrialResult {
    pub seed: Option<u64>,
    pub simulated_time: f64,
    pub final_particles: usize,
    pub final_occupancy: Vec<bool>,
    pub mean_density: f64,
    pub mean_current: f64,
    /// Events armed over the trial, re-arms after rejection included
    pub armed_events: u64,
    pub stats: SimulationStats,
}

impl TrialResult {
    pub fn from_controller(controller: &SimulationController) -> Self {
        let stats = controller.stats().clone();
        let bonds = controller.boundary().bond_count();
        Self {
            seed: controller.params().seed,
            simulated_time: controller.clock(),
            final_particles: controller.particle_count(),
            final_occupancy: controller.registry().lattice().occupancy(),
            mean_density: stats.mean_density(),
            mean_current: stats.mean_current(bonds),
            armed_events: controller.scheduler().armed_count(),
            stats,
        }
    }
}

/// Run one trial headless for `duration` seconds in steps of `step`
pub fn run_trial(params: SimulationParams, duration: f64, step: f64) -> Result<TrialResult> {
    let mut controller: SimulationController = SimulationController::new(params)?;
    controller.run_for(duration, step);
    let result = TrialResult::from_controller(&controller);
    controller.dispose();
    debug!(
        seed = ?result.seed,
        commits = result.stats.committed(),
        "trial finished"
    );
    Ok(result)
}

/// Aggregate of a batch of trials
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RunOutput {
    pub params: SimulationParams,
    pub duration: f64,
    pub wall_time_ms: u64,
    pub trials: Vec<TrialResult>,
    /// Per-site density averaged over trials
    pub density_profile: Vec<f64>,
    pub mean_density: f64,
    pub mean_current: f64,
}

impl RunOutput {
    pub fn new(params: SimulationParams, duration: f64, trials: Vec<TrialResult>, elapsed: Duration) -> Self {
        let n = trials.len().max(1) as f64;
        let sites = params.lattice_size;
        let mut density_profile = vec![0.0; sites];
        for trial in &trials {
            for (acc, d) in density_profile.iter_mut().zip(trial.stats.density_profile()) {
                *acc += d / n;
            }
        }
        let mean_density = trials.iter().map(|t| t.mean_density).sum::<f64>() / n;
        let mean_current = trials.iter().map(|t| t.mean_current).sum::<f64>() / n;

        Self {
            params,
            duration,
            wall_time_ms: elapsed.as_millis() as u64,
            trials,
            density_profile,
            mean_density,
            mean_current,
        }
    }

    pub fn to_json(&self) -> String {
        serde_json::to_string_pretty(&self).unwrap_or_else(|_| "{}".to_string())
    }

    pub fn summary(&self) -> String {
        let commits: u64 = self.trials.iter().map(|t| t.stats.committed()).sum();
        let rejections: u64 = self.trials.iter().map(|t| t.stats.rejections).sum();
        format!(
            "{} trials of {:.1}s on a {} lattice of {} sites in {}ms\n{} commits, {} rejections, density {:.3}, current {:.4}",
            self.trials.len(),
            self.duration,
            self.params.boundary.name(),
            self.params.lattice_size,
            self.wall_time_ms,
            commits,
            rejections,
            self.mean_density,
            self.mean_current,
        )
    }
}

/// Run a closure and measure its wall time
pub fn timed<T, F: FnOnce() -> T>(f: F) -> (T, Duration) {
    let start = Instant::now();
    let value = f();
    (value, start.elapsed())
}
