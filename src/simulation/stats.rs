//! Running observables of a simulation

use serde::{Deserialize, Serialize};

use crate::core::types::{Direction, SimTime};
use crate::lattice::Lattice;

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct SimulationStats {
    pub hops_right: u64,
    pub hops_left: u64,
    pub entries: u64,
    pub exits: u64,
    pub rejections: u64,
    /// Particles added or removed by hand
    pub manual_edits: u64,
    /// Per-site time spent occupied
    pub occupancy_time: Vec<f64>,
    /// Simulated time covered by `occupancy_time`
    pub observed_time: f64,
    last_observed: SimTime,
}

impl SimulationStats {
    pub fn new(size: usize) -> Self {
        Self {
            occupancy_time: vec![0.0; size],
            ..Self::default()
        }
    }

    /// Integrate occupancy from the last observation up to `now`.
    ///
    /// Call before every change to the lattice so each interval is charged
    /// to the configuration that held during it.
    pub fn observe(&mut self, lattice: &Lattice, now: SimTime) {
        let dt = now - self.last_observed;
        if dt <= 0.0 {
            return;
        }
        for (site, time) in self.occupancy_time.iter_mut().enumerate() {
            if lattice.is_occupied(site) {
                *time += dt;
            }
        }
        self.observed_time += dt;
        self.last_observed = now;
    }

    pub fn record_hop(&mut self, direction: Direction) {
        match direction {
            Direction::Right => self.hops_right += 1,
            Direction::Left => self.hops_left += 1,
        }
    }

    pub fn committed(&self) -> u64 {
        self.hops_right + self.hops_left + self.entries + self.exits
    }

    /// Time-averaged occupation of each site
    pub fn density_profile(&self) -> Vec<f64> {
        if self.observed_time <= 0.0 {
            return vec![0.0; self.occupancy_time.len()];
        }
        self.occupancy_time
            .iter()
            .map(|t| t / self.observed_time)
            .collect()
    }

    pub fn mean_density(&self) -> f64 {
        let profile = self.density_profile();
        if profile.is_empty() {
            return 0.0;
        }
        profile.iter().sum::<f64>() / profile.len() as f64
    }

    /// Net rightward particle flux per bond per unit time
    pub fn mean_current(&self, bonds: usize) -> f64 {
        if self.observed_time <= 0.0 || bonds == 0 {
            return 0.0;
        }
        let net = self.hops_right as f64 - self.hops_left as f64
            + self.entries as f64
            + self.exits as f64;
        net / (bonds as f64 * self.observed_time)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lattice::ParticleRegistry;

    #[test]
    fn test_density_integration() {
        let mut registry = ParticleRegistry::new(4);
        let mut stats = SimulationStats::new(4);
        registry.spawn_at(1).unwrap();
        stats.observe(registry.lattice(), 2.0);
        let id = registry.spawn_at(3).unwrap();
        stats.observe(registry.lattice(), 4.0);
        registry.remove_particle(id).unwrap();

        let profile = stats.density_profile();
        assert_eq!(profile, vec![0.0, 1.0, 0.0, 0.5]);
        assert!((stats.mean_density() - 0.375).abs() < 1e-12);
    }

    #[test]
    fn test_observe_ignores_backwards_time() {
        let registry = ParticleRegistry::new(2);
        let mut stats = SimulationStats::new(2);
        stats.observe(registry.lattice(), 1.0);
        stats.observe(registry.lattice(), 0.5);
        assert_eq!(stats.observed_time, 1.0);
    }

    #[test]
    fn test_current() {
        let mut stats = SimulationStats::new(5);
        stats.hops_right = 30;
        stats.hops_left = 10;
        stats.observed_time = 4.0;
        assert!((stats.mean_current(5) - 1.0).abs() < 1e-12);
        assert_eq!(stats.mean_current(0), 0.0);
        stats.record_hop(Direction::Left);
        assert_eq!(stats.hops_left, 11);
        assert_eq!(stats.committed(), 41);
    }
}
