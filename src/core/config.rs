//! Simulation parameters with documented ranges
//!
//! The parameter set is what the host exposes as user-tunable settings.
//! Out-of-range values are clamped here, at the boundary of the update API,
//! so the simulation loop never sees a negative rate or an empty lattice.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::core::error::{AsepError, Result};

/// Smallest lattice the host allows
pub const MIN_LATTICE_SIZE: usize = 3;

/// Largest lattice the host allows
pub const MAX_LATTICE_SIZE: usize = 50;

/// Largest particle count the host allows (independent of lattice size)
pub const MAX_PARTICLES: usize = 40;

/// Animation speed bounds; speed scales both wait times and visual progress
pub const MIN_ANIMATION_SPEED: f64 = 0.01;
pub const MAX_ANIMATION_SPEED: f64 = 100.0;

/// Which lattice geometry the simulation runs on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BoundaryKind {
    /// Line with hard walls at both ends
    #[default]
    Closed,
    /// Ring; site N-1 neighbours site 0
    #[serde(alias = "periodic")]
    Circular,
    /// Line with an entry reservoir before site 0 and an exit reservoir after site N-1
    Open,
}

impl BoundaryKind {
    pub fn name(&self) -> &'static str {
        match self {
            BoundaryKind::Closed => "closed",
            BoundaryKind::Circular => "circular",
            BoundaryKind::Open => "open",
        }
    }
}

impl std::str::FromStr for BoundaryKind {
    type Err = AsepError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "closed" => Ok(BoundaryKind::Closed),
            "circular" | "periodic" | "ring" => Ok(BoundaryKind::Circular),
            "open" => Ok(BoundaryKind::Open),
            other => Err(AsepError::Config(format!("unknown boundary '{}'", other))),
        }
    }
}

/// Visual timing of a single transition
///
/// A transition runs Entering -> Inside -> Exiting. The two edge phases
/// share what is left of `jump_duration` after `inside_share`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnimationConfig {
    /// Wall-clock seconds for a whole transition at animation speed 1.0
    ///
    /// Zero selects instant transitions: the commit happens at fire time
    /// and no visual phase is ever observed. Headless runs use this.
    pub jump_duration: f64,

    /// Fraction of `jump_duration` spent travelling in the Inside phase
    pub inside_share: f64,

    /// Particle scale while travelling between sites
    pub inside_scale: f32,
}

impl Default for AnimationConfig {
    fn default() -> Self {
        Self {
            jump_duration: 0.6,
            inside_share: 0.4,
            inside_scale: 0.35,
        }
    }
}

impl AnimationConfig {
    /// Transitions commit at fire time with no visual phases
    pub fn instant() -> Self {
        Self {
            jump_duration: 0.0,
            ..Self::default()
        }
    }

    pub fn is_instant(&self) -> bool {
        self.jump_duration <= 0.0
    }
}

/// The parameter set exposed to the host
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationParams {
    pub boundary: BoundaryKind,
    #[serde(alias = "num_boxes")]
    pub lattice_size: usize,
    pub num_particles: usize,
    #[serde(alias = "right_jump_rate")]
    pub right_rate: f64,
    #[serde(alias = "left_jump_rate")]
    pub left_rate: f64,
    /// Open only
    pub entry_rate: f64,
    /// Open only
    pub exit_rate: f64,
    pub animation_speed: f64,
    pub is_paused: bool,
    /// Fixed RNG seed; `None` seeds from entropy
    pub seed: Option<u64>,
    pub animation: AnimationConfig,
}

impl Default for SimulationParams {
    fn default() -> Self {
        Self {
            boundary: BoundaryKind::Closed,
            lattice_size: 10,
            num_particles: 4,
            right_rate: 1.0,
            left_rate: 0.2,
            entry_rate: 0.5,
            exit_rate: 0.5,
            animation_speed: 1.0,
            is_paused: false,
            seed: None,
            animation: AnimationConfig::default(),
        }
    }
}

impl SimulationParams {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_boundary(mut self, boundary: BoundaryKind) -> Self {
        self.boundary = boundary;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Return a copy with every field forced into its legal range.
    ///
    /// Never fails; the particle/site capacity check lives in `validate`
    /// because a count that fits the range can still exceed the lattice.
    pub fn clamped(&self) -> Self {
        let mut p = self.clone();
        p.lattice_size = p.lattice_size.clamp(MIN_LATTICE_SIZE, MAX_LATTICE_SIZE);
        p.num_particles = p.num_particles.min(MAX_PARTICLES);
        p.right_rate = clamp_rate(p.right_rate);
        p.left_rate = clamp_rate(p.left_rate);
        p.entry_rate = clamp_rate(p.entry_rate);
        p.exit_rate = clamp_rate(p.exit_rate);
        p.animation_speed = if p.animation_speed.is_finite() {
            p.animation_speed.clamp(MIN_ANIMATION_SPEED, MAX_ANIMATION_SPEED)
        } else {
            1.0
        };
        if !p.animation.jump_duration.is_finite() || p.animation.jump_duration < 0.0 {
            p.animation.jump_duration = 0.0;
        }
        p.animation.inside_share = if p.animation.inside_share.is_finite() {
            p.animation.inside_share.clamp(0.0, 0.9)
        } else {
            AnimationConfig::default().inside_share
        };
        p
    }

    /// Check the capacity constraint
    pub fn validate(&self) -> Result<()> {
        if self.num_particles > self.lattice_size {
            return Err(AsepError::InsufficientCapacity {
                requested: self.num_particles,
                capacity: self.lattice_size,
            });
        }
        Ok(())
    }

    /// True if switching from `self` to `other` needs a fresh lattice
    pub fn is_structural_change(&self, other: &SimulationParams) -> bool {
        self.boundary != other.boundary
            || self.lattice_size != other.lattice_size
            || self.num_particles != other.num_particles
            || self.seed != other.seed
    }

    /// True if switching from `self` to `other` changes any sampled rate
    pub fn rates_changed(&self, other: &SimulationParams) -> bool {
        self.right_rate != other.right_rate
            || self.left_rate != other.left_rate
            || self.entry_rate != other.entry_rate
            || self.exit_rate != other.exit_rate
            || self.animation_speed != other.animation_speed
    }

    /// Parse a TOML preset
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let params: SimulationParams = toml::from_str(content)?;
        Ok(params.clamped())
    }

    /// Load a TOML preset from disk
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    /// Set a single parameter from its textual name, as typed in the shell
    pub fn set_field(&mut self, name: &str, value: &str) -> Result<()> {
        match name {
            "boundary" => self.boundary = value.parse()?,
            "lattice_size" | "num_boxes" => self.lattice_size = value.parse().map_err(|e| field_error(name, e))?,
            "num_particles" => self.num_particles = value.parse().map_err(|e| field_error(name, e))?,
            "right_rate" => self.right_rate = value.parse().map_err(|e| field_error(name, e))?,
            "left_rate" => self.left_rate = value.parse().map_err(|e| field_error(name, e))?,
            "entry_rate" => self.entry_rate = value.parse().map_err(|e| field_error(name, e))?,
            "exit_rate" => self.exit_rate = value.parse().map_err(|e| field_error(name, e))?,
            "animation_speed" => self.animation_speed = value.parse().map_err(|e| field_error(name, e))?,
            "seed" => self.seed = Some(value.parse().map_err(|e| field_error(name, e))?),
            other => return Err(AsepError::Config(format!("unknown parameter '{}'", other))),
        }
        Ok(())
    }
}

fn field_error(name: &str, err: impl std::fmt::Display) -> AsepError {
    AsepError::Config(format!("{}: {}", name, err))
}

fn clamp_rate(rate: f64) -> f64 {
    if rate.is_finite() && rate > 0.0 {
        rate
    } else {
        0.0
    }
}
