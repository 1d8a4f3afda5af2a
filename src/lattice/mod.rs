//! Lattice occupancy and the particles living on it

pub mod occupancy;
pub mod registry;

pub use occupancy::Lattice;
pub use registry::{Particle, ParticleRegistry};
