use thiserror::Error;

use crate::core::types::{ParticleId, SiteIndex};

#[derive(Error, Debug)]
pub enum AsepError {
    #[error("Cannot place {requested} particles on a lattice of {capacity} sites")]
    InsufficientCapacity { requested: usize, capacity: usize },

    #[error("Site {site} is outside a lattice of {size} sites")]
    SiteOutOfRange { site: SiteIndex, size: usize },

    #[error("Particle not found: {0}")]
    ParticleNotFound(ParticleId),

    #[error("Site {0} is already occupied")]
    SiteOccupied(SiteIndex),

    #[error("Site {0} is not occupied")]
    SiteVacant(SiteIndex),

    #[error("Particle {0} is mid-transition")]
    ParticleBusy(ParticleId),

    #[error("Boundary has no reservoirs")]
    NoReservoir,

    #[error("Simulation has been disposed")]
    Disposed,

    #[error("Unknown action: {0}")]
    UnknownAction(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, AsepError>;
