pub mod config;
pub mod error;
pub mod types;

pub use config::{AnimationConfig, BoundaryKind, SimulationParams};
pub use error::{AsepError, Result};
pub use types::{Direction, Endpoint, ParticleId, SimTime, SiteIndex, Transition};
