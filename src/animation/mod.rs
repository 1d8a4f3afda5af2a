//! Visual interpolation of committed-later transitions

pub mod interpolator;
pub mod phase;

pub use interpolator::{AnimationInterpolator, ParticleVisual};
pub use phase::JumpPhase;
