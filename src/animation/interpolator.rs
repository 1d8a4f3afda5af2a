//! Drives a transition through its visual phases
//!
//! The interpolator only moves a `JumpPhase` forward in time and reports
//! when a transition is ready to commit. It never touches the lattice.

use glam::Vec2;

use crate::animation::phase::JumpPhase;
use crate::boundary::BoundaryPolicy;
use crate::core::config::AnimationConfig;
use crate::core::types::Transition;

/// Where and how big to draw a particle this frame
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ParticleVisual {
    pub position: Vec2,
    pub scale: f32,
}

#[derive(Debug, Clone)]
pub struct AnimationInterpolator {
    config: AnimationConfig,
    speed: f64,
}

impl AnimationInterpolator {
    pub fn new(config: AnimationConfig, speed: f64) -> Self {
        Self { config, speed }
    }

    pub fn config(&self) -> &AnimationConfig {
        &self.config
    }

    pub fn speed(&self) -> f64 {
        self.speed
    }

    pub fn set_speed(&mut self, speed: f64) {
        self.speed = speed;
    }

    /// True if transitions commit at fire time with no visible phases
    pub fn is_instant(&self) -> bool {
        self.config.is_instant()
    }

    /// Seconds (at speed 1) spent in Entering, and again in Exiting
    fn edge_duration(&self) -> f64 {
        self.config.jump_duration * (1.0 - self.config.inside_share) / 2.0
    }

    /// Seconds (at speed 1) spent in Inside
    fn inside_duration(&self) -> f64 {
        self.config.jump_duration * self.config.inside_share
    }

    /// First phase of an accepted transition
    pub fn begin(&self, transition: Transition) -> JumpPhase {
        JumpPhase::Entering {
            transition,
            progress: 0.0,
        }
    }

    /// Advance a phase by `dt` wall-clock seconds.
    ///
    /// Leftover time carries into the next phase, so a long frame can run
    /// through several phases at once. Returns the transition when Exiting
    /// completes; the phase is `Idle` afterwards and the caller must commit.
    pub fn advance(&self, phase: &mut JumpPhase, dt: f64) -> Option<Transition> {
        let mut remaining = (dt * self.speed).max(0.0);
        let edge = self.edge_duration();
        let inside = self.inside_duration();

        loop {
            match *phase {
                JumpPhase::Idle => return None,
                JumpPhase::Entering { transition, progress } => {
                    match step(progress, edge, &mut remaining) {
                        Some(p) => {
                            *phase = JumpPhase::Entering { transition, progress: p };
                            return None;
                        }
                        None => {
                            *phase = JumpPhase::Inside { transition, progress: 0.0 };
                        }
                    }
                }
                JumpPhase::Inside { transition, progress } => {
                    match step(progress, inside, &mut remaining) {
                        Some(p) => {
                            *phase = JumpPhase::Inside { transition, progress: p };
                            return None;
                        }
                        None => {
                            *phase = JumpPhase::Exiting { transition, progress: 0.0 };
                        }
                    }
                }
                JumpPhase::Exiting { transition, progress } => {
                    match step(progress, edge, &mut remaining) {
                        Some(p) => {
                            *phase = JumpPhase::Exiting { transition, progress: p };
                            return None;
                        }
                        None => {
                            *phase = JumpPhase::Idle;
                            return Some(transition);
                        }
                    }
                }
            }
        }
    }

    /// Where to draw a particle in `phase`; `resting` is its committed site
    pub fn visual<B: BoundaryPolicy + ?Sized>(
        &self,
        phase: &JumpPhase,
        resting: Vec2,
        boundary: &B,
    ) -> ParticleVisual {
        let inside_scale = self.config.inside_scale;
        match phase {
            JumpPhase::Idle => ParticleVisual {
                position: resting,
                scale: 1.0,
            },
            JumpPhase::Entering { transition, progress } => ParticleVisual {
                position: boundary.endpoint_position(transition.from),
                scale: lerp(1.0, inside_scale, *progress as f32),
            },
            JumpPhase::Inside { transition, progress } => ParticleVisual {
                position: boundary
                    .path(transition)
                    .point_at(ease_in_out(*progress as f32)),
                scale: inside_scale,
            },
            JumpPhase::Exiting { transition, progress } => ParticleVisual {
                position: boundary.endpoint_position(transition.to),
                scale: lerp(inside_scale, 1.0, *progress as f32),
            },
        }
    }
}

/// Consume time for one phase. Returns the new progress if the phase is
/// still running, or `None` once it completes (time left over stays in
/// `remaining`).
fn step(progress: f64, duration: f64, remaining: &mut f64) -> Option<f64> {
    if duration <= 0.0 {
        return None;
    }
    let needed = (1.0 - progress) * duration;
    if *remaining >= needed {
        *remaining -= needed;
        None
    } else {
        let p = progress + *remaining / duration;
        *remaining = 0.0;
        Some(p)
    }
}

fn lerp(a: f32, b: f32, t: f32) -> f32 {
    a + (b - a) * t.clamp(0.0, 1.0)
}

fn ease_in_out(t: f32) -> f32 {
    let t = t.clamp(0.0, 1.0);
    t * t * (3.0 - 2.0 * t)
}
