//! Rendering view of the simulation
//!
//! Collects a snapshot of lattice, particle and interpolator state for the
//! per-frame render callback.
//! This module is READ-ONLY - it never modifies simulation state.

pub mod text;
pub mod viewport;

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::animation::JumpPhase;
use crate::boundary::BoundaryPolicy;
use crate::core::config::{BoundaryKind, SimulationParams};
use crate::core::types::{Endpoint, ParticleId, SimTime, SiteIndex};
use crate::simulation::SimulationController;

pub use text::TextRenderer;
pub use viewport::Viewport;

/// Size of the drawing surface in pixels
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CanvasSize {
    pub width: f32,
    pub height: f32,
}

impl CanvasSize {
    pub fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SiteView {
    pub index: SiteIndex,
    pub position: Vec2,
    pub occupied: bool,
    /// Destination of a transition in flight
    pub reserved: bool,
}

/// Snapshot of a particle for rendering
#[derive(Debug, Clone, PartialEq)]
pub struct ParticleView {
    /// `None` for a reservoir entry that has not committed yet
    pub id: Option<ParticleId>,
    /// Committed site, if the particle exists on the lattice
    pub site: Option<SiteIndex>,
    pub position: Vec2,
    pub scale: f32,
    pub phase: JumpPhase,
    /// Progress over the whole transition, 0 when idle
    pub progress: f64,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ReservoirView {
    pub endpoint: Endpoint,
    pub position: Vec2,
}

/// Everything a frame needs, in lattice units
#[derive(Debug, Clone, PartialEq)]
pub struct SceneView {
    pub boundary: BoundaryKind,
    pub clock: SimTime,
    pub paused: bool,
    pub sites: Vec<SiteView>,
    pub particles: Vec<ParticleView>,
    pub reservoirs: Vec<ReservoirView>,
    /// Axis-aligned bounds of sites and reservoirs
    pub bounds: (Vec2, Vec2),
}

impl SceneView {
    pub fn moving(&self) -> impl Iterator<Item = &ParticleView> + '_ {
        self.particles.iter().filter(|p| !p.phase.is_idle())
    }
}

/// The per-frame render callback
pub trait RenderTarget {
    fn render(&mut self, scene: &SceneView, canvas: CanvasSize, params: &SimulationParams);
}

/// Collect a scene snapshot from a controller.
/// Call this once per frame; the controller is only read.
pub fn collect_scene<B: BoundaryPolicy>(controller: &SimulationController<B>) -> SceneView {
    let boundary = controller.boundary();
    let registry = controller.registry();
    let lattice = registry.lattice();
    let interpolator = controller.interpolator();

    let sites = (0..lattice.size())
        .map(|index| SiteView {
            index,
            position: boundary.site_position(index),
            occupied: lattice.is_occupied(index),
            reserved: lattice.is_reserved(index),
        })
        .collect();

    let mut particles: Vec<ParticleView> = registry
        .iter()
        .map(|particle| {
            let resting = boundary.site_position(particle.site());
            let visual = interpolator.visual(&particle.phase, resting, boundary);
            ParticleView {
                id: Some(particle.id),
                site: Some(particle.site()),
                position: visual.position,
                scale: visual.scale,
                phase: particle.phase,
                progress: particle.phase.overall_progress(),
            }
        })
        .collect();

    let inbound = controller.inbound();
    if !inbound.is_idle() {
        let resting = boundary.endpoint_position(Endpoint::EntryReservoir);
        let visual = interpolator.visual(inbound, resting, boundary);
        particles.push(ParticleView {
            id: None,
            site: None,
            position: visual.position,
            scale: visual.scale,
            phase: *inbound,
            progress: inbound.overall_progress(),
        });
    }

    let reservoirs = [Endpoint::EntryReservoir, Endpoint::ExitReservoir]
        .into_iter()
        .filter_map(|endpoint| {
            boundary
                .reservoir_position(endpoint)
                .map(|position| ReservoirView { endpoint, position })
        })
        .collect();

    SceneView {
        boundary: boundary.kind(),
        clock: controller.clock(),
        paused: controller.is_paused(),
        sites,
        particles,
        reservoirs,
        bounds: boundary.bounds(),
    }
}
