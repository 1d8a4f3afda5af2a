//! Ring lattice: site N-1 and site 0 are neighbours
//!
//! Sites are laid out clockwise from the top of a circle, so a rightward hop
//! runs clockwise and every hop, the wraparound included, follows an arc.

use glam::Vec2;

use crate::boundary::geometry::{ring_angle, ring_position, ring_radius, shortest_sweep, PathShape};
use crate::boundary::{BoundaryPolicy, TargetKind};
use crate::core::config::{BoundaryKind, SimulationParams};
use crate::core::types::{Direction, SiteIndex, Transition};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Circular {
    size: usize,
}

impl Circular {
    pub fn new(size: usize) -> Self {
        Self { size }
    }

    pub fn radius(&self) -> f32 {
        ring_radius(self.size)
    }
}

impl BoundaryPolicy for Circular {
    fn from_params(params: &SimulationParams) -> Self {
        Self::new(params.lattice_size)
    }

    fn kind(&self) -> BoundaryKind {
        BoundaryKind::Circular
    }

    fn size(&self) -> usize {
        self.size
    }

    fn candidate_target(&self, site: SiteIndex, direction: Direction) -> TargetKind {
        let n = self.size;
        if n == 0 {
            return TargetKind::Blocked;
        }
        let site = site % n;
        match direction {
            Direction::Right => TargetKind::InBounds((site + 1) % n),
            Direction::Left => TargetKind::InBounds((site + n - 1) % n),
        }
    }

    fn bond_count(&self) -> usize {
        self.size
    }

    fn site_position(&self, site: SiteIndex) -> Vec2 {
        ring_position(site, self.size)
    }

    fn path(&self, transition: &Transition) -> PathShape {
        match (transition.from.site(), transition.to.site()) {
            (Some(from), Some(to)) => {
                let start_angle = ring_angle(from, self.size);
                let sweep = shortest_sweep(start_angle, ring_angle(to, self.size));
                PathShape::Arc {
                    centre: Vec2::ZERO,
                    radius: self.radius(),
                    start_angle,
                    sweep,
                }
            }
            // A ring has no reservoirs; fall back to a straight segment
            _ => PathShape::line(
                self.endpoint_position(transition.from),
                self.endpoint_position(transition.to),
            ),
        }
    }
}
