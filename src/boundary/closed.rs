//! Walled line: no wraparound, no reservoirs

use glam::Vec2;

use crate::boundary::geometry::{line_position, PathShape};
use crate::boundary::{BoundaryPolicy, TargetKind};
use crate::core::config::{BoundaryKind, SimulationParams};
use crate::core::types::{Direction, SiteIndex, Transition};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Closed {
    size: usize,
}

impl Closed {
    pub fn new(size: usize) -> Self {
        Self { size }
    }
}

impl BoundaryPolicy for Closed {
    fn from_params(params: &SimulationParams) -> Self {
        Self::new(params.lattice_size)
    }

    fn kind(&self) -> BoundaryKind {
        BoundaryKind::Closed
    }

    fn size(&self) -> usize {
        self.size
    }

    fn candidate_target(&self, site: SiteIndex, direction: Direction) -> TargetKind {
        match direction {
            Direction::Right if site + 1 < self.size => TargetKind::InBounds(site + 1),
            Direction::Left if site > 0 && site < self.size => TargetKind::InBounds(site - 1),
            _ => TargetKind::Blocked,
        }
    }

    fn bond_count(&self) -> usize {
        self.size.saturating_sub(1)
    }

    fn site_position(&self, site: SiteIndex) -> Vec2 {
        line_position(site, self.size)
    }

    fn path(&self, transition: &Transition) -> PathShape {
        PathShape::line(
            self.endpoint_position(transition.from),
            self.endpoint_position(transition.to),
        )
    }
}
