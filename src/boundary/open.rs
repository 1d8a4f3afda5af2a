//! Line with reservoirs
//!
//! Particles enter from a source reservoir onto site 0 and leave from site
//! N-1 into a sink reservoir. Only this single-sided flow is modelled: a
//! particle on site 0 cannot leave leftward and nothing enters at N-1.

use glam::Vec2;

use crate::boundary::geometry::{line_position, PathShape, RESERVOIR_OFFSET, SITE_SPACING};
use crate::boundary::{BoundaryPolicy, TargetKind};
use crate::core::config::{BoundaryKind, SimulationParams};
use crate::core::types::{Direction, Endpoint, SiteIndex, Transition};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Open {
    size: usize,
}

impl Open {
    pub fn new(size: usize) -> Self {
        Self { size }
    }

    fn last_site(&self) -> SiteIndex {
        self.size.saturating_sub(1)
    }
}

impl BoundaryPolicy for Open {
    fn from_params(params: &SimulationParams) -> Self {
        Self::new(params.lattice_size)
    }

    fn kind(&self) -> BoundaryKind {
        BoundaryKind::Open
    }

    fn size(&self) -> usize {
        self.size
    }

    fn candidate_target(&self, site: SiteIndex, direction: Direction) -> TargetKind {
        if site >= self.size {
            return TargetKind::Blocked;
        }
        match direction {
            Direction::Right if site == self.last_site() => TargetKind::ReservoirExit,
            Direction::Right => TargetKind::InBounds(site + 1),
            Direction::Left if site == 0 => TargetKind::ReservoirEntryPoint,
            Direction::Left => TargetKind::InBounds(site - 1),
        }
    }

    fn has_reservoirs(&self) -> bool {
        true
    }

    fn entry_target(&self) -> Option<SiteIndex> {
        (self.size > 0).then_some(0)
    }

    fn bond_count(&self) -> usize {
        // Interior bonds plus the entry and exit bonds
        self.size + 1
    }

    fn site_position(&self, site: SiteIndex) -> Vec2 {
        line_position(site, self.size)
    }

    fn reservoir_position(&self, reservoir: Endpoint) -> Option<Vec2> {
        let offset = Vec2::new(RESERVOIR_OFFSET * SITE_SPACING, 0.0);
        match reservoir {
            Endpoint::EntryReservoir => Some(self.site_position(0) - offset),
            Endpoint::ExitReservoir => Some(self.site_position(self.last_site()) + offset),
            Endpoint::Site(_) => None,
        }
    }

    fn path(&self, transition: &Transition) -> PathShape {
        let from = self.endpoint_position(transition.from);
        let to = self.endpoint_position(transition.to);
        if transition.from.is_reservoir() || transition.to.is_reservoir() {
            PathShape::portal(from, to)
        } else {
            PathShape::line(from, to)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_right_exit_at_last_site() {
        let open = Open::new(5);
        assert_eq!(open.candidate_target(4, Direction::Right), TargetKind::ReservoirExit);
        assert!(open.exits_at(4));
        assert!(!open.exits_at(3));
    }

    #[test]
    fn test_no_left_exit() {
        let open = Open::new(5);
        assert_eq!(
            open.candidate_target(0, Direction::Left),
            TargetKind::ReservoirEntryPoint
        );
        assert_eq!(open.candidate_target(1, Direction::Left), TargetKind::InBounds(0));
    }

    #[test]
    fn test_entry_target_is_site_zero() {
        let open = Open::new(5);
        assert_eq!(open.entry_target(), Some(0));
    }

    #[test]
    fn test_reservoir_paths_are_portals() {
        let open = Open::new(5);
        let exit = open.path(&Transition::exit(4));
        let entry = open.path(&Transition::entry(0));
        assert!(matches!(exit, PathShape::Portal { .. }));
        assert!(matches!(entry, PathShape::Portal { .. }));
        assert!(matches!(open.path(&Transition::hop(1, 2)), PathShape::Line { .. }));

        let exit_anchor = open.reservoir_position(Endpoint::ExitReservoir).unwrap();
        assert!(exit.end().distance(exit_anchor) < 1e-4);
        assert!(exit_anchor.x > open.site_position(4).x);
        let entry_anchor = open.reservoir_position(Endpoint::EntryReservoir).unwrap();
        assert!(entry_anchor.x < open.site_position(0).x);
    }
}
