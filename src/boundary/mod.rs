//! Boundary policies
//!
//! A boundary policy is the only place that knows the shape of the lattice:
//! a walled line, a ring, or a line with reservoirs at its ends. The
//! scheduler and the interpolator ask it where a hop leads and how the hop
//! looks, and never branch on the concrete variant themselves.

pub mod circular;
pub mod closed;
pub mod geometry;
pub mod open;

use glam::Vec2;

use crate::core::config::{BoundaryKind, SimulationParams};
use crate::core::types::{Direction, Endpoint, SiteIndex, Transition};
use crate::lattice::Lattice;

pub use circular::Circular;
pub use closed::Closed;
pub use geometry::PathShape;
pub use open::Open;

use geometry::{RESERVOIR_HIT_RADIUS, SITE_HIT_RADIUS};

/// Where a hop from a site in a given direction would lead
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TargetKind {
    /// A regular site; legal only if it is available at fire time
    InBounds(SiteIndex),
    /// A wall: the hop can never happen
    Blocked,
    /// Off the end of the lattice into the sink reservoir
    ReservoirExit,
    /// Off the start of the lattice where the source reservoir feeds in;
    /// particles cannot leave through it
    ReservoirEntryPoint,
}

impl TargetKind {
    pub fn site(&self) -> Option<SiteIndex> {
        match self {
            TargetKind::InBounds(site) => Some(*site),
            _ => None,
        }
    }
}

/// Geometry and neighbourhood rules of a lattice
pub trait BoundaryPolicy: std::fmt::Debug {
    /// Build the policy for a parameter set
    fn from_params(params: &SimulationParams) -> Self
    where
        Self: Sized;

    fn kind(&self) -> BoundaryKind;

    /// Number of sites N
    fn size(&self) -> usize;

    /// Candidate target of a hop; says nothing about occupancy
    fn candidate_target(&self, site: SiteIndex, direction: Direction) -> TargetKind;

    fn has_reservoirs(&self) -> bool {
        false
    }

    /// Site a reservoir entry lands on
    fn entry_target(&self) -> Option<SiteIndex> {
        None
    }

    /// Whether an entry could be accepted right now
    fn is_entry_legal(&self, lattice: &Lattice) -> bool {
        self.entry_target()
            .map(|site| lattice.is_available(site))
            .unwrap_or(false)
    }

    /// Whether a particle on `site` competes for the exit rate
    fn exits_at(&self, site: SiteIndex) -> bool {
        self.candidate_target(site, Direction::Right) == TargetKind::ReservoirExit
    }

    /// Number of bonds a particle current flows through
    fn bond_count(&self) -> usize;

    /// Centre of a site in lattice units
    fn site_position(&self, site: SiteIndex) -> Vec2;

    /// Anchor of a reservoir, if this lattice has one
    fn reservoir_position(&self, _reservoir: Endpoint) -> Option<Vec2> {
        None
    }

    fn endpoint_position(&self, endpoint: Endpoint) -> Vec2 {
        match endpoint {
            Endpoint::Site(site) => self.site_position(site),
            reservoir => self
                .reservoir_position(reservoir)
                .unwrap_or_else(|| self.site_position(0)),
        }
    }

    /// Path followed while a transition is `Inside`
    fn path(&self, transition: &Transition) -> PathShape;

    /// Map a point in lattice units to the site or reservoir under it
    fn hit_test(&self, point: Vec2) -> Option<Endpoint> {
        for reservoir in [Endpoint::EntryReservoir, Endpoint::ExitReservoir] {
            if let Some(anchor) = self.reservoir_position(reservoir) {
                if anchor.distance(point) <= RESERVOIR_HIT_RADIUS {
                    return Some(reservoir);
                }
            }
        }
        (0..self.size())
            .map(|site| (site, self.site_position(site).distance(point)))
            .filter(|(_, d)| *d <= SITE_HIT_RADIUS)
            .min_by(|a, b| a.1.total_cmp(&b.1))
            .map(|(site, _)| Endpoint::Site(site))
    }

    /// Axis-aligned bounds of every site and anchor, in lattice units
    fn bounds(&self) -> (Vec2, Vec2) {
        let mut min = Vec2::splat(f32::MAX);
        let mut max = Vec2::splat(f32::MIN);
        let anchors = [Endpoint::EntryReservoir, Endpoint::ExitReservoir]
            .into_iter()
            .filter_map(|r| self.reservoir_position(r));
        for p in (0..self.size()).map(|s| self.site_position(s)).chain(anchors) {
            min = min.min(p);
            max = max.max(p);
        }
        if min.x > max.x {
            return (Vec2::ZERO, Vec2::ZERO);
        }
        (min, max)
    }
}

/// Tagged union over the three lattice shapes
#[derive(Debug, Clone, PartialEq)]
pub enum Boundary {
    Closed(Closed),
    Circular(Circular),
    Open(Open),
}

impl Boundary {
    pub fn new(kind: BoundaryKind, size: usize) -> Self {
        match kind {
            BoundaryKind::Closed => Boundary::Closed(Closed::new(size)),
            BoundaryKind::Circular => Boundary::Circular(Circular::new(size)),
            BoundaryKind::Open => Boundary::Open(Open::new(size)),
        }
    }

    fn policy(&self) -> &dyn BoundaryPolicy {
        match self {
            Boundary::Closed(b) => b,
            Boundary::Circular(b) => b,
            Boundary::Open(b) => b,
        }
    }
}

impl BoundaryPolicy for Boundary {
    fn from_params(params: &SimulationParams) -> Self {
        Boundary::new(params.boundary, params.lattice_size)
    }

    fn kind(&self) -> BoundaryKind {
        self.policy().kind()
    }

    fn size(&self) -> usize {
        self.policy().size()
    }

    fn candidate_target(&self, site: SiteIndex, direction: Direction) -> TargetKind {
        self.policy().candidate_target(site, direction)
    }

    fn has_reservoirs(&self) -> bool {
        self.policy().has_reservoirs()
    }

    fn entry_target(&self) -> Option<SiteIndex> {
        self.policy().entry_target()
    }

    fn bond_count(&self) -> usize {
        self.policy().bond_count()
    }

    fn site_position(&self, site: SiteIndex) -> Vec2 {
        self.policy().site_position(site)
    }

    fn reservoir_position(&self, reservoir: Endpoint) -> Option<Vec2> {
        self.policy().reservoir_position(reservoir)
    }

    fn path(&self, transition: &Transition) -> PathShape {
        self.policy().path(transition)
    }
}
