//! Core type definitions used throughout the codebase

use serde::{Deserialize, Serialize};
use std::fmt;

/// Index of a lattice site in `[0, N)`
pub type SiteIndex = usize;

/// Simulated time in seconds
pub type SimTime = f64;

/// Unique identifier for particles
///
/// Ids are handed out by the registry in increasing order and never reused
/// within one registry lifetime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ParticleId(pub u32);

impl fmt::Display for ParticleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Hop direction along the lattice
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    Right,
    Left,
}

impl Direction {
    pub fn opposite(&self) -> Self {
        match self {
            Direction::Right => Direction::Left,
            Direction::Left => Direction::Right,
        }
    }
}

/// One end of a transition: a lattice site or one of the virtual reservoirs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Endpoint {
    Site(SiteIndex),
    /// Source reservoir feeding site 0 (Open only)
    EntryReservoir,
    /// Sink reservoir draining site N-1 (Open only)
    ExitReservoir,
}

impl Endpoint {
    pub fn site(&self) -> Option<SiteIndex> {
        match self {
            Endpoint::Site(site) => Some(*site),
            _ => None,
        }
    }

    pub fn is_reservoir(&self) -> bool {
        !matches!(self, Endpoint::Site(_))
    }
}

/// A logical transition accepted by the scheduler and awaiting commit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transition {
    pub from: Endpoint,
    pub to: Endpoint,
}

impl Transition {
    pub fn hop(from: SiteIndex, to: SiteIndex) -> Self {
        Self {
            from: Endpoint::Site(from),
            to: Endpoint::Site(to),
        }
    }

    pub fn exit(from: SiteIndex) -> Self {
        Self {
            from: Endpoint::Site(from),
            to: Endpoint::ExitReservoir,
        }
    }

    pub fn entry(to: SiteIndex) -> Self {
        Self {
            from: Endpoint::EntryReservoir,
            to: Endpoint::Site(to),
        }
    }

    pub fn is_entry(&self) -> bool {
        self.from == Endpoint::EntryReservoir
    }

    pub fn is_exit(&self) -> bool {
        self.to == Endpoint::ExitReservoir
    }
}
