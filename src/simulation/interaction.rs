//! Host-facing interaction types
//!
//! Clicks arrive already resolved to a site or reservoir (see
//! `BoundaryPolicy::hit_test`); actions arrive by command name.

use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::core::error::AsepError;
use crate::core::types::{Endpoint, ParticleId, SiteIndex};

/// What a click landed on
pub type ClickTarget = Endpoint;

/// Result of a click
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ClickOutcome {
    /// A particle was created on a vacant site
    Added { particle: ParticleId, site: SiteIndex },
    /// An idle particle was taken off its site
    Removed { particle: ParticleId, site: SiteIndex },
    /// A manual reservoir entry began
    EntryStarted,
    /// A manual reservoir exit began for this particle
    ExitStarted { particle: ParticleId },
    /// The click would have broken exclusion, or hit a moving particle
    Rejected,
    /// Nothing under the pointer
    Missed,
}

/// Named commands the host can send
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Action {
    /// Re-run initialize with the current parameters
    ResetSimulation,
    TogglePause,
}

impl Action {
    pub fn name(&self) -> &'static str {
        match self {
            Action::ResetSimulation => "reset-simulation",
            Action::TogglePause => "toggle-pause",
        }
    }
}

impl FromStr for Action {
    type Err = AsepError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "reset-simulation" | "reset" => Ok(Action::ResetSimulation),
            "toggle-pause" | "pause" => Ok(Action::TogglePause),
            other => Err(AsepError::UnknownAction(other.to_string())),
        }
    }
}
