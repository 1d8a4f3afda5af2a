//! Visual sub-state of a transition

use serde::{Deserialize, Serialize};

use crate::core::types::Transition;

/// Where a particle is in its current transition.
///
/// Progress inside each variant is local to that phase and runs 0 -> 1.
/// Logical state does not change until `Exiting` completes.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub enum JumpPhase {
    #[default]
    Idle,
    /// Shrinking on the origin
    Entering { transition: Transition, progress: f64 },
    /// Travelling along the path between origin and destination
    Inside { transition: Transition, progress: f64 },
    /// Growing on the destination
    Exiting { transition: Transition, progress: f64 },
}

impl JumpPhase {
    pub fn is_idle(&self) -> bool {
        matches!(self, JumpPhase::Idle)
    }

    pub fn transition(&self) -> Option<Transition> {
        match self {
            JumpPhase::Idle => None,
            JumpPhase::Entering { transition, .. }
            | JumpPhase::Inside { transition, .. }
            | JumpPhase::Exiting { transition, .. } => Some(*transition),
        }
    }

    /// Local progress of the current phase
    pub fn local_progress(&self) -> f64 {
        match self {
            JumpPhase::Idle => 0.0,
            JumpPhase::Entering { progress, .. }
            | JumpPhase::Inside { progress, .. }
            | JumpPhase::Exiting { progress, .. } => *progress,
        }
    }

    /// Progress over the whole transition.
    ///
    /// Entering covers [0, 0.5), Exiting covers [0.5, 1]. Inside holds at
    /// 0.5 while its own sub-progress runs.
    pub fn overall_progress(&self) -> f64 {
        match self {
            JumpPhase::Idle => 0.0,
            JumpPhase::Entering { progress, .. } => 0.5 * progress,
            JumpPhase::Inside { .. } => 0.5,
            JumpPhase::Exiting { progress, .. } => 0.5 + 0.5 * progress,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            JumpPhase::Idle => "idle",
            JumpPhase::Entering { .. } => "entering",
            JumpPhase::Inside { .. } => "inside",
            JumpPhase::Exiting { .. } => "exiting",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_overall_progress_is_monotonic_across_phases() {
        let t = Transition::hop(0, 1);
        let seq = [
            JumpPhase::Entering { transition: t, progress: 0.0 },
            JumpPhase::Entering { transition: t, progress: 0.6 },
            JumpPhase::Inside { transition: t, progress: 0.3 },
            JumpPhase::Inside { transition: t, progress: 0.9 },
            JumpPhase::Exiting { transition: t, progress: 0.2 },
            JumpPhase::Exiting { transition: t, progress: 1.0 },
        ];
        let values: Vec<f64> = seq.iter().map(|p| p.overall_progress()).collect();
        assert!(values.windows(2).all(|w| w[0] <= w[1]));
        assert_eq!(values[5], 1.0);
    }

    #[test]
    fn test_idle_has_no_transition() {
        assert!(JumpPhase::Idle.is_idle());
        assert!(JumpPhase::Idle.transition().is_none());
        let t = Transition::exit(4);
        let phase = JumpPhase::Inside { transition: t, progress: 0.1 };
        assert_eq!(phase.transition(), Some(t));
        assert_eq!(phase.name(), "inside");
    }
}
