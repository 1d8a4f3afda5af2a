//! Record of committed changes, for logs and displays

use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

use crate::core::types::{ParticleId, SimTime, SiteIndex};

/// Oldest entries are dropped once this many are waiting to be drained
pub const MAX_PENDING_EVENTS: usize = 1024;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum SimEventKind {
    Hop {
        particle: ParticleId,
        from: SiteIndex,
        to: SiteIndex,
    },
    Entered {
        particle: ParticleId,
        site: SiteIndex,
    },
    Exited {
        particle: ParticleId,
        site: SiteIndex,
    },
    Added {
        particle: ParticleId,
        site: SiteIndex,
    },
    Removed {
        particle: ParticleId,
        site: SiteIndex,
    },
    Paused,
    Resumed,
    Reset,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SimEvent {
    pub time: SimTime,
    pub kind: SimEventKind,
}

impl SimEvent {
    pub fn describe(&self) -> String {
        match self.kind {
            SimEventKind::Hop { particle, from, to } => {
                format!("{} hopped {} -> {}", particle, from, to)
            }
            SimEventKind::Entered { particle, site } => {
                format!("{} entered at site {}", particle, site)
            }
            SimEventKind::Exited { particle, site } => {
                format!("{} exited from site {}", particle, site)
            }
            SimEventKind::Added { particle, site } => {
                format!("{} placed on site {}", particle, site)
            }
            SimEventKind::Removed { particle, site } => {
                format!("{} removed from site {}", particle, site)
            }
            SimEventKind::Paused => "paused".to_string(),
            SimEventKind::Resumed => "resumed".to_string(),
            SimEventKind::Reset => "reset".to_string(),
        }
    }
}

/// Bounded buffer of events waiting to be drained
#[derive(Debug, Default)]
pub struct EventBuffer {
    pending: VecDeque<SimEvent>,
}

impl EventBuffer {
    pub fn push(&mut self, time: SimTime, kind: SimEventKind) {
        if self.pending.len() >= MAX_PENDING_EVENTS {
            self.pending.pop_front();
        }
        self.pending.push_back(SimEvent { time, kind });
    }

    pub fn drain(&mut self) -> Vec<SimEvent> {
        self.pending.drain(..).collect()
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    pub fn clear(&mut self) {
        self.pending.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_buffer_is_bounded() {
        let mut buffer = EventBuffer::default();
        for i in 0..(MAX_PENDING_EVENTS + 10) {
            buffer.push(i as f64, SimEventKind::Paused);
        }
        assert_eq!(buffer.len(), MAX_PENDING_EVENTS);
        let drained = buffer.drain();
        assert_eq!(drained[0].time, 10.0);
        assert!(buffer.is_empty());
    }

    #[test]
    fn test_describe() {
        let ev = SimEvent {
            time: 1.0,
            kind: SimEventKind::Hop {
                particle: ParticleId(2),
                from: 4,
                to: 0,
            },
        };
        assert_eq!(ev.describe(), "#2 hopped 4 -> 0");
    }
}
