//! Shell-side log of what the simulation did

use std::collections::VecDeque;

use crate::core::types::SimTime;
use crate::simulation::{SimEvent, SimEventKind};

/// Maximum log entries to keep
const MAX_LOG_ENTRIES: usize = 50;

/// An entry in the event log
#[derive(Debug, Clone)]
pub struct LogEntry {
    pub time: SimTime,
    pub message: String,
    pub category: LogCategory,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogCategory {
    /// Hops, entries and exits
    Dynamics,
    /// Clicks
    Manual,
    /// Pause, resume, reset
    System,
}

impl LogCategory {
    pub fn of(kind: &SimEventKind) -> Self {
        match kind {
            SimEventKind::Hop { .. } | SimEventKind::Entered { .. } | SimEventKind::Exited { .. } => {
                LogCategory::Dynamics
            }
            SimEventKind::Added { .. } | SimEventKind::Removed { .. } => LogCategory::Manual,
            SimEventKind::Paused | SimEventKind::Resumed | SimEventKind::Reset => LogCategory::System,
        }
    }
}

/// Bounded log shown by the interactive shell
#[derive(Debug)]
pub struct EventLog {
    entries: VecDeque<LogEntry>,
    /// Whether hops are kept; they quickly drown everything else
    pub show_dynamics: bool,
}

impl Default for EventLog {
    fn default() -> Self {
        Self::new()
    }
}

impl EventLog {
    pub fn new() -> Self {
        Self {
            entries: VecDeque::with_capacity(MAX_LOG_ENTRIES),
            show_dynamics: true,
        }
    }

    /// Add an entry, dropping the oldest when full
    pub fn log(&mut self, time: SimTime, message: String, category: LogCategory) {
        if category == LogCategory::Dynamics && !self.show_dynamics {
            return;
        }
        if self.entries.len() >= MAX_LOG_ENTRIES {
            self.entries.pop_front();
        }
        self.entries.push_back(LogEntry {
            time,
            message,
            category,
        });
    }

    pub fn record(&mut self, events: impl IntoIterator<Item = SimEvent>) {
        for event in events {
            self.log(event.time, event.describe(), LogCategory::of(&event.kind));
        }
    }

    /// The `n` newest entries, oldest first
    pub fn recent(&self, n: usize) -> impl Iterator<Item = &LogEntry> + '_ {
        self.entries.iter().skip(self.entries.len().saturating_sub(n))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}
