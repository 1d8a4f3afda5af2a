//! Owned priority queue of armed events
//!
//! Events are plain values ordered by fire time, ties broken by the order
//! they were armed. Cancellation is lazy: whoever armed an event keeps its
//! token, dropping the token cancels it, and a popped event whose token is
//! no longer held is stale and ignored. Clearing the queue cancels
//! everything at once.

use ordered_float::OrderedFloat;
use std::cmp::{Ordering, Reverse};
use std::collections::BinaryHeap;

use crate::core::types::{ParticleId, SimTime};

/// Handle to one armed event
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct EventToken(u64);

/// What an event does when it fires
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventKind {
    /// A particle attempts a hop or an exit
    Jump(ParticleId),
    /// The source reservoir attempts to feed site 0
    Entry,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScheduledEvent {
    pub fire_time: OrderedFloat<SimTime>,
    pub token: EventToken,
    pub kind: EventKind,
}

impl ScheduledEvent {
    pub fn time(&self) -> SimTime {
        self.fire_time.into_inner()
    }
}

impl Ord for ScheduledEvent {
    fn cmp(&self, other: &Self) -> Ordering {
        self.fire_time
            .cmp(&other.fire_time)
            .then_with(|| self.token.cmp(&other.token))
    }
}

impl PartialOrd for ScheduledEvent {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

#[derive(Debug, Default)]
pub struct EventQueue {
    heap: BinaryHeap<Reverse<ScheduledEvent>>,
    next_seq: u64,
}

impl EventQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Arm an event and return its token
    pub fn push(&mut self, fire_time: SimTime, kind: EventKind) -> EventToken {
        let token = EventToken(self.next_seq);
        self.next_seq += 1;
        self.heap.push(Reverse(ScheduledEvent {
            fire_time: OrderedFloat(fire_time),
            token,
            kind,
        }));
        token
    }

    /// Fire time of the earliest armed event, live or stale
    pub fn peek_time(&self) -> Option<SimTime> {
        self.heap.peek().map(|Reverse(ev)| ev.time())
    }

    /// Pop the earliest event if it is due at `now`
    pub fn pop_due(&mut self, now: SimTime) -> Option<ScheduledEvent> {
        match self.heap.peek() {
            Some(Reverse(ev)) if ev.time() <= now => self.heap.pop().map(|Reverse(ev)| ev),
            _ => None,
        }
    }

    /// Drop every event for which `keep` returns false
    pub fn retain<F>(&mut self, mut keep: F)
    where
        F: FnMut(&ScheduledEvent) -> bool,
    {
        self.heap.retain(|Reverse(ev)| keep(ev));
    }

    pub fn len(&self) -> usize {
        self.heap.len()
    }

    pub fn is_empty(&self) -> bool {
        self.heap.is_empty()
    }

    /// Cancel every armed event
    pub fn clear(&mut self) {
        self.heap.clear();
    }
}
