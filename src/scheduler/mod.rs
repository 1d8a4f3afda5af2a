//! Event scheduling for the exclusion process

pub mod jump;
pub mod queue;

pub use jump::{FireOutcome, JumpScheduler, MoveChoice, RateParams, Rejection};
pub use queue::{EventKind, EventQueue, EventToken, ScheduledEvent};
