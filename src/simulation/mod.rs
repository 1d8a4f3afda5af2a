pub mod controller;
pub mod events;
pub mod interaction;
pub mod output;
pub mod stats;

pub use controller::SimulationController;
pub use events::{EventBuffer, SimEvent, SimEventKind};
pub use interaction::{Action, ClickOutcome, ClickTarget};
pub use output::{run_trial, RunOutput, TrialResult};
pub use stats::SimulationStats;
