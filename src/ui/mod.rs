//! UI state for the interactive shell

pub mod state;

pub use state::{EventLog, LogCategory, LogEntry};
