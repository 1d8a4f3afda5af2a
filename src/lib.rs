//! ASEP Sim - Continuous-time asymmetric simple exclusion process

pub mod animation;
pub mod boundary;
pub mod core;
pub mod lattice;
pub mod render;
pub mod scheduler;
pub mod simulation;
pub mod ui;
