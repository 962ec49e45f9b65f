//! Trip replay
//!
//! Turns a day of trips into a bucketed occupancy trajectory:
//! - `events`: filtering and deterministic merge of trip halves
//! - `replay`: sequential clamped replay and bucket sampling

pub mod events;
pub mod replay;

pub use events::{EventKind, EventStream, StationEvent, TripFilterStats};
pub use replay::{ReplayDiagnostics, ReplayOutcome, StateSimulator};
