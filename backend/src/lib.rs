//! Midnight Rebalance Core - Rust Engine
//!
//! Chooses how many bikes each station should hold at midnight so that the
//! following day's trips leave as few stations empty or full as possible,
//! then replays the day to show the resulting occupancy.
//!
//! # Architecture
//!
//! - **core**: Time bucketing and scenario configuration
//! - **models**: Domain types (Station, Trip, Allocation, Trajectory)
//! - **simulation**: Event-ordered trip replay with capacity clamping
//! - **flows**: Per-bucket net flow estimation (single and multi-day)
//! - **costs**: Soft-threshold empty/full cost model
//! - **optimizer**: Greedy one-bike swap search
//! - **scenario**: Baseline and midnight scenario assembly
//!
//! # Critical Invariants
//!
//! 1. Every allocation satisfies 0 <= bikes <= capacity per station
//! 2. The optimizer never changes the fleet size
//! 3. Every station is ordered by id, and all ties break towards the lowest id
//! 4. Outputs are deterministic for identical inputs
//!
//! # Example
//!
//! ```
//! use midnight_rebalance_core_rs::{
//!     ScenarioAssembler, ScenarioConfig, Station, StationRegistry, TripEvent,
//! };
//!
//! let registry = StationRegistry::new(vec![
//!     Station::new("A", 10).unwrap(),
//!     Station::new("B", 10).unwrap(),
//! ]);
//! let trips = vec![TripEvent::new(480, "A", 495, "B")];
//!
//! let assembler = ScenarioAssembler::new(&registry, ScenarioConfig::default()).unwrap();
//! let midnight = assembler.midnight(&trips).unwrap();
//!
//! assert_eq!(midnight.allocation.total(), 12);
//! assert_eq!(midnight.trajectory.bucket_count(), 96);
//! ```

// Module declarations
pub mod core;
pub mod costs;
pub mod flows;
pub mod models;
pub mod optimizer;
pub mod scenario;
pub mod simulation;

// Re-exports for convenience
pub use crate::core::{ConfigError, ScenarioConfig, TimeBucketer, MINUTES_PER_DAY};
pub use costs::{CostBreakdown, CostModel, CostParameters};
pub use flows::{DayFlows, MultiDayFlows, NetFlowEstimator, NetFlowSeries};
pub use models::{
    allocation::Allocation,
    station::{RegistryDiagnostics, Station, StationRecord, StationRegistry},
    trajectory::{OccupancyTrajectory, StationTrajectory},
    trip::{trips_by_day, TripEvent, TripRecord},
};
pub use optimizer::{MidnightOptimizer, OptimizationResult, SwapMove};
pub use scenario::{
    OccupancyRecord, OptimizationSummary, Scenario, ScenarioAssembler, ScenarioError,
    ScenarioMetadata, ScenarioMode, ScenarioRequest, ScenarioResponse, StressProfile,
};
pub use simulation::{ReplayDiagnostics, ReplayOutcome, StateSimulator, TripFilterStats};

// FFI module (when feature enabled)
#[cfg(feature = "pyo3")]
pub mod ffi;

// PyO3 exports (when feature enabled)
#[cfg(feature = "pyo3")]
use pyo3::prelude::*;

#[cfg(feature = "pyo3")]
#[pymodule]
fn midnight_rebalance_core_rs(_py: Python<'_>, m: &PyModule) -> PyResult<()> {
    m.add_function(wrap_pyfunction!(ffi::run_baseline_scenario, m)?)?;
    m.add_function(wrap_pyfunction!(ffi::run_midnight_scenario, m)?)?;
    Ok(())
}
