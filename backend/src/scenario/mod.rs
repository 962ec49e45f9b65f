//! Scenarios: an allocation replayed over the visualization day
//!
//! A `Scenario` is the exposed result of the core: the occupancy trajectory
//! of every registered station plus the metadata needed to audit how it was
//! produced.

pub mod assembler;
pub mod fingerprint;
pub mod report;
pub mod request;

pub use assembler::ScenarioAssembler;
pub use fingerprint::canonical_digest;
pub use report::{occupancy_records, OccupancyRecord, StressProfile};
pub use request::{run_json, ScenarioRequest, ScenarioResponse};

use crate::core::config::ConfigError;
use crate::costs::CostBreakdown;
use crate::models::allocation::Allocation;
use crate::models::trajectory::OccupancyTrajectory;
use crate::optimizer::OptimizationResult;
use crate::simulation::ReplayDiagnostics;
use chrono::NaiveDate;
use serde::Serialize;
use thiserror::Error;

/// Errors raised while assembling a scenario
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ScenarioError {
    #[error("Invalid config: {0}")]
    Config(#[from] ConfigError),

    #[error("Optimization result covers {actual} stations, registry has {expected}")]
    RegistryMismatch { expected: usize, actual: usize },

    #[error("Optimization result used {actual}-minute buckets, scenario uses {expected}")]
    BucketMismatch { expected: u32, actual: u32 },

    #[error("Serialization error: {0}")]
    Serialization(String),
}

/// How the midnight allocation was chosen
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ScenarioMode {
    Baseline,
    Midnight,
}

/// Optimizer audit fields exported with midnight scenarios
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OptimizationSummary {
    pub initial_cost: f64,
    pub final_cost: f64,
    pub move_count: usize,
    pub converged: bool,
    pub empty_thr: f64,
    pub full_thr: f64,
    pub w_empty: f64,
    pub w_full: f64,
}

impl From<&OptimizationResult> for OptimizationSummary {
    fn from(result: &OptimizationResult) -> Self {
        OptimizationSummary {
            initial_cost: result.initial_cost,
            final_cost: result.final_cost,
            move_count: result.move_count(),
            converged: result.converged,
            empty_thr: result.params.empty_thr,
            full_thr: result.params.full_thr,
            w_empty: result.params.w_empty,
            w_full: result.params.w_full,
        }
    }
}

/// Metadata block exported alongside the occupancy rows
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScenarioMetadata {
    pub name: String,
    pub mode: ScenarioMode,
    pub bucket_minutes: u32,
    /// Bikes in the midnight allocation
    pub total_bikes: u64,
    #[serde(flatten)]
    pub optimization: Option<OptimizationSummary>,
    /// Days the optimizer averaged over (empty for single-day runs)
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub days: Vec<NaiveDate>,
    pub replay: ReplayDiagnostics,
    /// Soft-threshold cost of the replayed trajectory
    pub replay_cost: CostBreakdown,
    /// SHA-256 of the canonical scenario inputs
    pub input_digest: String,
}

/// Final exposed result: trajectory plus metadata
#[derive(Debug, Clone, PartialEq)]
pub struct Scenario {
    pub metadata: ScenarioMetadata,
    /// Midnight allocation the replay started from
    pub allocation: Allocation,
    pub trajectory: OccupancyTrajectory,
}

impl Scenario {
    /// One row per (station, bucket)
    pub fn records(&self) -> Vec<OccupancyRecord> {
        occupancy_records(&self.trajectory)
    }

    /// Empty/full station counts per bucket at the given thresholds
    pub fn stress_profile(&self, empty_thr: f64, full_thr: f64) -> StressProfile {
        StressProfile::from_trajectory(&self.trajectory, empty_thr, full_thr)
    }
}
