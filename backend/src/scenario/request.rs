//! JSON request/response boundary
//!
//! One JSON document in, one out. Writing the rows to a file stays with the
//! host application.

use crate::core::config::ScenarioConfig;
use crate::models::station::{StationRecord, StationRegistry};
use crate::models::trip::TripEvent;
use crate::scenario::{
    OccupancyRecord, Scenario, ScenarioAssembler, ScenarioError, ScenarioMetadata, ScenarioMode,
};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Inputs of one scenario run
///
/// `days` is only used in midnight mode: when non-empty the optimizer
/// averages their flows instead of using `trips`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ScenarioRequest {
    #[serde(default)]
    pub config: ScenarioConfig,
    pub stations: Vec<StationRecord>,
    /// Trips of the visualization day
    pub trips: Vec<TripEvent>,
    #[serde(default)]
    pub days: BTreeMap<NaiveDate, Vec<TripEvent>>,
}

/// Output of one scenario run
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScenarioResponse {
    pub metadata: ScenarioMetadata,
    pub allocation: BTreeMap<String, u32>,
    pub records: Vec<OccupancyRecord>,
}

impl ScenarioRequest {
    /// Parse a request from JSON
    pub fn from_json(json: &str) -> Result<Self, ScenarioError> {
        serde_json::from_str(json)
            .map_err(|e| ScenarioError::Serialization(format!("Invalid scenario request: {}", e)))
    }

    /// Build the registry and run the scenario in `mode`
    pub fn run(&self, mode: ScenarioMode) -> Result<ScenarioResponse, ScenarioError> {
        let registry = StationRegistry::from_records(self.stations.iter().cloned());
        let assembler = ScenarioAssembler::new(&registry, self.config.clone())?;

        let scenario: Scenario = match mode {
            ScenarioMode::Baseline => assembler.baseline(&self.trips)?,
            ScenarioMode::Midnight if self.days.is_empty() => assembler.midnight(&self.trips)?,
            ScenarioMode::Midnight => assembler.midnight_multi_day(&self.trips, &self.days)?,
        };

        Ok(ScenarioResponse {
            allocation: scenario.allocation.to_map(&registry),
            records: scenario.records(),
            metadata: scenario.metadata,
        })
    }
}

impl ScenarioResponse {
    pub fn to_json(&self) -> Result<String, ScenarioError> {
        serde_json::to_string(self)
            .map_err(|e| ScenarioError::Serialization(format!("Response encoding failed: {}", e)))
    }
}

/// Parse, run and encode in one call
pub fn run_json(request_json: &str, mode: ScenarioMode) -> Result<String, ScenarioError> {
    ScenarioRequest::from_json(request_json)?.run(mode)?.to_json()
}
