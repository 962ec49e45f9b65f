//! Scenario assembly
//!
//! Composes a midnight allocation with one replay of the visualization day:
//!
//! ```text
//! baseline: proportional allocation ─────────────────────────────┐
//! midnight: trips → net flows → optimizer → allocation ──────────┤
//!                                                                 ▼
//!                                   replay(visualization day) → Scenario
//! ```

use crate::core::config::ScenarioConfig;
use crate::core::time::TimeBucketer;
use crate::costs::CostModel;
use crate::flows::NetFlowEstimator;
use crate::models::allocation::Allocation;
use crate::models::station::StationRegistry;
use crate::models::trip::TripEvent;
use crate::optimizer::{MidnightOptimizer, OptimizationResult};
use crate::scenario::fingerprint::canonical_digest;
use crate::scenario::{
    OptimizationSummary, Scenario, ScenarioError, ScenarioMetadata, ScenarioMode,
};
use crate::simulation::StateSimulator;
use chrono::NaiveDate;
use serde::Serialize;
use std::collections::BTreeMap;
use tracing::info;

/// Everything that determines a scenario's output
#[derive(Serialize)]
struct DigestInput<'a> {
    config: &'a ScenarioConfig,
    mode: ScenarioMode,
    allocation: BTreeMap<String, u32>,
    days: &'a [NaiveDate],
    trips_accepted: usize,
}

/// Builds baseline and midnight scenarios over one registry
///
/// # Example
/// ```
/// use midnight_rebalance_core_rs::{
///     ScenarioAssembler, ScenarioConfig, ScenarioMode, Station, StationRegistry, TripEvent,
/// };
///
/// let registry = StationRegistry::new(vec![
///     Station::new("A", 10).unwrap(),
///     Station::new("B", 10).unwrap(),
/// ]);
/// let trips = vec![TripEvent::new(480, "A", 500, "B")];
/// let config = ScenarioConfig {
///     bucket_minutes: 60,
///     total_bikes_ratio: 0.5,
///     ..Default::default()
/// };
///
/// let assembler = ScenarioAssembler::new(&registry, config).unwrap();
/// let baseline = assembler.baseline(&trips).unwrap();
///
/// assert_eq!(baseline.metadata.mode, ScenarioMode::Baseline);
/// assert_eq!(baseline.records().len(), 2 * 24);
/// ```
#[derive(Debug, Clone)]
pub struct ScenarioAssembler<'a> {
    registry: &'a StationRegistry,
    config: ScenarioConfig,
    bucketer: TimeBucketer,
    cost_model: CostModel,
}

impl<'a> ScenarioAssembler<'a> {
    /// Validate `config` and bind it to `registry`
    pub fn new(
        registry: &'a StationRegistry,
        config: ScenarioConfig,
    ) -> Result<Self, ScenarioError> {
        config.validate()?;
        let bucketer = config.bucketer()?;
        let cost_model = CostModel::new(config.cost)?;
        Ok(Self {
            registry,
            config,
            bucketer,
            cost_model,
        })
    }

    pub fn config(&self) -> &ScenarioConfig {
        &self.config
    }

    /// Fleet size for this registry and configuration
    pub fn fleet_size(&self) -> u64 {
        self.config.fleet_size(self.registry.total_capacity())
    }

    /// Replay the day from a proportional allocation
    pub fn baseline(&self, trips: &[TripEvent]) -> Result<Scenario, ScenarioError> {
        let allocation = Allocation::proportional(self.registry, self.fleet_size());
        let name = match self.config.total_bikes {
            Some(total) => format!("Baseline ({} bikes)", total),
            None => format!("Baseline ({:.0}%)", self.config.total_bikes_ratio * 100.0),
        };
        self.assemble(name, ScenarioMode::Baseline, allocation, None, Vec::new(), trips)
    }

    /// Optimize the midnight allocation against the same day, then replay it
    pub fn midnight(&self, trips: &[TripEvent]) -> Result<Scenario, ScenarioError> {
        let flows = NetFlowEstimator::new(self.bucketer).estimate_day(self.registry, trips);
        let result = self
            .optimizer()?
            .optimize(self.registry, &flows.series, self.fleet_size());
        self.from_optimization(result, Vec::new(), trips)
    }

    /// Optimize against the mean flows of several days, then replay one day
    pub fn midnight_multi_day(
        &self,
        visualization_trips: &[TripEvent],
        days: &BTreeMap<NaiveDate, Vec<TripEvent>>,
    ) -> Result<Scenario, ScenarioError> {
        let flows = NetFlowEstimator::new(self.bucketer).estimate_days(self.registry, days)?;
        let result = self
            .optimizer()?
            .optimize(self.registry, &flows.series, self.fleet_size());
        self.from_optimization(result, flows.days, visualization_trips)
    }

    /// Package an optimizer result computed elsewhere
    ///
    /// # Errors
    /// The result must cover this registry and use this bucket width.
    pub fn from_optimization(
        &self,
        result: OptimizationResult,
        days: Vec<NaiveDate>,
        trips: &[TripEvent],
    ) -> Result<Scenario, ScenarioError> {
        if result.allocation.len() != self.registry.len() {
            return Err(ScenarioError::RegistryMismatch {
                expected: self.registry.len(),
                actual: result.allocation.len(),
            });
        }
        if result.bucket_minutes != self.bucketer.bucket_minutes() {
            return Err(ScenarioError::BucketMismatch {
                expected: self.bucketer.bucket_minutes(),
                actual: result.bucket_minutes,
            });
        }

        let name = if days.is_empty() {
            "Midnight optimization".to_string()
        } else {
            format!("Midnight optimization ({} days)", days.len())
        };
        let summary = OptimizationSummary::from(&result);
        self.assemble(
            name,
            ScenarioMode::Midnight,
            result.allocation,
            Some(summary),
            days,
            trips,
        )
    }

    fn optimizer(&self) -> Result<MidnightOptimizer, ScenarioError> {
        Ok(MidnightOptimizer::new(self.config.cost)?.with_max_moves(self.config.max_moves))
    }

    fn assemble(
        &self,
        name: String,
        mode: ScenarioMode,
        allocation: Allocation,
        optimization: Option<OptimizationSummary>,
        days: Vec<NaiveDate>,
        trips: &[TripEvent],
    ) -> Result<Scenario, ScenarioError> {
        let outcome = StateSimulator::new(self.bucketer).replay(self.registry, &allocation, trips);
        let replay_cost = self.cost_model.score_replay(&outcome.trajectory);

        let input_digest = canonical_digest(&DigestInput {
            config: &self.config,
            mode,
            allocation: allocation.to_map(self.registry),
            days: &days,
            trips_accepted: outcome.diagnostics.trips.trips_accepted,
        })?;

        info!(
            scenario = %name,
            mode = ?mode,
            total_bikes = allocation.total(),
            replay_cost = replay_cost.total(),
            clamps = outcome.diagnostics.total_clamps(),
            "scenario assembled"
        );

        Ok(Scenario {
            metadata: ScenarioMetadata {
                name,
                mode,
                bucket_minutes: self.bucketer.bucket_minutes(),
                total_bikes: allocation.total(),
                optimization,
                days,
                replay: outcome.diagnostics,
                replay_cost,
                input_digest,
            },
            allocation,
            trajectory: outcome.trajectory,
        })
    }
}
