//! Greedy midnight allocation optimizer
//!
//! # Algorithm
//!
//! ```text
//! x0 = proportional apportionment of the fleet by capacity
//! loop until converged or move cap:
//!     for every station: add_delta    = cost(x+1) - cost(x)   (if not full)
//!                        remove_delta = cost(x-1) - cost(x)   (if not empty)
//!     pick donor d, receiver r != d minimizing remove_delta[d] + add_delta[r]
//!     if the sum is strictly negative: move one bike d → r, refresh d and r
//!     else: converged
//! ```
//!
//! # Critical Invariants
//!
//! 1. **Fleet Conservation**: `Σ x0` never changes (paired swaps only)
//! 2. **Bounds**: `0 <= x0[s] <= capacity[s]` after every swap
//! 3. **Monotonicity**: every accepted swap strictly lowers total cost, so
//!    `final_cost <= initial_cost`
//! 4. **Determinism**: identical inputs give an identical move sequence

use crate::core::config::{ConfigError, ScenarioConfig};
use crate::costs::{CostModel, CostParameters};
use crate::flows::NetFlowSeries;
use crate::models::allocation::Allocation;
use crate::models::station::StationRegistry;
use crate::optimizer::context::{SearchContext, IMPROVEMENT_EPSILON};
use serde::Serialize;
use std::collections::BTreeMap;
use tracing::{debug, info, warn};

/// Lower bound of the default move cap
pub const DEFAULT_MIN_MOVE_CAP: usize = 1000;

/// One accepted move, by station id
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SwapMove {
    pub donor: String,
    pub receiver: String,
    /// Change in total cost caused by this move (negative)
    pub cost_change: f64,
}

/// Outcome of one optimization run, retained as audit metadata
#[derive(Debug, Clone, PartialEq)]
pub struct OptimizationResult {
    /// Final midnight allocation (registry order)
    pub allocation: Allocation,
    /// Fleet size (constant throughout the run)
    pub total_bikes: u64,
    pub initial_cost: f64,
    pub final_cost: f64,
    /// Accepted moves in order
    pub moves: Vec<SwapMove>,
    /// False when the move cap stopped the search while improvements remained
    pub converged: bool,
    /// Move cap in force for this run
    pub max_moves: usize,
    pub params: CostParameters,
    pub bucket_minutes: u32,
}

impl OptimizationResult {
    pub fn move_count(&self) -> usize {
        self.moves.len()
    }

    /// Final counts keyed by station id
    pub fn bikes_by_station(&self, registry: &StationRegistry) -> BTreeMap<String, u32> {
        self.allocation.to_map(registry)
    }

    /// Cost removed by the search (never negative)
    pub fn improvement(&self) -> f64 {
        self.initial_cost - self.final_cost
    }
}

/// Greedy 1-bike swap search for the midnight allocation
///
/// # Example
/// ```
/// use midnight_rebalance_core_rs::{
///     CostParameters, MidnightOptimizer, NetFlowSeries, Station, StationRegistry, TimeBucketer,
/// };
///
/// let registry = StationRegistry::new(vec![
///     Station::new("A", 10).unwrap(),
///     Station::new("B", 10).unwrap(),
/// ]);
/// let flows = NetFlowSeries::from_station_deltas(
///     &registry,
///     TimeBucketer::new(60).unwrap(),
///     [("A", vec![-1.0; 4]), ("B", vec![1.0; 4])],
/// );
/// let params = CostParameters { empty_thr: 0.2, full_thr: 0.8, w_empty: 1.0, w_full: 1.0 };
///
/// let optimizer = MidnightOptimizer::new(params).unwrap();
/// let result = optimizer.optimize(&registry, &flows, 10);
///
/// assert!(result.allocation.get(0) > 5); // A received bikes
/// assert_eq!(result.allocation.total(), 10);
/// assert!(result.final_cost < result.initial_cost);
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MidnightOptimizer {
    model: CostModel,
    max_moves: Option<usize>,
}

impl MidnightOptimizer {
    /// Create an optimizer with the default move cap
    pub fn new(params: CostParameters) -> Result<Self, ConfigError> {
        Ok(Self {
            model: CostModel::new(params)?,
            max_moves: None,
        })
    }

    /// Create an optimizer from a validated scenario configuration
    pub fn from_config(config: &ScenarioConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self::new(config.cost)?.with_max_moves(config.max_moves))
    }

    /// Override the move cap (None = max(1000, fleet size))
    pub fn with_max_moves(mut self, max_moves: Option<usize>) -> Self {
        self.max_moves = max_moves;
        self
    }

    pub fn model(&self) -> &CostModel {
        &self.model
    }

    /// Optimize starting from the proportional allocation of `total_bikes`
    pub fn optimize(
        &self,
        registry: &StationRegistry,
        flows: &NetFlowSeries,
        total_bikes: u64,
    ) -> OptimizationResult {
        let initial = Allocation::proportional(registry, total_bikes);
        self.optimize_from(registry, flows, initial)
    }

    /// Optimize starting from an arbitrary allocation
    ///
    /// # Panics
    /// If `flows` or `initial` were built for a different registry.
    pub fn optimize_from(
        &self,
        registry: &StationRegistry,
        flows: &NetFlowSeries,
        initial: Allocation,
    ) -> OptimizationResult {
        assert_eq!(flows.len(), registry.len(), "flows must match registry");
        assert_eq!(initial.len(), registry.len(), "allocation must match registry");

        let total_bikes = initial.total();
        let max_moves = self
            .max_moves
            .unwrap_or_else(|| DEFAULT_MIN_MOVE_CAP.max(total_bikes as usize));

        let mut context = SearchContext::new(&self.model, registry, flows, initial);
        let initial_cost = context.total_cost();

        let mut converged = false;
        while context.swaps().len() < max_moves {
            match context.step(&self.model, flows) {
                Some(swap) => debug!(
                    donor = registry.station(swap.donor).id(),
                    receiver = registry.station(swap.receiver).id(),
                    cost_change = swap.cost_change,
                    "applied swap"
                ),
                None => {
                    converged = true;
                    break;
                }
            }
        }
        if !converged {
            // Cap reached exactly at a local optimum still counts as converged
            converged = context
                .best_swap()
                .map_or(true, |swap| swap.cost_change >= -IMPROVEMENT_EPSILON);
        }

        let (allocation, cache, swaps) = context.into_parts();
        let final_cost = cache.total_cost();

        if converged {
            info!(
                stations = registry.len(),
                total_bikes,
                moves = swaps.len(),
                initial_cost,
                final_cost,
                "midnight optimization converged"
            );
        } else {
            warn!(
                max_moves,
                initial_cost,
                final_cost,
                "midnight optimization stopped at move cap before converging"
            );
        }

        let moves = swaps
            .iter()
            .map(|swap| SwapMove {
                donor: registry.station(swap.donor).id().to_string(),
                receiver: registry.station(swap.receiver).id().to_string(),
                cost_change: swap.cost_change,
            })
            .collect();

        OptimizationResult {
            allocation,
            total_bikes,
            initial_cost,
            final_cost,
            moves,
            converged,
            max_moves,
            params: *self.model.params(),
            bucket_minutes: flows.bucketer().bucket_minutes(),
        }
    }
}
