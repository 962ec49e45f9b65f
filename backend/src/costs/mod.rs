//! Soft-threshold cost model
//!
//! Penalizes every bucket a station spends below its empty level or above
//! its full level, proportionally to how deep it is past the threshold:
//!
//! ```text
//! empty_depth(b) = max(0, empty_thr * capacity - bikes(b))
//! full_depth(b)  = max(0, bikes(b) - full_thr * capacity)
//! cost(station)  = Σ_b w_empty * empty_depth(b) + w_full * full_depth(b)
//! ```
//!
//! A station's cost depends only on its own midnight count and its own net
//! flows. The optimizer relies on this: moving a bike between two stations
//! changes exactly two station costs.

use crate::core::config::ConfigError;
use crate::flows::NetFlowSeries;
use crate::models::allocation::Allocation;
use crate::models::station::StationRegistry;
use crate::models::trajectory::OccupancyTrajectory;
use serde::{Deserialize, Serialize};

/// Thresholds and weights of the cost function
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CostParameters {
    /// Fraction of capacity below which a station counts as emptying
    pub empty_thr: f64,
    /// Fraction of capacity above which a station counts as filling up
    pub full_thr: f64,
    /// Weight per bike of empty depth per bucket
    pub w_empty: f64,
    /// Weight per dock of full depth per bucket
    pub w_full: f64,
}

impl Default for CostParameters {
    fn default() -> Self {
        Self {
            empty_thr: 0.10,
            full_thr: 0.90,
            w_empty: 1.0,
            w_full: 1.0,
        }
    }
}

impl CostParameters {
    pub fn validate(&self) -> Result<(), ConfigError> {
        for (name, value) in [("empty_thr", self.empty_thr), ("full_thr", self.full_thr)] {
            if !(value > 0.0 && value < 1.0) {
                return Err(ConfigError::ThresholdOutOfRange { name, value });
            }
        }
        for (name, value) in [("w_empty", self.w_empty), ("w_full", self.w_full)] {
            if !(value >= 0.0) {
                return Err(ConfigError::NegativeWeight { name, value });
            }
        }
        Ok(())
    }
}

/// Cost split into its empty and full components
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct CostBreakdown {
    pub empty_cost: f64,
    pub full_cost: f64,
}

impl CostBreakdown {
    pub fn total(&self) -> f64 {
        self.empty_cost + self.full_cost
    }

    pub fn add(&mut self, other: &CostBreakdown) {
        self.empty_cost += other.empty_cost;
        self.full_cost += other.full_cost;
    }
}

/// Scores occupancy against soft empty/full thresholds
///
/// # Example
/// ```
/// use midnight_rebalance_core_rs::{CostModel, CostParameters};
///
/// let model = CostModel::new(CostParameters {
///     empty_thr: 0.2,
///     full_thr: 0.8,
///     w_empty: 1.0,
///     w_full: 1.0,
/// })
/// .unwrap();
///
/// // Capacity 10: empty level 2, full level 8
/// let cost = model.station_cost(3, 10, &[-2.0, 0.0, 7.0]);
/// // bikes per bucket: 1, 1, 8 → empty depth 1 + 1, full depth 0
/// assert!((cost - 2.0).abs() < 1e-9);
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CostModel {
    params: CostParameters,
}

impl CostModel {
    /// Create a cost model, validating its parameters
    pub fn new(params: CostParameters) -> Result<Self, ConfigError> {
        params.validate()?;
        Ok(Self { params })
    }

    pub fn params(&self) -> &CostParameters {
        &self.params
    }

    /// Occupancy implied by a midnight count and net flows
    ///
    /// Each bucket is `clamp(x0 + cumulative_delta, 0, capacity)`; the
    /// cumulative sum itself is not clamped.
    pub fn station_levels(x0: u32, capacity: u32, deltas: &[f64]) -> Vec<f64> {
        let capacity = f64::from(capacity);
        let mut cumulative = 0.0;
        deltas
            .iter()
            .map(|delta| {
                cumulative += delta;
                (f64::from(x0) + cumulative).clamp(0.0, capacity)
            })
            .collect()
    }

    /// Cost of one station given its midnight count and net flows
    pub fn station_cost(&self, x0: u32, capacity: u32, deltas: &[f64]) -> f64 {
        self.station_breakdown(x0, capacity, deltas).total()
    }

    /// Cost components of one station given its midnight count and net flows
    pub fn station_breakdown(&self, x0: u32, capacity: u32, deltas: &[f64]) -> CostBreakdown {
        let levels = Self::station_levels(x0, capacity, deltas);
        self.score_levels(capacity, levels)
    }

    /// Score an explicit sequence of per-bucket bike levels
    pub fn score_levels(
        &self,
        capacity: u32,
        levels: impl IntoIterator<Item = f64>,
    ) -> CostBreakdown {
        let capacity = f64::from(capacity);
        let empty_level = self.params.empty_thr * capacity;
        let full_level = self.params.full_thr * capacity;

        let mut breakdown = CostBreakdown::default();
        for bikes in levels {
            let empty_depth = empty_level - bikes;
            if empty_depth > 0.0 {
                breakdown.empty_cost += self.params.w_empty * empty_depth;
            }
            let full_depth = bikes - full_level;
            if full_depth > 0.0 {
                breakdown.full_cost += self.params.w_full * full_depth;
            }
        }
        breakdown
    }

    /// Network cost of an allocation under net flows
    ///
    /// Stations are summed in registry order.
    ///
    /// # Panics
    /// If the allocation or flows were built for a different registry.
    pub fn total_cost(
        &self,
        registry: &StationRegistry,
        allocation: &Allocation,
        flows: &NetFlowSeries,
    ) -> f64 {
        assert_eq!(allocation.len(), registry.len(), "allocation must match registry");
        assert_eq!(flows.len(), registry.len(), "flows must match registry");
        registry
            .iter()
            .enumerate()
            .map(|(index, station)| {
                self.station_cost(allocation.get(index), station.capacity(), flows.station(index))
            })
            .sum()
    }

    /// Score a replayed trajectory with the same thresholds and weights
    pub fn score_replay(&self, trajectory: &OccupancyTrajectory) -> CostBreakdown {
        let mut total = CostBreakdown::default();
        for station in trajectory.stations() {
            let levels = station.bikes.iter().map(|&b| f64::from(b));
            total.add(&self.score_levels(station.capacity, levels));
        }
        total
    }
}
