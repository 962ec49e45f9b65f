//! Scenario configuration and validation
//!
//! All configuration is validated up front: a run either starts with a
//! consistent configuration or fails before any replay or optimization.

use crate::core::time::TimeBucketer;
use crate::costs::CostParameters;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Configuration errors, raised before any simulation work starts
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ConfigError {
    #[error("bucket_minutes must be positive and divide 1440, got {0}")]
    InvalidBucketMinutes(u32),

    #[error("Station {station_id} has non-positive capacity {capacity}")]
    NonPositiveCapacity { station_id: String, capacity: i64 },

    #[error("total_bikes_ratio must lie in [0, 1], got {0}")]
    RatioOutOfRange(f64),

    #[error("{name} must lie strictly between 0 and 1, got {value}")]
    ThresholdOutOfRange { name: &'static str, value: f64 },

    #[error("{name} must be non-negative, got {value}")]
    NegativeWeight { name: &'static str, value: f64 },

    #[error("At least one day of trips is required")]
    NoDays,
}

/// Complete configuration for baseline and midnight scenarios
///
/// Defaults follow the production midnight scenario: 15-minute buckets,
/// 60% fleet fill, 10%/90% soft thresholds, unit weights.
///
/// # Example
/// ```
/// use midnight_rebalance_core_rs::ScenarioConfig;
///
/// let config: ScenarioConfig = serde_json::from_str(r#"{"bucket_minutes": 60}"#).unwrap();
/// assert_eq!(config.bucket_minutes, 60);
/// assert_eq!(config.total_bikes_ratio, 0.60);
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScenarioConfig {
    /// Sampling resolution in minutes (must divide 1440)
    pub bucket_minutes: u32,

    /// Fleet size as a fraction of total dock capacity
    pub total_bikes_ratio: f64,

    /// Explicit fleet size; overrides `total_bikes_ratio` when set
    pub total_bikes: Option<u32>,

    /// Soft-threshold cost parameters
    pub cost: CostParameters,

    /// Safety bound on accepted swaps (None = max(1000, fleet size))
    pub max_moves: Option<usize>,
}

impl Default for ScenarioConfig {
    fn default() -> Self {
        Self {
            bucket_minutes: 15,
            total_bikes_ratio: 0.60,
            total_bikes: None,
            cost: CostParameters::default(),
            max_moves: None,
        }
    }
}

impl ScenarioConfig {
    /// Validate every field, failing on the first violation
    pub fn validate(&self) -> Result<(), ConfigError> {
        TimeBucketer::new(self.bucket_minutes)?;
        validate_ratio(self.total_bikes_ratio)?;
        self.cost.validate()
    }

    /// Bucketer for this configuration
    pub fn bucketer(&self) -> Result<TimeBucketer, ConfigError> {
        TimeBucketer::new(self.bucket_minutes)
    }

    /// Number of bikes in the system for a network of `total_capacity` docks
    ///
    /// An explicit `total_bikes` is clamped to capacity; otherwise the ratio
    /// is applied and rounded to the nearest bike.
    pub fn fleet_size(&self, total_capacity: u64) -> u64 {
        match self.total_bikes {
            Some(total) => u64::from(total).min(total_capacity),
            None => fleet_size_for_ratio(self.total_bikes_ratio, total_capacity),
        }
    }
}

/// Check a fill ratio lies in `[0, 1]`
pub fn validate_ratio(ratio: f64) -> Result<(), ConfigError> {
    if !(0.0..=1.0).contains(&ratio) {
        return Err(ConfigError::RatioOutOfRange(ratio));
    }
    Ok(())
}

/// `ratio * total_capacity` rounded to the nearest bike, never above capacity
///
/// Halves round to even, so 25 docks at 0.5 hold 12 bikes.
pub fn fleet_size_for_ratio(ratio: f64, total_capacity: u64) -> u64 {
    let target = (ratio * total_capacity as f64).round_ties_even();
    if target <= 0.0 {
        0
    } else {
        (target as u64).min(total_capacity)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        assert!(ScenarioConfig::default().validate().is_ok());
    }

    #[test]
    fn test_ratio_out_of_range() {
        let config = ScenarioConfig {
            total_bikes_ratio: 1.5,
            ..Default::default()
        };
        assert_eq!(config.validate(), Err(ConfigError::RatioOutOfRange(1.5)));
    }

    #[test]
    fn test_nan_ratio_rejected() {
        assert!(validate_ratio(f64::NAN).is_err());
    }

    #[test]
    fn test_explicit_fleet_size_clamped_to_capacity() {
        let config = ScenarioConfig {
            total_bikes: Some(500),
            ..Default::default()
        };
        assert_eq!(config.fleet_size(120), 120);
        assert_eq!(ScenarioConfig::default().fleet_size(120), 72);
    }

    #[test]
    fn test_fleet_size_rounds_half_to_even() {
        assert_eq!(fleet_size_for_ratio(0.5, 25), 12);
        assert_eq!(fleet_size_for_ratio(0.5, 27), 14);
        assert_eq!(fleet_size_for_ratio(0.6, 25), 15);
        assert_eq!(fleet_size_for_ratio(1.0, 25), 25);
        assert_eq!(fleet_size_for_ratio(0.0, 25), 0);
    }
}
