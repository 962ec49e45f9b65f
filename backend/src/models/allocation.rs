//! Midnight allocation
//!
//! An allocation fixes the number of bikes docked at every registered
//! station at midnight. Counts are indexed by registry arena position.
//!
//! # Critical Invariants
//!
//! 1. **Bounds**: `0 <= bikes[s] <= capacity[s]` for every station
//! 2. **Fixed Total**: Swaps move one bike between two stations, so the
//!    total never changes once the allocation is built

use crate::core::config::{fleet_size_for_ratio, validate_ratio, ConfigError};
use crate::models::station::StationRegistry;
use std::collections::BTreeMap;

/// Bikes per station at midnight
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Allocation {
    bikes: Vec<u32>,
}

impl Allocation {
    /// Apportion `total` bikes proportionally to capacity
    ///
    /// Uses largest-remainder apportionment so the result sums to exactly
    /// `min(total, total_capacity)`. Equal remainders go to the lowest
    /// station id first.
    ///
    /// # Example
    /// ```
    /// use midnight_rebalance_core_rs::{Allocation, Station, StationRegistry};
    ///
    /// let registry = StationRegistry::new(vec![
    ///     Station::new("A", 10).unwrap(),
    ///     Station::new("B", 10).unwrap(),
    ///     Station::new("C", 5).unwrap(),
    /// ]);
    ///
    /// let allocation = Allocation::proportional(&registry, 13);
    /// assert_eq!(allocation.bikes(), &[5, 5, 3]);
    /// assert_eq!(allocation.total(), 13);
    /// ```
    pub fn proportional(registry: &StationRegistry, total: u64) -> Self {
        let total_capacity = registry.total_capacity();
        if total_capacity == 0 {
            return Self {
                bikes: vec![0; registry.len()],
            };
        }
        let total = total.min(total_capacity);

        let mut bikes = Vec::with_capacity(registry.len());
        let mut remainders = Vec::with_capacity(registry.len());
        for (index, station) in registry.iter().enumerate() {
            // Exact integer quota: capacity * total / total_capacity
            let numerator = u64::from(station.capacity()) * total;
            bikes.push((numerator / total_capacity) as u32);
            remainders.push((numerator % total_capacity, index));
        }

        let assigned: u64 = bikes.iter().map(|&b| u64::from(b)).sum();
        let leftover = (total - assigned) as usize;

        // Largest remainder first, lowest index on ties
        remainders.sort_by(|a, b| b.0.cmp(&a.0).then(a.1.cmp(&b.1)));
        for &(_, index) in remainders.iter().take(leftover) {
            bikes[index] += 1;
        }

        Self { bikes }
    }

    /// Proportional allocation for a fill ratio of total capacity
    pub fn from_ratio(registry: &StationRegistry, ratio: f64) -> Result<Self, ConfigError> {
        validate_ratio(ratio)?;
        let total = fleet_size_for_ratio(ratio, registry.total_capacity());
        Ok(Self::proportional(registry, total))
    }

    /// Build from explicit per-station counts
    ///
    /// Counts are clamped into `[0, capacity]`; stations without a count
    /// start empty and unknown ids are ignored.
    pub fn from_counts<'a>(
        registry: &StationRegistry,
        counts: impl IntoIterator<Item = (&'a str, i64)>,
    ) -> Self {
        let mut bikes = vec![0u32; registry.len()];
        for (station_id, count) in counts {
            if let Some(index) = registry.index_of(station_id) {
                let capacity = i64::from(registry.station(index).capacity());
                bikes[index] = count.clamp(0, capacity) as u32;
            }
        }
        Self { bikes }
    }

    /// Bikes at arena index
    pub fn get(&self, index: usize) -> u32 {
        self.bikes[index]
    }

    pub fn bikes(&self) -> &[u32] {
        &self.bikes
    }

    pub fn len(&self) -> usize {
        self.bikes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bikes.is_empty()
    }

    /// Total bikes across all stations
    pub fn total(&self) -> u64 {
        self.bikes.iter().map(|&b| u64::from(b)).sum()
    }

    /// Move one bike from `donor` to `receiver`
    ///
    /// Caller guarantees the donor is non-empty and the receiver has a free
    /// dock.
    pub(crate) fn transfer_one(&mut self, donor: usize, receiver: usize) {
        debug_assert!(self.bikes[donor] > 0, "donor must hold a bike");
        self.bikes[donor] -= 1;
        self.bikes[receiver] += 1;
    }

    /// Counts keyed by station id
    pub fn to_map(&self, registry: &StationRegistry) -> BTreeMap<String, u32> {
        registry
            .iter()
            .zip(&self.bikes)
            .map(|(station, &bikes)| (station.id().to_string(), bikes))
            .collect()
    }
}
