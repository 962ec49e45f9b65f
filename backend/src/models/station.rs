//! Station model and registry
//!
//! The registry is the immutable capacity table for the simulated day.
//! Stations are stored in an arena sorted by id: a station's position in
//! the arena is its stable index for every per-station series in the crate.
//!
//! # Critical Invariants
//!
//! 1. **Positive Capacity**: Every registered station has capacity > 0
//! 2. **Unique Ids**: Each station id appears exactly once
//! 3. **Deterministic Order**: Iteration order is lexicographic by id

use crate::core::config::ConfigError;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use tracing::warn;

/// A docking station with a fixed number of docks
///
/// # Example
/// ```
/// use midnight_rebalance_core_rs::Station;
///
/// let station = Station::new("7000", 20).unwrap();
/// assert_eq!(station.id(), "7000");
/// assert_eq!(station.capacity(), 20);
///
/// assert!(Station::new("7001", 0).is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Station {
    id: String,
    capacity: u32,
}

impl Station {
    /// Create a station, rejecting non-positive capacity
    pub fn new(id: impl Into<String>, capacity: i64) -> Result<Self, ConfigError> {
        let id = id.into();
        if capacity <= 0 || capacity > i64::from(u32::MAX) {
            return Err(ConfigError::NonPositiveCapacity {
                station_id: id,
                capacity,
            });
        }
        Ok(Self {
            id,
            capacity: capacity as u32,
        })
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn capacity(&self) -> u32 {
        self.capacity
    }
}

/// Raw station record as delivered by an external loader
///
/// Capacity may be missing or invalid; such records are skipped when
/// building a registry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StationRecord {
    pub station_id: String,
    pub capacity: Option<i64>,
}

impl StationRecord {
    pub fn new(station_id: impl Into<String>, capacity: Option<i64>) -> Self {
        Self {
            station_id: station_id.into(),
            capacity,
        }
    }
}

/// Counts of records excluded while building a registry
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RegistryDiagnostics {
    /// Records accepted into the registry
    pub accepted: usize,
    /// Records without a capacity value
    pub missing_capacity: usize,
    /// Records with capacity <= 0
    pub non_positive_capacity: usize,
    /// Records repeating an id already registered
    pub duplicates: usize,
}

impl RegistryDiagnostics {
    /// Total records excluded for any reason
    pub fn excluded(&self) -> usize {
        self.missing_capacity + self.non_positive_capacity + self.duplicates
    }
}

/// Immutable capacity table, indexed by station id
///
/// # Example
/// ```
/// use midnight_rebalance_core_rs::{StationRecord, StationRegistry};
///
/// let registry = StationRegistry::from_records(vec![
///     StationRecord::new("B", Some(10)),
///     StationRecord::new("A", Some(15)),
///     StationRecord::new("C", None),
/// ]);
///
/// assert_eq!(registry.len(), 2);
/// assert_eq!(registry.index_of("A"), Some(0));
/// assert_eq!(registry.total_capacity(), 25);
/// assert_eq!(registry.diagnostics().missing_capacity, 1);
/// ```
#[derive(Debug, Clone, Default)]
pub struct StationRegistry {
    /// Arena of stations, sorted by id
    stations: Vec<Station>,

    /// Station id → arena index
    index: HashMap<String, usize>,

    diagnostics: RegistryDiagnostics,
}

impl StationRegistry {
    /// Build a registry from already-validated stations
    ///
    /// Later duplicates of an id are ignored and counted.
    pub fn new(stations: Vec<Station>) -> Self {
        let mut diagnostics = RegistryDiagnostics::default();
        let mut seen = HashSet::new();
        let mut unique = Vec::with_capacity(stations.len());
        for station in stations {
            if !seen.insert(station.id.clone()) {
                diagnostics.duplicates += 1;
                continue;
            }
            unique.push(station);
        }
        diagnostics.accepted = unique.len();
        Self::from_unique(unique, diagnostics)
    }

    /// Build a registry leniently from raw records
    ///
    /// Records with missing or non-positive capacity are excluded with a
    /// warning; trips referencing them are later dropped as unknown.
    pub fn from_records(records: impl IntoIterator<Item = StationRecord>) -> Self {
        let mut diagnostics = RegistryDiagnostics::default();
        let mut seen = HashSet::new();
        let mut stations = Vec::new();

        for record in records {
            let capacity = match record.capacity {
                Some(capacity) => capacity,
                None => {
                    diagnostics.missing_capacity += 1;
                    continue;
                }
            };
            let station = match Station::new(record.station_id, capacity) {
                Ok(station) => station,
                Err(_) => {
                    diagnostics.non_positive_capacity += 1;
                    continue;
                }
            };
            if !seen.insert(station.id.clone()) {
                diagnostics.duplicates += 1;
                continue;
            }
            stations.push(station);
        }

        diagnostics.accepted = stations.len();
        if diagnostics.excluded() > 0 {
            warn!(
                accepted = diagnostics.accepted,
                missing_capacity = diagnostics.missing_capacity,
                non_positive_capacity = diagnostics.non_positive_capacity,
                duplicates = diagnostics.duplicates,
                "excluded station records from registry"
            );
        }

        Self::from_unique(stations, diagnostics)
    }

    fn from_unique(mut stations: Vec<Station>, diagnostics: RegistryDiagnostics) -> Self {
        stations.sort_by(|a, b| a.id.cmp(&b.id));
        let index = stations
            .iter()
            .enumerate()
            .map(|(i, station)| (station.id.clone(), i))
            .collect();
        Self {
            stations,
            index,
            diagnostics,
        }
    }

    pub fn len(&self) -> usize {
        self.stations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stations.is_empty()
    }

    /// Arena index of a station id
    pub fn index_of(&self, station_id: &str) -> Option<usize> {
        self.index.get(station_id).copied()
    }

    /// Look up a station by id
    pub fn get(&self, station_id: &str) -> Option<&Station> {
        self.index_of(station_id).map(|i| &self.stations[i])
    }

    /// Station at arena index
    ///
    /// # Panics
    /// If `index >= len()`.
    pub fn station(&self, index: usize) -> &Station {
        &self.stations[index]
    }

    /// All stations in id order
    pub fn stations(&self) -> &[Station] {
        &self.stations
    }

    pub fn iter(&self) -> impl Iterator<Item = &Station> {
        self.stations.iter()
    }

    /// Sum of all capacities
    pub fn total_capacity(&self) -> u64 {
        self.stations.iter().map(|s| u64::from(s.capacity)).sum()
    }

    pub fn diagnostics(&self) -> &RegistryDiagnostics {
        &self.diagnostics
    }
}
