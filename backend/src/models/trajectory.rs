//! Bucketed occupancy trajectories

use crate::core::time::TimeBucketer;
use serde::Serialize;

/// Occupancy of one station, one sample per bucket
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StationTrajectory {
    pub station_id: String,
    pub capacity: u32,
    /// Bikes docked at the end of each bucket, in bucket order
    pub bikes: Vec<u32>,
}

impl StationTrajectory {
    /// `(bucket_index, bikes)` pairs in bucket order
    pub fn samples(&self) -> impl Iterator<Item = (usize, u32)> + '_ {
        self.bikes.iter().copied().enumerate()
    }

    /// Free docks at the end of `bucket`
    pub fn empty_docks(&self, bucket: usize) -> u32 {
        self.capacity - self.bikes[bucket]
    }
}

/// Occupancy of every registered station over one day
///
/// Stations appear in registry order (sorted by id).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OccupancyTrajectory {
    bucketer: TimeBucketer,
    stations: Vec<StationTrajectory>,
}

impl OccupancyTrajectory {
    pub(crate) fn new(bucketer: TimeBucketer, stations: Vec<StationTrajectory>) -> Self {
        Self { bucketer, stations }
    }

    pub fn bucketer(&self) -> TimeBucketer {
        self.bucketer
    }

    pub fn bucket_count(&self) -> usize {
        self.bucketer.bucket_count()
    }

    pub fn stations(&self) -> &[StationTrajectory] {
        &self.stations
    }

    /// Trajectory for a station id
    pub fn get(&self, station_id: &str) -> Option<&StationTrajectory> {
        self.stations
            .binary_search_by(|s| s.station_id.as_str().cmp(station_id))
            .ok()
            .map(|i| &self.stations[i])
    }

    /// Bikes docked across the whole network at the end of `bucket`
    pub fn total_at(&self, bucket: usize) -> u64 {
        self.stations
            .iter()
            .map(|s| u64::from(s.bikes[bucket]))
            .sum()
    }
}
