//! Exported rows and occupancy stress summaries

use crate::models::trajectory::OccupancyTrajectory;
use serde::Serialize;

/// One exported (station, bucket) row
///
/// `bucket_label` is an hour index for hourly buckets and a minute offset
/// otherwise.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OccupancyRecord {
    pub station_id: String,
    pub bucket_label: u32,
    pub bikes: u32,
    pub empty_docks: u32,
    pub capacity: u32,
}

/// Rows for every station and bucket, bucket-major like the replay snapshots
pub fn occupancy_records(trajectory: &OccupancyTrajectory) -> Vec<OccupancyRecord> {
    let bucketer = trajectory.bucketer();
    let mut records = Vec::with_capacity(trajectory.bucket_count() * trajectory.stations().len());
    for bucket in 0..trajectory.bucket_count() {
        let label = bucketer.label(bucket);
        for station in trajectory.stations() {
            records.push(OccupancyRecord {
                station_id: station.station_id.clone(),
                bucket_label: label,
                bikes: station.bikes[bucket],
                empty_docks: station.empty_docks(bucket),
                capacity: station.capacity,
            });
        }
    }
    records
}

/// Number of stressed stations per bucket
///
/// A station is empty-stressed when `bikes / capacity <= empty_thr` and
/// full-stressed when `bikes / capacity >= full_thr`; the empty test wins
/// when both hold.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StressProfile {
    pub bucket_labels: Vec<u32>,
    pub empty_stations: Vec<usize>,
    pub full_stations: Vec<usize>,
}

impl StressProfile {
    pub fn from_trajectory(
        trajectory: &OccupancyTrajectory,
        empty_thr: f64,
        full_thr: f64,
    ) -> Self {
        let bucketer = trajectory.bucketer();
        let buckets = trajectory.bucket_count();
        let mut empty_stations = vec![0; buckets];
        let mut full_stations = vec![0; buckets];

        for station in trajectory.stations() {
            let capacity = f64::from(station.capacity);
            for (bucket, bikes) in station.samples() {
                let ratio = f64::from(bikes) / capacity;
                if ratio <= empty_thr {
                    empty_stations[bucket] += 1;
                } else if ratio >= full_thr {
                    full_stations[bucket] += 1;
                }
            }
        }

        Self {
            bucket_labels: (0..buckets).map(|b| bucketer.label(b)).collect(),
            empty_stations,
            full_stations,
        }
    }

    /// Station-buckets spent empty (area under the empty curve)
    pub fn empty_area(&self) -> usize {
        self.empty_stations.iter().sum()
    }

    /// Station-buckets spent full (area under the full curve)
    pub fn full_area(&self) -> usize {
        self.full_stations.iter().sum()
    }

    pub fn peak_empty(&self) -> usize {
        self.empty_stations.iter().copied().max().unwrap_or(0)
    }

    pub fn peak_full(&self) -> usize {
        self.full_stations.iter().copied().max().unwrap_or(0)
    }
}
