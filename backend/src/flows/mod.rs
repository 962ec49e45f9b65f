//! Net-flow estimation
//!
//! Separates "which flows happen" from "what the occupancy becomes": the
//! per-bucket net delta of a station does not depend on its midnight count,
//! so the optimizer can score any candidate allocation with a cumulative sum
//! and a clamp instead of a full replay.
//!
//! # Multi-day Averaging
//!
//! Days are computed independently (in parallel), then averaged bucket by
//! bucket in ascending date order. The fixed order makes the floating-point
//! sums bit-for-bit reproducible however the parallel work was scheduled.

use crate::core::config::ConfigError;
use crate::core::time::TimeBucketer;
use crate::models::station::StationRegistry;
use crate::models::trip::TripEvent;
use crate::simulation::events::{EventKind, EventStream, TripFilterStats};
use chrono::NaiveDate;
use rayon::prelude::*;
use std::collections::BTreeMap;
use tracing::debug;

/// Per-station, per-bucket net deltas (arrivals − departures)
///
/// Indexed by registry arena position; every registered station has a
/// series of exactly `bucket_count` values.
#[derive(Debug, Clone, PartialEq)]
pub struct NetFlowSeries {
    bucketer: TimeBucketer,
    deltas: Vec<Vec<f64>>,
}

impl NetFlowSeries {
    /// All-zero series for every registered station
    pub fn zeros(registry: &StationRegistry, bucketer: TimeBucketer) -> Self {
        Self {
            bucketer,
            deltas: vec![vec![0.0; bucketer.bucket_count()]; registry.len()],
        }
    }

    /// Build from explicit per-station deltas
    ///
    /// Stations without an entry get zeros, unknown ids are ignored, and each
    /// series is truncated or zero-padded to the bucket count.
    ///
    /// # Example
    /// ```
    /// use midnight_rebalance_core_rs::{NetFlowSeries, Station, StationRegistry, TimeBucketer};
    ///
    /// let registry = StationRegistry::new(vec![Station::new("A", 10).unwrap()]);
    /// let flows = NetFlowSeries::from_station_deltas(
    ///     &registry,
    ///     TimeBucketer::new(60).unwrap(),
    ///     [("A", vec![-1.0, 2.0])],
    /// );
    /// assert_eq!(flows.station(0).len(), 24);
    /// assert_eq!(flows.station_net(0), 1.0);
    /// ```
    pub fn from_station_deltas<'a>(
        registry: &StationRegistry,
        bucketer: TimeBucketer,
        deltas: impl IntoIterator<Item = (&'a str, Vec<f64>)>,
    ) -> Self {
        let mut series = Self::zeros(registry, bucketer);
        for (station_id, mut values) in deltas {
            if let Some(index) = registry.index_of(station_id) {
                values.resize(bucketer.bucket_count(), 0.0);
                series.deltas[index] = values;
            }
        }
        series
    }

    pub fn bucketer(&self) -> TimeBucketer {
        self.bucketer
    }

    pub fn bucket_count(&self) -> usize {
        self.bucketer.bucket_count()
    }

    /// Number of stations covered
    pub fn len(&self) -> usize {
        self.deltas.len()
    }

    pub fn is_empty(&self) -> bool {
        self.deltas.is_empty()
    }

    /// Delta series of the station at arena index
    pub fn station(&self, index: usize) -> &[f64] {
        &self.deltas[index]
    }

    /// Net change over the whole day for the station at arena index
    pub fn station_net(&self, index: usize) -> f64 {
        self.deltas[index].iter().sum()
    }
}

/// Net flows of one day plus the trip filter counters
#[derive(Debug, Clone, PartialEq)]
pub struct DayFlows {
    pub series: NetFlowSeries,
    pub stats: TripFilterStats,
}

/// Net flows averaged over several days
#[derive(Debug, Clone, PartialEq)]
pub struct MultiDayFlows {
    /// Per-bucket mean across `days`
    pub series: NetFlowSeries,
    /// Days averaged, ascending
    pub days: Vec<NaiveDate>,
    /// Filter counters per day, in `days` order
    pub stats: Vec<TripFilterStats>,
}

/// Derives net-flow series from trips
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct NetFlowEstimator {
    bucketer: TimeBucketer,
}

impl NetFlowEstimator {
    pub fn new(bucketer: TimeBucketer) -> Self {
        Self { bucketer }
    }

    /// Net flows of a single day
    pub fn estimate_day(&self, registry: &StationRegistry, trips: &[TripEvent]) -> DayFlows {
        let stream = EventStream::build(registry, trips);
        DayFlows {
            series: self.estimate_stream(registry, &stream),
            stats: stream.stats(),
        }
    }

    /// Aggregate an already merged stream into per-bucket deltas
    pub fn estimate_stream(
        &self,
        registry: &StationRegistry,
        stream: &EventStream,
    ) -> NetFlowSeries {
        let mut series = NetFlowSeries::zeros(registry, self.bucketer);
        for event in stream.events() {
            let bucket = self.bucketer.bucket_of(event.minute);
            let delta = match event.kind {
                EventKind::Departure => -1.0,
                EventKind::Arrival => 1.0,
            };
            series.deltas[event.station][bucket] += delta;
        }
        series
    }

    /// Mean net flows across several days
    ///
    /// # Errors
    /// `ConfigError::NoDays` when `days` is empty.
    pub fn estimate_days(
        &self,
        registry: &StationRegistry,
        days: &BTreeMap<NaiveDate, Vec<TripEvent>>,
    ) -> Result<MultiDayFlows, ConfigError> {
        if days.is_empty() {
            return Err(ConfigError::NoDays);
        }

        // BTreeMap iteration is ascending by date; collect keeps that order
        let ordered: Vec<(&NaiveDate, &Vec<TripEvent>)> = days.iter().collect();
        let per_day: Vec<DayFlows> = ordered
            .par_iter()
            .map(|(_, trips)| self.estimate_day(registry, trips))
            .collect();

        let mut mean = NetFlowSeries::zeros(registry, self.bucketer);
        for day in &per_day {
            for (sum, deltas) in mean.deltas.iter_mut().zip(&day.series.deltas) {
                for (acc, value) in sum.iter_mut().zip(deltas) {
                    *acc += value;
                }
            }
        }
        let count = per_day.len() as f64;
        for value in mean.deltas.iter_mut().flatten() {
            *value /= count;
        }

        debug!(days = per_day.len(), stations = registry.len(), "averaged net flows");

        Ok(MultiDayFlows {
            series: mean,
            days: ordered.iter().map(|(day, _)| **day).collect(),
            stats: per_day.iter().map(|day| day.stats).collect(),
        })
    }
}
