//! Trip replay simulator
//!
//! Replays the merged event stream of one day against a midnight
//! allocation and samples every station's bike count at the end of each
//! bucket.
//!
//! # Replay Semantics
//!
//! ```text
//! departure at s:  bikes[s] > 0        → bikes[s] -= 1   else no-op (departure clamp)
//! arrival at s:    bikes[s] < capacity → bikes[s] += 1   else discard (arrival clamp)
//! sample bucket b: count after every event with minute < bucket_end(b)
//! ```
//!
//! Clamps are an accepted modelling slack (unobserved rebalancing, registry
//! gaps), so they are counted, never raised. They are also the only way the
//! network total can change during replay.
//!
//! # Determinism
//!
//! Replay is a pure function of (registry, allocation, trips, bucketing):
//! the same inputs always produce an identical trajectory.

use crate::core::time::TimeBucketer;
use crate::models::allocation::Allocation;
use crate::models::station::StationRegistry;
use crate::models::trajectory::{OccupancyTrajectory, StationTrajectory};
use crate::models::trip::TripEvent;
use crate::simulation::events::{EventKind, EventStream, TripFilterStats};
use serde::Serialize;
use tracing::debug;

/// Counters collected during one replay
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ReplayDiagnostics {
    #[serde(flatten)]
    pub trips: TripFilterStats,
    /// Departures from an already empty station
    pub departure_clamps: usize,
    /// Arrivals at an already full station
    pub arrival_clamps: usize,
}

impl ReplayDiagnostics {
    pub fn total_clamps(&self) -> usize {
        self.departure_clamps + self.arrival_clamps
    }
}

/// Trajectory plus diagnostics of one replay
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReplayOutcome {
    pub trajectory: OccupancyTrajectory,
    pub diagnostics: ReplayDiagnostics,
}

/// Deterministic trip replay over bucketed time
///
/// # Example
/// ```
/// use midnight_rebalance_core_rs::{
///     Allocation, Station, StationRegistry, StateSimulator, TimeBucketer, TripEvent,
/// };
///
/// let registry = StationRegistry::new(vec![
///     Station::new("A", 10).unwrap(),
///     Station::new("B", 10).unwrap(),
/// ]);
/// let allocation = Allocation::from_ratio(&registry, 0.5).unwrap();
/// let trips = vec![TripEvent::new(30, "A", 90, "B")];
///
/// let simulator = StateSimulator::new(TimeBucketer::new(60).unwrap());
/// let outcome = simulator.replay(&registry, &allocation, &trips);
///
/// let a = outcome.trajectory.get("A").unwrap();
/// let b = outcome.trajectory.get("B").unwrap();
/// assert_eq!(a.bikes[0], 4); // departed during hour 0
/// assert_eq!(b.bikes[0], 5); // still riding
/// assert_eq!(b.bikes[1], 6); // docked during hour 1
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct StateSimulator {
    bucketer: TimeBucketer,
}

impl StateSimulator {
    pub fn new(bucketer: TimeBucketer) -> Self {
        Self { bucketer }
    }

    pub fn bucketer(&self) -> TimeBucketer {
        self.bucketer
    }

    /// Filter, merge and replay `trips` from `allocation`
    pub fn replay(
        &self,
        registry: &StationRegistry,
        allocation: &Allocation,
        trips: &[TripEvent],
    ) -> ReplayOutcome {
        let stream = EventStream::build(registry, trips);
        self.replay_stream(registry, allocation, &stream)
    }

    /// Replay an already merged event stream
    ///
    /// # Panics
    /// If `allocation` was not built for `registry` (length mismatch).
    pub fn replay_stream(
        &self,
        registry: &StationRegistry,
        allocation: &Allocation,
        stream: &EventStream,
    ) -> ReplayOutcome {
        assert_eq!(
            allocation.len(),
            registry.len(),
            "allocation must cover every registered station"
        );

        let bucket_count = self.bucketer.bucket_count();
        let mut bikes: Vec<u32> = allocation.bikes().to_vec();
        let mut samples: Vec<Vec<u32>> = vec![Vec::with_capacity(bucket_count); registry.len()];
        let mut diagnostics = ReplayDiagnostics {
            trips: stream.stats(),
            ..Default::default()
        };

        let events = stream.events();
        let mut next = 0;

        for bucket in 0..bucket_count {
            let end = self.bucketer.bucket_end(bucket);

            while next < events.len() && events[next].minute < end {
                let event = events[next];
                let capacity = registry.station(event.station).capacity();
                let count = &mut bikes[event.station];

                match event.kind {
                    EventKind::Departure => {
                        if *count > 0 {
                            *count -= 1;
                        } else {
                            diagnostics.departure_clamps += 1;
                        }
                    }
                    EventKind::Arrival => {
                        if *count < capacity {
                            *count += 1;
                        } else {
                            diagnostics.arrival_clamps += 1;
                        }
                    }
                }
                next += 1;
            }

            for (series, &count) in samples.iter_mut().zip(&bikes) {
                series.push(count);
            }
        }

        debug!(
            trips_accepted = diagnostics.trips.trips_accepted,
            dropped_out_of_day = diagnostics.trips.dropped_out_of_day,
            dropped_unknown_station = diagnostics.trips.dropped_unknown_station,
            dropped_loop = diagnostics.trips.dropped_loop,
            departure_clamps = diagnostics.departure_clamps,
            arrival_clamps = diagnostics.arrival_clamps,
            "replay complete"
        );

        let stations = registry
            .iter()
            .zip(samples)
            .map(|(station, bikes)| StationTrajectory {
                station_id: station.id().to_string(),
                capacity: station.capacity(),
                bikes,
            })
            .collect();

        ReplayOutcome {
            trajectory: OccupancyTrajectory::new(self.bucketer, stations),
            diagnostics,
        }
    }
}
