//! Filtered, merged station event stream
//!
//! Both the replay simulator and the net-flow estimator consume the same
//! stream: trips outside the day, touching unknown stations, or returning to
//! their origin station are removed. Every surviving trip is split into a
//! departure and an arrival, and the halves are merged into one totally
//! ordered sequence.

use crate::core::time::TimeBucketer;
use crate::models::station::StationRegistry;
use crate::models::trip::TripEvent;
use serde::Serialize;

/// Kind of station sub-event
///
/// Declaration order is the tie-break order: departures before arrivals.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub enum EventKind {
    Departure,
    Arrival,
}

/// One bike leaving or docking at a station
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct StationEvent {
    /// Minute since midnight, within `[0, 1440)`
    pub minute: u32,
    pub kind: EventKind,
    /// Registry arena index (ordering by index is ordering by station id)
    pub station: usize,
}

/// Counters describing which trips entered the stream
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct TripFilterStats {
    pub trips_seen: usize,
    pub trips_accepted: usize,
    /// Departure or arrival outside the target day
    pub dropped_out_of_day: usize,
    /// Start or end station missing from the registry
    pub dropped_unknown_station: usize,
    /// Returned to the station it left from
    pub dropped_loop: usize,
}

/// Ordered stream of station events for one day
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EventStream {
    events: Vec<StationEvent>,
    stats: TripFilterStats,
}

impl EventStream {
    /// Filter, expand and merge `trips`
    ///
    /// Order is (minute, departure-before-arrival, station id) regardless of
    /// input order, so the stream is fully deterministic.
    pub fn build(registry: &StationRegistry, trips: &[TripEvent]) -> Self {
        let mut stats = TripFilterStats {
            trips_seen: trips.len(),
            ..Default::default()
        };
        let mut events = Vec::with_capacity(trips.len() * 2);

        for trip in trips {
            if !TimeBucketer::is_within_day(trip.start_minute)
                || !TimeBucketer::is_within_day(trip.end_minute)
            {
                stats.dropped_out_of_day += 1;
                continue;
            }

            let (origin, destination) = match (
                registry.index_of(&trip.start_station_id),
                registry.index_of(&trip.end_station_id),
            ) {
                (Some(origin), Some(destination)) => (origin, destination),
                _ => {
                    stats.dropped_unknown_station += 1;
                    continue;
                }
            };
            if origin == destination {
                stats.dropped_loop += 1;
                continue;
            }

            stats.trips_accepted += 1;
            events.push(StationEvent {
                minute: trip.start_minute as u32,
                kind: EventKind::Departure,
                station: origin,
            });
            events.push(StationEvent {
                minute: trip.end_minute as u32,
                kind: EventKind::Arrival,
                station: destination,
            });
        }

        // Field order of StationEvent gives the merge order
        events.sort_unstable();

        Self { events, stats }
    }

    pub fn events(&self) -> &[StationEvent] {
        &self.events
    }

    pub fn stats(&self) -> TripFilterStats {
        self.stats
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::station::Station;

    fn registry() -> StationRegistry {
        StationRegistry::new(vec![
            Station::new("A", 10).unwrap(),
            Station::new("B", 10).unwrap(),
        ])
    }

    #[test]
    fn test_filters_out_of_day_and_unknown() {
        let trips = vec![
            TripEvent::new(-5, "A", 10, "B"),
            TripEvent::new(1430, "A", 1445, "B"),
            TripEvent::new(100, "A", 110, "Z"),
            TripEvent::new(100, "A", 110, "B"),
        ];
        let stream = EventStream::build(&registry(), &trips);
        let stats = stream.stats();
        assert_eq!(stats.trips_seen, 4);
        assert_eq!(stats.dropped_out_of_day, 2);
        assert_eq!(stats.dropped_unknown_station, 1);
        assert_eq!(stats.trips_accepted, 1);
        assert_eq!(stream.len(), 2);
    }

    #[test]
    fn test_loop_trips_are_dropped() {
        let trips = vec![
            TripEvent::new(100, "A", 130, "A"),
            TripEvent::new(100, "A", 130, "B"),
        ];
        let stream = EventStream::build(&registry(), &trips);
        assert_eq!(stream.stats().dropped_loop, 1);
        assert_eq!(stream.stats().trips_accepted, 1);
        assert_eq!(stream.len(), 2);
    }

    #[test]
    fn test_departures_precede_arrivals_at_same_minute() {
        let trips = vec![
            TripEvent::new(0, "B", 60, "A"),
            TripEvent::new(60, "B", 70, "A"),
        ];
        let stream = EventStream::build(&registry(), &trips);
        let at_60: Vec<_> = stream
            .events()
            .iter()
            .filter(|e| e.minute == 60)
            .map(|e| e.kind)
            .collect();
        assert_eq!(at_60, vec![EventKind::Departure, EventKind::Arrival]);
    }
}
