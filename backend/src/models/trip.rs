//! Trip model
//!
//! A trip is one bike leaving a station and later docking at another.
//! Times are minute offsets from midnight of the simulated day; they are
//! signed so that trips spilling outside the day stay representable until
//! they are filtered.

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// One trip, relative to the simulated day
///
/// # Example
/// ```
/// use midnight_rebalance_core_rs::TripEvent;
///
/// let trip = TripEvent::new(480, "7000", 495, "7001");
/// assert_eq!(trip.duration_minutes(), 15);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TripEvent {
    /// Departure minute since midnight
    pub start_minute: i32,
    pub start_station_id: String,
    /// Arrival minute since midnight
    pub end_minute: i32,
    pub end_station_id: String,
}

impl TripEvent {
    pub fn new(
        start_minute: i32,
        start_station_id: impl Into<String>,
        end_minute: i32,
        end_station_id: impl Into<String>,
    ) -> Self {
        Self {
            start_minute,
            start_station_id: start_station_id.into(),
            end_minute,
            end_station_id: end_station_id.into(),
        }
    }

    pub fn duration_minutes(&self) -> i32 {
        self.end_minute - self.start_minute
    }
}

/// Trip with absolute timestamps, as delivered by a trip-data loader
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TripRecord {
    pub start: NaiveDateTime,
    pub start_station_id: String,
    pub end: NaiveDateTime,
    pub end_station_id: String,
}

impl TripRecord {
    /// Calendar day the trip starts on
    pub fn day(&self) -> NaiveDate {
        self.start.date()
    }

    /// Express this trip in minutes relative to midnight of `day`
    ///
    /// Seconds are floored to the minute, so 23:59:59 on the previous day is
    /// minute -1 and stays outside the target day.
    ///
    /// # Example
    /// ```
    /// use chrono::NaiveDate;
    /// use midnight_rebalance_core_rs::TripRecord;
    ///
    /// let day = NaiveDate::from_ymd_opt(2024, 9, 1).unwrap();
    /// let record = TripRecord {
    ///     start: day.and_hms_opt(8, 0, 30).unwrap(),
    ///     start_station_id: "7000".to_string(),
    ///     end: day.and_hms_opt(8, 20, 0).unwrap(),
    ///     end_station_id: "7001".to_string(),
    /// };
    ///
    /// let trip = record.relative_to(day);
    /// assert_eq!(trip.start_minute, 480);
    /// assert_eq!(trip.end_minute, 500);
    /// ```
    pub fn relative_to(&self, day: NaiveDate) -> TripEvent {
        let midnight = day.and_time(NaiveTime::MIN);
        TripEvent {
            start_minute: minutes_since(midnight, self.start),
            start_station_id: self.start_station_id.clone(),
            end_minute: minutes_since(midnight, self.end),
            end_station_id: self.end_station_id.clone(),
        }
    }
}

fn minutes_since(origin: NaiveDateTime, at: NaiveDateTime) -> i32 {
    let minutes = (at - origin).num_seconds().div_euclid(60);
    minutes.clamp(i64::from(i32::MIN), i64::from(i32::MAX)) as i32
}

/// Group timestamped trips by the day they start on
///
/// Only the requested days are returned, each relative to its own midnight.
/// A requested day without trips maps to an empty list.
pub fn trips_by_day(
    records: &[TripRecord],
    days: impl IntoIterator<Item = NaiveDate>,
) -> BTreeMap<NaiveDate, Vec<TripEvent>> {
    let mut grouped: BTreeMap<NaiveDate, Vec<TripEvent>> =
        days.into_iter().map(|day| (day, Vec::new())).collect();

    for record in records {
        let day = record.day();
        if let Some(trips) = grouped.get_mut(&day) {
            trips.push(record.relative_to(day));
        }
    }

    grouped
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(
        day: NaiveDate,
        start: (u32, u32, u32),
        end_day: NaiveDate,
        end: (u32, u32, u32),
    ) -> TripRecord {
        TripRecord {
            start: day.and_hms_opt(start.0, start.1, start.2).unwrap(),
            start_station_id: "A".to_string(),
            end: end_day.and_hms_opt(end.0, end.1, end.2).unwrap(),
            end_station_id: "B".to_string(),
        }
    }

    #[test]
    fn test_overnight_trip_ends_past_day() {
        let day = NaiveDate::from_ymd_opt(2024, 9, 1).unwrap();
        let next = day.succ_opt().unwrap();
        let trip = record(day, (23, 50, 0), next, (0, 10, 0)).relative_to(day);
        assert_eq!(trip.start_minute, 1430);
        assert_eq!(trip.end_minute, 1450);
    }

    #[test]
    fn test_previous_day_seconds_floor_negative() {
        let day = NaiveDate::from_ymd_opt(2024, 9, 2).unwrap();
        let prev = day.pred_opt().unwrap();
        let trip = record(prev, (23, 59, 59), day, (0, 5, 0)).relative_to(day);
        assert_eq!(trip.start_minute, -1);
    }

    #[test]
    fn test_trips_by_day_keeps_requested_days_only() {
        let d1 = NaiveDate::from_ymd_opt(2024, 9, 1).unwrap();
        let d2 = NaiveDate::from_ymd_opt(2024, 9, 2).unwrap();
        let d3 = NaiveDate::from_ymd_opt(2024, 9, 3).unwrap();
        let records = vec![
            record(d1, (8, 0, 0), d1, (8, 30, 0)),
            record(d2, (9, 0, 0), d2, (9, 30, 0)),
            record(d3, (10, 0, 0), d3, (10, 30, 0)),
        ];

        let grouped = trips_by_day(&records, [d2, d1]);
        assert_eq!(grouped.keys().copied().collect::<Vec<_>>(), vec![d1, d2]);
        assert_eq!(grouped[&d2][0].start_minute, 540);
    }
}
