//! Domain models for bike-share allocation

pub mod allocation;
pub mod station;
pub mod trajectory;
pub mod trip;

// Re-exports
pub use allocation::Allocation;
pub use station::{RegistryDiagnostics, Station, StationRecord, StationRegistry};
pub use trajectory::{OccupancyTrajectory, StationTrajectory};
pub use trip::{trips_by_day, TripEvent, TripRecord};
