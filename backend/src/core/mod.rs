//! Core infrastructure: time bucketing and configuration

pub mod config;
pub mod time;

pub use config::{ConfigError, ScenarioConfig};
pub use time::{TimeBucketer, MINUTES_PER_DAY};
