//! Time bucketing for the simulated day
//!
//! The simulation covers exactly one day of 1440 minutes. Occupancy is
//! sampled in fixed-width buckets; this module maps minutes onto buckets and
//! back.

use crate::core::config::ConfigError;

/// Minutes in one simulated day
pub const MINUTES_PER_DAY: u32 = 1440;

/// Maps minute-of-day onto fixed-width buckets
///
/// # Example
/// ```
/// use midnight_rebalance_core_rs::TimeBucketer;
///
/// let buckets = TimeBucketer::new(15).unwrap(); // 15-minute buckets
/// assert_eq!(buckets.bucket_count(), 96);
/// assert_eq!(buckets.bucket_of(0), 0);
/// assert_eq!(buckets.bucket_of(14), 0);
/// assert_eq!(buckets.bucket_of(15), 1);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeBucketer {
    /// Width of one bucket in minutes (divides 1440)
    bucket_minutes: u32,
}

impl TimeBucketer {
    /// Create a new TimeBucketer
    ///
    /// # Arguments
    /// * `bucket_minutes` - Bucket width; must be positive and divide 1440
    ///
    /// # Errors
    /// `ConfigError::InvalidBucketMinutes` if the width is zero or does not
    /// divide the day evenly.
    ///
    /// # Example
    /// ```
    /// use midnight_rebalance_core_rs::TimeBucketer;
    ///
    /// assert!(TimeBucketer::new(60).is_ok());
    /// assert!(TimeBucketer::new(7).is_err());
    /// ```
    pub fn new(bucket_minutes: u32) -> Result<Self, ConfigError> {
        if bucket_minutes == 0 || MINUTES_PER_DAY % bucket_minutes != 0 {
            return Err(ConfigError::InvalidBucketMinutes(bucket_minutes));
        }
        Ok(Self { bucket_minutes })
    }

    /// Get bucket width in minutes
    pub fn bucket_minutes(&self) -> u32 {
        self.bucket_minutes
    }

    /// Number of buckets in one day
    ///
    /// # Example
    /// ```
    /// use midnight_rebalance_core_rs::TimeBucketer;
    ///
    /// assert_eq!(TimeBucketer::new(60).unwrap().bucket_count(), 24);
    /// ```
    pub fn bucket_count(&self) -> usize {
        (MINUTES_PER_DAY / self.bucket_minutes) as usize
    }

    /// Bucket index containing `minute`
    ///
    /// Minutes past the end of the day land in the last bucket.
    pub fn bucket_of(&self, minute: u32) -> usize {
        let bucket = (minute / self.bucket_minutes) as usize;
        bucket.min(self.bucket_count() - 1)
    }

    /// First minute of bucket `bucket`
    pub fn bucket_start(&self, bucket: usize) -> u32 {
        bucket as u32 * self.bucket_minutes
    }

    /// Exclusive end minute of bucket `bucket`
    pub fn bucket_end(&self, bucket: usize) -> u32 {
        self.bucket_start(bucket) + self.bucket_minutes
    }

    /// Label used for exported rows
    ///
    /// Hour index for hourly buckets, raw minute offset otherwise.
    ///
    /// # Example
    /// ```
    /// use midnight_rebalance_core_rs::TimeBucketer;
    ///
    /// assert_eq!(TimeBucketer::new(60).unwrap().label(3), 3);
    /// assert_eq!(TimeBucketer::new(15).unwrap().label(3), 45);
    /// ```
    pub fn label(&self, bucket: usize) -> u32 {
        if self.is_hourly() {
            bucket as u32
        } else {
            self.bucket_start(bucket)
        }
    }

    /// True when buckets are exactly one hour wide
    pub fn is_hourly(&self) -> bool {
        self.bucket_minutes == 60
    }

    /// True when a signed minute offset lies within `[0, 1440)`
    pub fn is_within_day(minute: i32) -> bool {
        minute >= 0 && (minute as u32) < MINUTES_PER_DAY
    }
}

impl Default for TimeBucketer {
    fn default() -> Self {
        Self { bucket_minutes: 15 }
    }
}
