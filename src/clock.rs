//! Time source for engine event timestamps

use chrono::{DateTime, Utc};
use std::fmt;

/// Supplies the timestamp stamped on engine events.
///
/// The engine reads the clock once per processing call, so every entry from
/// one batch carries the same time.
pub trait Clock: fmt::Debug + Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

/// Wall-clock time
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Frozen time for reproducible event streams
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FixedClock {
    time: DateTime<Utc>,
}

impl FixedClock {
    pub fn new(time: DateTime<Utc>) -> Self {
        Self { time }
    }
}

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.time
    }
}
