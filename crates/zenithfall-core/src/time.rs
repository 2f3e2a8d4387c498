//! Wall-clock time for daily quotas and inactivity tracking
//!
//! Provides:
//! - `Clock` - injectable source of "now"
//! - `SystemClock` - the real wall clock
//! - `FixedClock` - a settable clock for tests and replays
//! - Local calendar-day helpers for a fixed UTC offset

use crate::error::{Error, Result};
use chrono::{DateTime, Duration, FixedOffset, NaiveDate, Utc};
use std::sync::RwLock;

/// Source of the current instant
pub trait Clock: Send + Sync {
    /// Current time in UTC
    fn now(&self) -> DateTime<Utc>;
}

/// The system wall clock
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// A clock that only moves when told to
#[derive(Debug)]
pub struct FixedClock {
    now: RwLock<DateTime<Utc>>,
}

impl FixedClock {
    /// Create a clock frozen at the given instant
    pub fn new(now: DateTime<Utc>) -> Self {
        Self {
            now: RwLock::new(now),
        }
    }

    /// Move the clock to a new instant
    pub fn set(&self, now: DateTime<Utc>) {
        let mut guard = self.now.write().unwrap_or_else(|e| e.into_inner());
        *guard = now;
    }

    /// Move the clock forward
    pub fn advance(&self, by: Duration) {
        let mut guard = self.now.write().unwrap_or_else(|e| e.into_inner());
        *guard += by;
    }
}

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        *self.now.read().unwrap_or_else(|e| e.into_inner())
    }
}

/// Build a fixed offset from seconds east of UTC
pub fn utc_offset(seconds_east: i32) -> Result<FixedOffset> {
    FixedOffset::east_opt(seconds_east).ok_or(Error::InvalidUtcOffset(seconds_east))
}

/// The calendar day an instant falls on in the given offset
pub fn local_day(at: DateTime<Utc>, offset: FixedOffset) -> NaiveDate {
    at.with_timezone(&offset).date_naive()
}

/// Whole local calendar days between two instants (negative if `to` is earlier)
pub fn days_between(from: DateTime<Utc>, to: DateTime<Utc>, offset: FixedOffset) -> i64 {
    (local_day(to, offset) - local_day(from, offset)).num_days()
}
