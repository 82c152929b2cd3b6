//! Time source abstraction.
//!
//! Everything that reads the current time (handle expiry, scheduled dates,
//! quota windows, poll backoff) goes through a [`Clock`] so tests can drive
//! time explicitly.

use chrono::{DateTime, Utc};

/// Source of the current UTC time.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

/// Wall clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}
