//! Clock abstraction (injectable for testing).
//!
//! Injecting this rather than calling `Utc::now()` directly lets timing
//! sensitive code — cron `next()` computation, timer admission checks — be
//! driven deterministically in tests instead of sleeping in wall-clock time.

use chrono::{DateTime, Utc};

/// Provides the current wall-clock time.
pub trait Clock: Send + Sync {
    /// Returns the current instant.
    fn now(&self) -> DateTime<Utc>;
}

/// The default [`Clock`] implementation, backed by the system clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}
