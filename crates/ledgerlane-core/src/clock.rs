//! Clock abstraction for determinism.

use chrono::{DateTime, Utc};

/// Abstraction over wall-clock time so turn timing and cooldowns can be
/// driven deterministically in tests.
pub trait Clock: Send + Sync {
    /// Returns the current time.
    fn now(&self) -> DateTime<Utc>;

    /// Milliseconds elapsed since `earlier`, saturating at zero when the
    /// clock reads earlier than `earlier`.
    fn millis_since(&self, earlier: DateTime<Utc>) -> u64 {
        let elapsed = self.now().signed_duration_since(earlier).num_milliseconds();
        u64::try_from(elapsed).unwrap_or(0)
    }
}

/// Production clock that delegates to the system clock.
#[derive(Debug, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}
