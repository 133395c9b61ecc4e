//! Wall-clock abstraction.
//!
//! Request timestamps and token expiries are computed from an injected
//! [`Clock`] so tests can pin the current time instead of sleeping.

use chrono::{DateTime, Utc};

/// Source of the current wall-clock time.
pub trait Clock: Send + Sync + std::fmt::Debug {
    /// Current time.
    fn now(&self) -> DateTime<Utc>;
}

/// [`Clock`] backed by the system clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn system_clock_tracks_utc_now() {
        let clock = SystemClock;
        let delta = (clock.now() - Utc::now()).num_seconds().abs();
        assert!(delta <= 1);
    }

    #[test]
    fn clock_is_object_safe() {
        let clock: Box<dyn Clock> = Box::new(SystemClock);
        assert!(clock.now().timestamp() > 0);
    }
}
