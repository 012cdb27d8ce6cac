//! Creation-time sources.
//!
//! # Invariants
//! - `MonotonicClock` never returns a timestamp earlier than one it already
//!   returned, even if the system clock steps backwards.

use chrono::{DateTime, Utc};
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::Mutex;

/// Source of `created`/`changed` timestamps.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

/// System clock clamped to be non-decreasing at microsecond precision.
#[derive(Debug, Default)]
pub struct MonotonicClock {
    last_micros: AtomicI64,
}

impl MonotonicClock {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Clock for MonotonicClock {
    fn now(&self) -> DateTime<Utc> {
        let system = Utc::now();
        let system_micros = system.timestamp_micros();
        let previous = self.last_micros.fetch_max(system_micros, Ordering::SeqCst);
        if previous <= system_micros {
            return system;
        }
        DateTime::<Utc>::from_timestamp_micros(previous).unwrap_or(system)
    }
}

/// Manually driven clock, advancing by a fixed step on every read.
#[derive(Debug)]
pub struct ManualClock {
    state: Mutex<DateTime<Utc>>,
    step: chrono::Duration,
}

impl ManualClock {
    /// Clock frozen at `start`.
    pub fn new(start: DateTime<Utc>) -> Self {
        Self::stepping(start, chrono::Duration::zero())
    }

    /// Clock returning `start`, `start + step`, `start + 2*step`, ...
    pub fn stepping(start: DateTime<Utc>, step: chrono::Duration) -> Self {
        Self {
            state: Mutex::new(start),
            step,
        }
    }

    pub fn set(&self, value: DateTime<Utc>) {
        let mut state = self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        *state = value;
    }
}

impl Clock for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        let mut state = self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        let current = *state;
        *state = current + self.step;
        current
    }
}

#[cfg(test)]
mod tests {
    use super::{Clock, ManualClock, MonotonicClock};
    use chrono::{Duration, TimeZone, Utc};

    #[test]
    fn monotonic_clock_never_goes_backwards() {
        let clock = MonotonicClock::new();
        let mut previous = clock.now();
        for _ in 0..1_000 {
            let next = clock.now();
            assert!(next >= previous);
            previous = next;
        }
    }

    #[test]
    fn monotonic_clock_clamps_to_last_issued_value() {
        let clock = MonotonicClock::new();
        let future = Utc::now() + Duration::hours(1);
        clock
            .last_micros
            .store(future.timestamp_micros(), std::sync::atomic::Ordering::SeqCst);
        assert_eq!(clock.now().timestamp_micros(), future.timestamp_micros());
    }

    #[test]
    fn manual_clock_steps_on_every_read() {
        let start = Utc.with_ymd_and_hms(2024, 5, 1, 0, 0, 0).unwrap();
        let clock = ManualClock::stepping(start, Duration::seconds(2));
        assert_eq!(clock.now(), start);
        assert_eq!(clock.now(), start + Duration::seconds(2));
        clock.set(start);
        assert_eq!(clock.now(), start);
    }
}
