//! Wall-clock sources for note timestamps.

use std::sync::atomic::{AtomicI64, Ordering};

/// Source of "now" in Unix milliseconds.
pub trait Clock: Send + Sync {
    fn now_millis(&self) -> i64;
}

/// System wall clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_millis(&self) -> i64 {
        chrono::Utc::now().timestamp_millis()
    }
}

/// Manually driven clock for deterministic tests and replays.
#[derive(Debug, Default)]
pub struct ManualClock {
    now: AtomicI64,
}

impl ManualClock {
    #[must_use]
    pub const fn new(now_millis: i64) -> Self {
        Self {
            now: AtomicI64::new(now_millis),
        }
    }

    pub fn set(&self, now_millis: i64) {
        self.now.store(now_millis, Ordering::SeqCst);
    }

    pub fn advance(&self, millis: i64) {
        self.now.fetch_add(millis, Ordering::SeqCst);
    }
}

impl Clock for ManualClock {
    fn now_millis(&self) -> i64 {
        self.now.load(Ordering::SeqCst)
    }
}

/// Issues write timestamps that never repeat or go backwards, even when the
/// underlying clock stalls or jumps back.
#[derive(Debug, Default)]
pub(crate) struct TimestampIssuer {
    last_issued: AtomicI64,
}

impl TimestampIssuer {
    pub(crate) fn next(&self, clock: &dyn Clock) -> i64 {
        let now = clock.now_millis();
        let mut previous = self.last_issued.load(Ordering::SeqCst);
        loop {
            let candidate = if now > previous { now } else { previous + 1 };
            match self.last_issued.compare_exchange(
                previous,
                candidate,
                Ordering::SeqCst,
                Ordering::SeqCst,
            ) {
                Ok(_) => return candidate,
                Err(actual) => previous = actual,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn issuer_uses_clock_reading_when_it_advances() {
        let clock = ManualClock::new(1_000);
        let issuer = TimestampIssuer::default();
        assert_eq!(issuer.next(&clock), 1_000);
        clock.advance(50);
        assert_eq!(issuer.next(&clock), 1_050);
    }

    #[test]
    fn issuer_strictly_increases_on_stalled_clock() {
        let clock = ManualClock::new(1_000);
        let issuer = TimestampIssuer::default();
        assert_eq!(issuer.next(&clock), 1_000);
        assert_eq!(issuer.next(&clock), 1_001);
        clock.set(900);
        assert_eq!(issuer.next(&clock), 1_002);
    }

    #[test]
    fn system_clock_is_positive() {
        assert!(SystemClock.now_millis() > 0);
    }
}
