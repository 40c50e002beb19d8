//! Time sources for the trajectory engine.
//!
//! The engine never reads the system clock directly; it asks a [`Clock`] for
//! monotonic seconds. [`MonotonicClock`] backs the daemon, [`ManualClock`]
//! lets tests and offline runs step time explicitly.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Instant;

/// Monotonic time source in seconds.
pub trait Clock: Send {
    /// Seconds since an arbitrary fixed origin. Never decreases.
    fn now(&self) -> f64;
}

/// Wall-rate monotonic clock backed by [`Instant`].
#[derive(Debug, Clone)]
pub struct MonotonicClock {
    origin: Instant,
}

impl MonotonicClock {
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
        }
    }
}

impl Default for MonotonicClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for MonotonicClock {
    fn now(&self) -> f64 {
        self.origin.elapsed().as_secs_f64()
    }
}

/// Atomic f64 wrapper using AtomicU64
#[derive(Debug)]
struct AtomicF64(AtomicU64);

impl AtomicF64 {
    fn new(val: f64) -> Self {
        Self(AtomicU64::new(val.to_bits()))
    }

    fn load(&self, order: Ordering) -> f64 {
        f64::from_bits(self.0.load(order))
    }

    fn store(&self, val: f64, order: Ordering) {
        self.0.store(val.to_bits(), order);
    }
}

/// Manually stepped clock.
///
/// Clones share the same time, so a test can keep one handle while the
/// engine owns another.
#[derive(Debug, Clone)]
pub struct ManualClock {
    seconds: Arc<AtomicF64>,
}

impl ManualClock {
    /// Create a clock reading `start` seconds.
    pub fn new(start: f64) -> Self {
        Self {
            seconds: Arc::new(AtomicF64::new(start)),
        }
    }

    /// Move time forward by `dt` seconds. Negative steps are ignored.
    pub fn advance(&self, dt: f64) {
        if dt > 0.0 {
            let now = self.seconds.load(Ordering::Acquire);
            self.seconds.store(now + dt, Ordering::Release);
        }
    }

    /// Jump to an absolute reading. Ignored if it would move time backwards.
    pub fn set(&self, seconds: f64) {
        if seconds >= self.seconds.load(Ordering::Acquire) {
            self.seconds.store(seconds, Ordering::Release);
        }
    }
}

impl Default for ManualClock {
    fn default() -> Self {
        Self::new(0.0)
    }
}

impl Clock for ManualClock {
    fn now(&self) -> f64 {
        self.seconds.load(Ordering::Acquire)
    }
}

/// Epoch bookkeeping for the engine.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ClockState {
    /// Clock reading at the last mode set or reset
    pub epoch: f64,
    /// Seconds since epoch at the previous tick
    pub last_update_time: f64,
}

impl ClockState {
    /// Start a fresh epoch at `now`.
    pub fn started_at(now: f64) -> Self {
        Self {
            epoch: now,
            last_update_time: 0.0,
        }
    }

    /// Re-zero the epoch at `now`.
    #[inline]
    pub fn restart(&mut self, now: f64) {
        *self = Self::started_at(now);
    }

    /// Seconds since epoch.
    #[inline]
    pub fn elapsed(&self, now: f64) -> f64 {
        now - self.epoch
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_manual_clock_shared_between_clones() {
        let clock = ManualClock::new(1.0);
        let other = clock.clone();
        clock.advance(0.5);
        assert_eq!(other.now(), 1.5);
    }

    #[test]
    fn test_manual_clock_never_goes_back() {
        let clock = ManualClock::new(2.0);
        clock.advance(-1.0);
        clock.set(1.0);
        assert_eq!(clock.now(), 2.0);
        clock.set(3.0);
        assert_eq!(clock.now(), 3.0);
    }

    #[test]
    fn test_monotonic_clock_advances() {
        let clock = MonotonicClock::new();
        let a = clock.now();
        let b = clock.now();
        assert!(b >= a);
    }

    #[test]
    fn test_clock_state_restart() {
        let mut state = ClockState::started_at(10.0);
        state.last_update_time = 3.0;
        assert_eq!(state.elapsed(13.5), 3.5);

        state.restart(20.0);
        assert_eq!(state.epoch, 20.0);
        assert_eq!(state.last_update_time, 0.0);
        assert_eq!(state.elapsed(20.25), 0.25);
    }
}
