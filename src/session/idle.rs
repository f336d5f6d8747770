//! Idle tracking and the low-power decision boundary.
//!
//! The clock records the last observed motion activity; the watchdog
//! compares it against a threshold on its own periodic tick and signals
//! "enter low-power state" exactly once per idle period. The low-power
//! mechanism itself is a platform concern outside this crate.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

/// Timestamp of the last observed motion activity.
///
/// Written only by the session pipeline (every sampling tick), read by
/// the watchdog and display tasks. A single atomic keeps the single-
/// writer/many-reader pattern lock-free.
#[derive(Debug)]
pub struct IdleClock {
    epoch: Instant,
    last_activity_us: AtomicU64,
}

impl IdleClock {
    /// Creates a clock with activity marked "now".
    pub fn new() -> Self {
        Self {
            epoch: Instant::now(),
            last_activity_us: AtomicU64::new(0),
        }
    }

    /// Returns microseconds of monotonic time since the clock was created.
    pub fn now_us(&self) -> u64 {
        self.epoch.elapsed().as_micros() as u64
    }

    /// Marks motion activity at the current instant.
    pub fn touch(&self) {
        self.last_activity_us.store(self.now_us(), Ordering::Relaxed);
    }

    /// Returns the time elapsed since the last observed activity.
    pub fn idle_for(&self) -> Duration {
        let last = self.last_activity_us.load(Ordering::Relaxed);
        Duration::from_micros(self.now_us().saturating_sub(last))
    }
}

impl Default for IdleClock {
    fn default() -> Self {
        Self::new()
    }
}

/// The "enter low-power state" signal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IdleSignal {
    /// How long the device had been idle when the signal fired.
    pub idle_for: Duration,
}

/// Decides when idle time warrants suspending the device.
///
/// Fires at most once per idle period: after signaling, the watchdog
/// stays quiet until activity resets the clock, which re-arms it.
#[derive(Debug)]
pub struct IdleWatchdog {
    threshold: Duration,
    signaled: bool,
}

impl IdleWatchdog {
    /// Creates a watchdog with the given idle threshold.
    pub fn new(threshold: Duration) -> Self {
        Self {
            threshold,
            signaled: false,
        }
    }

    /// Evaluates the clock on one check tick.
    ///
    /// Returns the low-power signal when idle time first exceeds the
    /// threshold; `None` while active or while already signaled.
    pub fn check(&mut self, clock: &IdleClock) -> Option<IdleSignal> {
        let idle_for = clock.idle_for();

        if idle_for < self.threshold {
            // Activity since the last signal re-arms the watchdog.
            self.signaled = false;
            return None;
        }

        if self.signaled {
            return None;
        }
        self.signaled = true;

        tracing::warn!(
            idle_secs = idle_for.as_secs(),
            threshold_secs = self.threshold.as_secs(),
            "Idle threshold exceeded; requesting low-power state"
        );
        Some(IdleSignal { idle_for })
    }

    /// Returns the time remaining before the signal would fire.
    pub fn remaining(&self, clock: &IdleClock) -> Duration {
        self.threshold.saturating_sub(clock.idle_for())
    }

    /// Returns the configured threshold.
    pub fn threshold(&self) -> Duration {
        self.threshold
    }
}
