//! One shake-to-roll cycle.
//!
//! A session opens a fresh entropy pool when motion starts, feeds it
//! from the sampling loop until the sensor re-asserts stillness, then
//! collapses the pool into a single outcome.

use crate::entropy::{EntropyPool, HashAlgorithm};
use crate::outcome::{map_to_range, RangeError};
use crate::sensor::{MotionSensor, RollConfig, SensorError};
use crate::session::IdleClock;
use std::time::Duration;
use thiserror::Error;

/// Errors that can occur while running a session.
#[derive(Debug, Error)]
pub enum SessionError {
    #[error("sensor error: {0}")]
    Sensor(#[from] SensorError),
    #[error("range mapping error: {0}")]
    Range(#[from] RangeError),
}

/// Result of one completed session.
#[derive(Debug, Clone, Copy)]
pub struct SessionOutcome {
    /// The rolled value, in the configured range.
    pub value: i32,
    /// Sample ticks that contributed to the pool.
    pub samples: u64,
    /// Total bytes accumulated, including the entry timestamp.
    pub pool_bytes: u64,
}

/// Runs shake-to-roll cycles against a sensor.
///
/// Holds only configuration; all per-session state (the pool) is
/// created on entry and consumed on exit, so a session can never leak
/// entropy into the next one.
#[derive(Debug, Clone)]
pub struct MotionSession {
    algorithm: HashAlgorithm,
    min: i32,
    max: i32,
    sample_interval: Duration,
}

impl MotionSession {
    /// Creates a session runner for the configured range.
    pub fn new(roll: &RollConfig, algorithm: HashAlgorithm, sample_interval: Duration) -> Self {
        Self {
            algorithm,
            min: roll.min,
            max: roll.max,
            sample_interval,
        }
    }

    /// Runs one session to completion.
    ///
    /// Samples are appended in strict chronological order; the pool is
    /// finalized only after the last tick, and the outcome is computed
    /// from exactly that one pool. Every tick marks activity on the
    /// idle clock.
    pub fn run<S: MotionSensor>(
        &self,
        sensor: &mut S,
        clock: &IdleClock,
    ) -> Result<SessionOutcome, SessionError> {
        self.run_from(sensor, clock, clock.now_us())
    }

    // The entry timestamp is a parameter so tests can rebuild the exact
    // pool a session produces.
    fn run_from<S: MotionSensor>(
        &self,
        sensor: &mut S,
        clock: &IdleClock,
        entry_us: u64,
    ) -> Result<SessionOutcome, SessionError> {
        let mut pool = EntropyPool::new(self.algorithm);

        // The entry timestamp is appended unconditionally so even a
        // vanishingly short shake never finalizes an empty pool.
        pool.append(&entry_us.to_le_bytes());
        clock.touch();

        let mut samples = 0u64;
        while !sensor.is_still()? {
            let sample = sensor.read_sample()?;
            pool.append(&sample.encode());
            clock.touch();
            samples += 1;

            tracing::trace!(
                tick = samples,
                timestamp_us = sample.timestamp_us(),
                "Sampled motion"
            );

            if !self.sample_interval.is_zero() {
                std::thread::sleep(self.sample_interval);
            }
        }

        let pool_bytes = pool.bytes_appended();
        let digest = pool.finalize();
        let value = map_to_range(digest.as_bytes(), self.min, self.max)?;

        tracing::info!(value, samples, pool_bytes, "Shake session complete");
        Ok(SessionOutcome {
            value,
            samples,
            pool_bytes,
        })
    }
}
