//! Top-level session loop.
//!
//! Blocks on sensor transition events and runs one motion session at a
//! time. Sessions are strictly sequential: a new pool is never opened
//! before the previous outcome has been recorded and shown.
//!
//! Shared-state ownership is explicit. The controller is the only
//! writer of the tracker and the idle clock; periodic background tasks
//! only read them. All display writes, from any task, serialize
//! through a single mutex because the underlying surface is not safe
//! for concurrent writers.

use crate::display::RollDisplay;
use crate::metrics::RollStats;
use crate::outcome::{OutcomeTracker, TrackerError};
use crate::sensor::{MotionSensor, MotionTransition, SensorError};
use crate::session::{IdleClock, MotionSession, SessionError};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, RwLock};
use thiserror::Error;

/// Errors that can stop the controller loop.
#[derive(Debug, Error)]
pub enum ControllerError {
    #[error("sensor error: {0}")]
    Sensor(#[from] SensorError),
    #[error("session error: {0}")]
    Session(#[from] SessionError),
    #[error("tracker error: {0}")]
    Tracker(#[from] TrackerError),
}

/// Owns the sensor and drives shake sessions to completion.
pub struct SessionController<S: MotionSensor> {
    sensor: S,
    session: MotionSession,
    tracker: Arc<RwLock<OutcomeTracker>>,
    display: Arc<Mutex<dyn RollDisplay>>,
    clock: Arc<IdleClock>,
    running: Arc<AtomicBool>,
    stats: Arc<RollStats>,
    sessions_completed: u64,
}

impl<S: MotionSensor> SessionController<S> {
    /// Creates a controller over an opened sensor.
    pub fn new(
        sensor: S,
        session: MotionSession,
        tracker: Arc<RwLock<OutcomeTracker>>,
        display: Arc<Mutex<dyn RollDisplay>>,
        clock: Arc<IdleClock>,
        running: Arc<AtomicBool>,
        stats: Arc<RollStats>,
    ) -> Self {
        Self {
            sensor,
            session,
            tracker,
            display,
            clock,
            running,
            stats,
            sessions_completed: 0,
        }
    }

    /// Returns the number of sessions completed so far.
    pub fn sessions_completed(&self) -> u64 {
        self.sessions_completed
    }

    /// Runs the controller loop until the sensor closes or a stop is
    /// requested.
    pub fn run(&mut self) -> Result<(), ControllerError> {
        while self.running.load(Ordering::Relaxed) {
            match self.sensor.wait_for_transition() {
                Ok(MotionTransition::StillToMotion) => self.handle_shake()?,
                Ok(MotionTransition::MotionToStill) => {
                    // Duplicate or spurious settle event outside a session.
                    tracing::debug!("Ignoring motion-to-still transition outside a session");
                }
                Err(SensorError::Closed) => {
                    tracing::info!(
                        sessions = self.sessions_completed,
                        "Sensor closed; stopping controller"
                    );
                    break;
                }
                Err(e) => return Err(e.into()),
            }
        }
        Ok(())
    }

    fn handle_shake(&mut self) -> Result<(), ControllerError> {
        self.clock.touch();
        let outcome = self.session.run(&mut self.sensor, &self.clock)?;

        // Record happens-after finalization, before the outcome is shown.
        {
            let mut tracker = self.tracker.write().expect("tracker lock poisoned");
            tracker.record(outcome.value)?;
        }
        {
            let mut display = self.display.lock().expect("display lock poisoned");
            display.show_outcome(outcome.value);
        }

        self.stats
            .record_session(outcome.samples, outcome.pool_bytes, outcome.value);
        self.sessions_completed += 1;
        tracing::info!(
            value = outcome.value,
            samples = outcome.samples,
            sessions = self.sessions_completed,
            "Session outcome recorded"
        );
        Ok(())
    }
}
