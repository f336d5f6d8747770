//! Session orchestration.
//!
//! This module drives the shake-to-roll state machine: the controller
//! waits for still/motion transitions, a motion session accumulates
//! entropy while the shake lasts, and the idle watchdog decides when
//! the device should enter its low-power state.

mod controller;
mod idle;
mod motion_session;
mod tasks;

pub use controller::{ControllerError, SessionController};
pub use idle::{IdleClock, IdleSignal, IdleWatchdog};
pub use motion_session::{MotionSession, SessionError, SessionOutcome};
pub use tasks::{spawn_background_tasks, BackgroundTasks};
