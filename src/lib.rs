//! Shake Dice Library
//!
//! Turns physical shaking of a handheld device into a single discrete
//! outcome in a configurable range, using motion-sensor samples as a
//! raw entropy source and a cryptographic digest as the debiasing step.
//!
//! # Architecture
//!
//! The system follows an explicit data flow:
//!
//! ```text
//! sensor → session (sampling loop) → entropy pool → range mapper
//!                                                        ↓
//!                      display ← outcome tracker ← outcome
//! ```
//!
//! # Design Principles
//!
//! - **Exact uniformity**: rejection sampling over hashed bits, never a
//!   bare modulo (the modulo fallback exists only for totality and is
//!   flagged when it triggers)
//! - **One pool per session**: opened at motion start, consumed exactly
//!   once at motion end; the type system forbids reuse
//! - **Single writer**: only the session pipeline mutates the tracker
//!   and idle clock; periodic display tasks are read-only
//! - **Narrow collaborators**: chip registers, panel layout and power
//!   sequencing stay behind the sensor and display traits
//!
//! # Example
//!
//! ```no_run
//! use shake_dice::{
//!     entropy::HashAlgorithm,
//!     sensor::{MockMotionSensor, MotionSensor, RollConfig, SensorConfig},
//!     session::{IdleClock, MotionSession},
//! };
//! use std::time::Duration;
//!
//! // One scripted shake lasting twelve sample ticks.
//! let mut sensor = MockMotionSensor::with_script(vec![12]);
//! sensor.open(&SensorConfig::default()).unwrap();
//! sensor.wait_for_transition().unwrap();
//!
//! let session = MotionSession::new(
//!     &RollConfig::default(),
//!     HashAlgorithm::Blake3,
//!     Duration::from_millis(100),
//! );
//! let clock = IdleClock::new();
//!
//! let outcome = session.run(&mut sensor, &clock).unwrap();
//! println!("rolled {}", outcome.value);
//! ```

#![warn(missing_docs)]
#![warn(rust_2018_idioms)]
#![deny(unsafe_code)]

pub mod display;
pub mod entropy;
pub mod metrics;
pub mod outcome;
pub mod sensor;
pub mod session;

// Re-export commonly used types at crate root
pub use display::{ConsoleDisplay, RollDisplay};
pub use entropy::{EntropyPool, HashAlgorithm, PoolDigest};
pub use outcome::{map_to_range, DistributionSnapshot, OutcomeTracker};
pub use sensor::{MockMotionSensor, MotionSensor, MotionTransition, SampleEvent};
pub use session::{IdleClock, IdleWatchdog, MotionSession, SessionController};

/// Library version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
