//! Motion sensor input and sample handling.
//!
//! This module provides abstractions for observing still/motion
//! transitions and reading 3-axis samples. The sensor is treated as a
//! source of raw physical data, not as a source of entropy directly.

mod config;
mod motion;
mod sample;

pub use config::{
    ConfigError, DisplayConfig, FileConfig, IdleConfig, MetricsConfig, RollConfig, SensorConfig,
};
pub use motion::{MockMotionSensor, MotionSensor, MotionTransition, SensorError};
pub use sample::{SampleEvent, ENCODED_SAMPLE_LEN};
