//! Motion sensor abstraction.
//!
//! This module provides a trait-based abstraction over the inertial
//! sensor hardware, allowing for both a real interrupt-driven driver
//! and mock implementations for testing. The chip-specific register
//! plumbing lives behind this trait and never leaks into the core.

use super::{SampleEvent, SensorConfig};
use thiserror::Error;

/// Errors that can occur during sensor operations.
#[derive(Debug, Error)]
pub enum SensorError {
    #[error("sensor device not found: {0}")]
    DeviceNotFound(String),
    #[error("failed to configure sensor: {0}")]
    ConfigFailed(String),
    #[error("failed to read sample: {0}")]
    ReadFailed(String),
    #[error("sensor not initialized")]
    NotInitialized,
    #[error("sensor closed, no further transitions")]
    Closed,
}

/// A still/motion state transition reported by the sensor.
///
/// Transitions are interrupt-driven on real hardware: the chip asserts
/// motion when acceleration exceeds the configured threshold for the
/// configured duration, and zero-motion when it stays below the still
/// threshold long enough.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MotionTransition {
    /// The device started moving after being at rest.
    StillToMotion,
    /// The device settled back to rest.
    MotionToStill,
}

/// Trait for motion sensor implementations.
///
/// This abstraction allows swapping between real sensor hardware
/// and mock implementations for testing.
pub trait MotionSensor {
    /// Opens and initializes the sensor with the given configuration.
    fn open(&mut self, config: &SensorConfig) -> Result<(), SensorError>;

    /// Blocks until the next still/motion transition.
    fn wait_for_transition(&mut self) -> Result<MotionTransition, SensorError>;

    /// Reads one 3-axis sample.
    fn read_sample(&mut self) -> Result<SampleEvent, SensorError>;

    /// Returns true if the zero-motion condition is currently asserted.
    fn is_still(&mut self) -> Result<bool, SensorError>;
}

/// Mock sensor for testing that plays back scripted shakes.
///
/// Each entry in the script is the number of sample ticks one shake
/// lasts before the still condition re-asserts. Once the script is
/// exhausted, `wait_for_transition` reports [`SensorError::Closed`].
#[derive(Debug, Default)]
pub struct MockMotionSensor {
    config: Option<SensorConfig>,
    script: Vec<u32>,
    next_shake: usize,
    ticks_remaining: u32,
    sequence: u64,
}

impl MockMotionSensor {
    /// Creates a mock sensor that will report one shake per script entry.
    pub fn with_script(script: Vec<u32>) -> Self {
        Self {
            script,
            ..Self::default()
        }
    }

    /// Returns the number of shakes played back so far.
    pub fn shakes_played(&self) -> usize {
        self.next_shake
    }
}

impl MotionSensor for MockMotionSensor {
    fn open(&mut self, config: &SensorConfig) -> Result<(), SensorError> {
        config
            .validate()
            .map_err(|e| SensorError::ConfigFailed(e.to_string()))?;
        self.config = Some(config.clone());
        tracing::info!("MockMotionSensor opened with config: {:?}", config);
        Ok(())
    }

    fn wait_for_transition(&mut self) -> Result<MotionTransition, SensorError> {
        if self.config.is_none() {
            return Err(SensorError::NotInitialized);
        }
        if self.next_shake >= self.script.len() {
            return Err(SensorError::Closed);
        }
        self.ticks_remaining = self.script[self.next_shake];
        self.next_shake += 1;
        Ok(MotionTransition::StillToMotion)
    }

    fn read_sample(&mut self) -> Result<SampleEvent, SensorError> {
        if self.config.is_none() {
            return Err(SensorError::NotInitialized);
        }

        // Simple deterministic pattern mixed with sequence.
        // NOT for entropy - only for testing the sampling pipeline.
        self.sequence += 1;
        let s = self.sequence;
        let accel = [
            ((s * 7) % 19) as f32 * 0.1,
            ((s * 11) % 23) as f32 * 0.1,
            9.8 + ((s * 13) % 5) as f32 * 0.01,
        ];
        let gyro = [
            ((s * 3) % 17) as f32,
            ((s * 5) % 29) as f32,
            ((s * 2) % 31) as f32,
        ];
        Ok(SampleEvent::new(s * 1_000, accel, gyro))
    }

    fn is_still(&mut self) -> Result<bool, SensorError> {
        if self.config.is_none() {
            return Err(SensorError::NotInitialized);
        }
        if self.ticks_remaining == 0 {
            return Ok(true);
        }
        self.ticks_remaining -= 1;
        Ok(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mock_sensor_lifecycle() {
        let mut sensor = MockMotionSensor::with_script(vec![3]);
        let config = SensorConfig::default();

        assert!(matches!(
            sensor.wait_for_transition(),
            Err(SensorError::NotInitialized)
        ));

        sensor.open(&config).unwrap();
        assert_eq!(
            sensor.wait_for_transition().unwrap(),
            MotionTransition::StillToMotion
        );

        // Three ticks of motion, then still re-asserts.
        for _ in 0..3 {
            assert!(!sensor.is_still().unwrap());
            sensor.read_sample().unwrap();
        }
        assert!(sensor.is_still().unwrap());
    }

    #[test]
    fn test_mock_sensor_script_exhaustion() {
        let mut sensor = MockMotionSensor::with_script(vec![1]);
        sensor.open(&SensorConfig::default()).unwrap();

        sensor.wait_for_transition().unwrap();
        assert!(matches!(
            sensor.wait_for_transition(),
            Err(SensorError::Closed)
        ));
        assert_eq!(sensor.shakes_played(), 1);
    }

    #[test]
    fn test_mock_samples_advance() {
        let mut sensor = MockMotionSensor::with_script(vec![2]);
        sensor.open(&SensorConfig::default()).unwrap();
        sensor.wait_for_transition().unwrap();

        let a = sensor.read_sample().unwrap();
        let b = sensor.read_sample().unwrap();
        assert!(b.timestamp_us() > a.timestamp_us());
    }
}
