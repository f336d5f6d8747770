//! Sensor and session configuration.
//!
//! Motion/still thresholds are pass-through knobs for the sensor
//! hardware; the core never reinterprets them. Fixed values keep the
//! shake-detection behavior consistent across power cycles.

use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// Configuration for the motion sensor.
///
/// Threshold and duration values are forwarded verbatim to the sensor's
/// interrupt engine; only the sampling interval is consumed by the core.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SensorConfig {
    /// Acceleration threshold that asserts motion, in mg.
    pub motion_threshold_mg: u16,
    /// How long acceleration must exceed the threshold, in ms.
    pub motion_duration_ms: u16,
    /// Acceleration threshold below which stillness counts, in mg.
    pub still_threshold_mg: u16,
    /// How long the device must stay still to re-assert zero motion, in ms.
    pub still_duration_ms: u16,
    /// Period of the sampling loop during an active session, in ms.
    pub sample_interval_ms: u64,
}

impl Default for SensorConfig {
    fn default() -> Self {
        Self {
            motion_threshold_mg: 40,
            motion_duration_ms: 5,
            still_threshold_mg: 20,
            still_duration_ms: 1000,
            sample_interval_ms: 100,
        }
    }
}

impl SensorConfig {
    /// Returns the sampling interval as a [`Duration`].
    pub fn sample_interval(&self) -> Duration {
        Duration::from_millis(self.sample_interval_ms)
    }

    /// Validates the configuration parameters.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.motion_threshold_mg == 0 || self.still_threshold_mg == 0 {
            return Err(ConfigError::InvalidThreshold);
        }
        if self.sample_interval_ms == 0 || self.sample_interval_ms > 10_000 {
            return Err(ConfigError::InvalidSampleInterval);
        }
        Ok(())
    }
}

/// Configuration of the outcome range.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RollConfig {
    /// Lowest outcome value, inclusive.
    pub min: i32,
    /// Highest outcome value, inclusive.
    pub max: i32,
}

impl Default for RollConfig {
    fn default() -> Self {
        // A standard D6.
        Self { min: 1, max: 6 }
    }
}

impl RollConfig {
    /// Identity string for the configured range.
    ///
    /// Used to key persisted distribution counts: "D6" for a 1-based
    /// range, otherwise "R{min}-{max}".
    pub fn range_identity(&self) -> String {
        let (min, max) = if self.min <= self.max {
            (self.min, self.max)
        } else {
            (self.max, self.min)
        };
        if min == 1 {
            format!("D{max}")
        } else {
            format!("R{min}-{max}")
        }
    }
}

/// Idle watchdog configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IdleConfig {
    /// Idle time after which the low-power signal fires, in seconds.
    pub idle_threshold_secs: u64,
    /// Period of the watchdog check tick, in ms.
    pub check_interval_ms: u64,
}

impl Default for IdleConfig {
    fn default() -> Self {
        Self {
            idle_threshold_secs: 60,
            check_interval_ms: 500,
        }
    }
}

impl IdleConfig {
    /// Returns the idle threshold as a [`Duration`].
    pub fn idle_threshold(&self) -> Duration {
        Duration::from_secs(self.idle_threshold_secs)
    }

    /// Returns the check interval as a [`Duration`].
    pub fn check_interval(&self) -> Duration {
        Duration::from_millis(self.check_interval_ms)
    }

    /// Validates the configuration parameters.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.idle_threshold_secs == 0 || self.check_interval_ms == 0 {
            return Err(ConfigError::InvalidIdleSettings);
        }
        Ok(())
    }
}

/// Display refresh configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DisplayConfig {
    /// Period of the distribution refresh task, in ms.
    pub refresh_interval_ms: u64,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            refresh_interval_ms: 1000,
        }
    }
}

impl DisplayConfig {
    /// Returns the refresh interval as a [`Duration`].
    pub fn refresh_interval(&self) -> Duration {
        Duration::from_millis(self.refresh_interval_ms)
    }
}

/// Metrics exporter configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetricsConfig {
    /// Port the Prometheus exporter binds to, all interfaces.
    pub exporter_port: u16,
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self {
            exporter_port: 9090,
        }
    }
}

/// Configuration validation errors.
#[derive(Debug, Clone, thiserror::Error)]
pub enum ConfigError {
    #[error("motion/still thresholds must be non-zero")]
    InvalidThreshold,
    #[error("sample interval must be 1-10000 ms")]
    InvalidSampleInterval,
    #[error("idle threshold and check interval must be non-zero")]
    InvalidIdleSettings,
    #[error("failed to read config file: {0}")]
    FileReadError(String),
    #[error("failed to parse config file: {0}")]
    ParseError(String),
}

/// Full configuration file format.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct FileConfig {
    #[serde(default)]
    pub sensor: SensorConfig,
    #[serde(default)]
    pub roll: RollConfig,
    #[serde(default)]
    pub idle: IdleConfig,
    #[serde(default)]
    pub display: DisplayConfig,
    #[serde(default)]
    pub metrics: MetricsConfig,
}

impl FileConfig {
    /// Loads configuration from a TOML file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path.as_ref())
            .map_err(|e| ConfigError::FileReadError(e.to_string()))?;
        let config: FileConfig =
            toml::from_str(&content).map_err(|e| ConfigError::ParseError(e.to_string()))?;
        config.sensor.validate()?;
        config.idle.validate()?;
        Ok(config)
    }
}
