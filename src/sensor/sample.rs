//! Sample type representing one motion reading with metadata.

/// Serialized size of a sample: 8-byte timestamp + 6 IEEE-754 f32 values.
pub const ENCODED_SAMPLE_LEN: usize = 32;

/// A single 3-axis motion reading from the sensor.
///
/// Contains a monotonic timestamp along with accelerometer and
/// gyroscope values. Samples are immutable once produced and feed
/// directly into the entropy pool during an active session.
#[derive(Clone, Copy, PartialEq)]
pub struct SampleEvent {
    /// Monotonic timestamp in microseconds.
    timestamp_us: u64,
    /// Acceleration on x/y/z in g.
    accel: [f32; 3],
    /// Angular rate on x/y/z in degrees per second.
    gyro: [f32; 3],
}

impl SampleEvent {
    /// Creates a new sample event.
    pub fn new(timestamp_us: u64, accel: [f32; 3], gyro: [f32; 3]) -> Self {
        Self {
            timestamp_us,
            accel,
            gyro,
        }
    }

    /// Returns the monotonic timestamp in microseconds.
    #[inline]
    pub fn timestamp_us(&self) -> u64 {
        self.timestamp_us
    }

    /// Returns the acceleration triple.
    #[inline]
    pub fn accel(&self) -> [f32; 3] {
        self.accel
    }

    /// Returns the angular-rate triple.
    #[inline]
    pub fn gyro(&self) -> [f32; 3] {
        self.gyro
    }

    /// Serializes the sample for entropy accumulation.
    ///
    /// Layout is fixed and documented for reproducibility: the 8-byte
    /// little-endian microsecond timestamp, then the three acceleration
    /// floats, then the three angular-rate floats, each as little-endian
    /// IEEE-754 single precision. Unpredictability comes from the sampled
    /// physical values, not from the encoding being secret.
    pub fn encode(&self) -> [u8; ENCODED_SAMPLE_LEN] {
        let mut out = [0u8; ENCODED_SAMPLE_LEN];
        out[..8].copy_from_slice(&self.timestamp_us.to_le_bytes());
        for (i, v) in self.accel.iter().enumerate() {
            out[8 + i * 4..8 + (i + 1) * 4].copy_from_slice(&v.to_le_bytes());
        }
        for (i, v) in self.gyro.iter().enumerate() {
            out[20 + i * 4..20 + (i + 1) * 4].copy_from_slice(&v.to_le_bytes());
        }
        out
    }
}

impl std::fmt::Debug for SampleEvent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SampleEvent")
            .field("timestamp_us", &self.timestamp_us)
            .field("accel", &self.accel)
            .field("gyro", &self.gyro)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode_layout() {
        let sample = SampleEvent::new(0x0102030405060708, [1.0, 2.0, 3.0], [4.0, 5.0, 6.0]);
        let bytes = sample.encode();

        assert_eq!(bytes.len(), ENCODED_SAMPLE_LEN);
        assert_eq!(&bytes[..8], &0x0102030405060708u64.to_le_bytes());
        assert_eq!(&bytes[8..12], &1.0f32.to_le_bytes());
        assert_eq!(&bytes[16..20], &3.0f32.to_le_bytes());
        assert_eq!(&bytes[20..24], &4.0f32.to_le_bytes());
        assert_eq!(&bytes[28..32], &6.0f32.to_le_bytes());
    }

    #[test]
    fn test_encode_is_stable() {
        let sample = SampleEvent::new(42, [0.1, -0.2, 9.8], [10.0, -20.0, 0.5]);
        assert_eq!(sample.encode(), sample.encode());
    }

    #[test]
    fn test_different_samples_encode_differently() {
        let a = SampleEvent::new(1, [0.0; 3], [0.0; 3]);
        let b = SampleEvent::new(2, [0.0; 3], [0.0; 3]);
        assert_ne!(a.encode(), b.encode());
    }
}
