//! Running frequency distribution of outcomes.
//!
//! One writer (the session pipeline) records outcomes; display tasks
//! read snapshots concurrently. The tracker defends its own range
//! invariant even though a correctly wired mapper never violates it.

use std::collections::BTreeMap;
use thiserror::Error;

/// Errors that can occur when recording outcomes.
#[derive(Debug, Clone, Error)]
pub enum TrackerError {
    #[error("outcome {value} outside configured range [{min}, {max}]")]
    OutOfRange { value: i32, min: i32, max: i32 },
}

/// A read-only copy of the distribution at one point in time.
#[derive(Debug, Clone)]
pub struct DistributionSnapshot {
    /// Occurrence count for every value in the configured range.
    pub counts: BTreeMap<i32, u64>,
    /// Total outcomes recorded.
    pub total: u64,
}

/// Tracks how often each outcome value has occurred.
///
/// Every value in `[min, max]` is present from initialization, so
/// consumers never see missing keys. Counts persist for the process
/// lifetime (and optionally across power cycles via
/// [`persist`](crate::outcome::persist)).
#[derive(Debug, Clone)]
pub struct OutcomeTracker {
    min: i32,
    max: i32,
    counts: BTreeMap<i32, u64>,
    total: u64,
}

impl OutcomeTracker {
    /// Creates a tracker with every value in `[min, max]` at count zero.
    ///
    /// Descending bounds are normalized by swapping, consistent with
    /// the range mapper.
    pub fn new(min: i32, max: i32) -> Self {
        let (min, max) = if min <= max { (min, max) } else { (max, min) };
        let counts = (min..=max).map(|v| (v, 0)).collect();
        Self {
            min,
            max,
            counts,
            total: 0,
        }
    }

    /// Records one outcome.
    pub fn record(&mut self, value: i32) -> Result<(), TrackerError> {
        let count = self
            .counts
            .get_mut(&value)
            .ok_or(TrackerError::OutOfRange {
                value,
                min: self.min,
                max: self.max,
            })?;
        *count += 1;
        self.total += 1;

        tracing::debug!(value, total = self.total, "Recorded outcome");
        Ok(())
    }

    /// Returns a side-effect-free copy of the current distribution.
    pub fn snapshot(&self) -> DistributionSnapshot {
        DistributionSnapshot {
            counts: self.counts.clone(),
            total: self.total,
        }
    }

    /// Returns the occurrence percentage for one value.
    ///
    /// Rounded half-away-from-zero; 0 when nothing has been recorded
    /// yet or the value is out of range.
    pub fn percentage(&self, value: i32) -> u32 {
        if self.total == 0 {
            return 0;
        }
        match self.counts.get(&value) {
            Some(&count) => (100.0 * count as f64 / self.total as f64).round() as u32,
            None => 0,
        }
    }

    /// Returns the percentage for every value in the range.
    pub fn percentages(&self) -> BTreeMap<i32, u32> {
        self.counts
            .keys()
            .map(|&v| (v, self.percentage(v)))
            .collect()
    }

    /// Returns the total outcomes recorded.
    pub fn total(&self) -> u64 {
        self.total
    }

    /// Returns the lowest value tracked.
    pub fn min(&self) -> i32 {
        self.min
    }

    /// Returns the highest value tracked.
    pub fn max(&self) -> i32 {
        self.max
    }

    /// Resets every count to zero.
    pub fn reset(&mut self) {
        for count in self.counts.values_mut() {
            *count = 0;
        }
        self.total = 0;
        tracing::info!("Outcome tracker reset");
    }

    /// Restores counts from persisted state.
    ///
    /// Values outside the configured range are ignored; the caller is
    /// expected to have checked the range identity first.
    pub(crate) fn restore_counts(&mut self, saved: &BTreeMap<i32, u64>) {
        for (&value, &count) in saved {
            if let Some(slot) = self.counts.get_mut(&value) {
                *slot = count;
            }
        }
        self.total = self.counts.values().sum();
    }
}
