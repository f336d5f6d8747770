//! Metrics collection and registry.

use crate::outcome::DistributionSnapshot;
use prometheus::{Encoder, IntCounter, IntGauge, Registry, TextEncoder};
use std::sync::atomic::{AtomicBool, AtomicI64, AtomicU64, Ordering};
use thiserror::Error;

/// Errors that can occur during metrics operations.
#[derive(Debug, Error)]
pub enum MetricsError {
    #[error("prometheus error: {0}")]
    Prometheus(#[from] prometheus::Error),
}

/// A snapshot of system state for metrics update.
#[derive(Debug, Clone, Default)]
pub struct RollMetricsSnapshot {
    /// Total shake sessions completed.
    pub sessions_total: u64,
    /// Total sample ticks fed into entropy pools.
    pub samples_total: u64,
    /// Total bytes accumulated across all pools.
    pub pool_bytes_total: u64,
    /// Total low-power signals emitted by the idle watchdog.
    pub idle_signals_total: u64,
    /// Total outcomes recorded in the distribution.
    pub outcomes_total: u64,
    /// Most recent outcome value, if any session has completed.
    pub last_outcome: Option<i32>,
}

impl RollMetricsSnapshot {
    /// Builds a snapshot from the distribution and controller counters.
    pub fn from_components(
        distribution: &DistributionSnapshot,
        sessions_total: u64,
        samples_total: u64,
        pool_bytes_total: u64,
        idle_signals_total: u64,
        last_outcome: Option<i32>,
    ) -> Self {
        Self {
            sessions_total,
            samples_total,
            pool_bytes_total,
            idle_signals_total,
            outcomes_total: distribution.total,
            last_outcome,
        }
    }
}

/// Live pipeline counters shared with the metrics exporter.
///
/// The controller loop records completed sessions; the idle watchdog
/// task records low-power signals. Plain relaxed atomics: a scrape can
/// never block the session pipeline.
#[derive(Debug, Default)]
pub struct RollStats {
    sessions: AtomicU64,
    samples: AtomicU64,
    pool_bytes: AtomicU64,
    idle_signals: AtomicU64,
    last_outcome: AtomicI64,
    has_outcome: AtomicBool,
}

impl RollStats {
    /// Records one completed shake session.
    pub fn record_session(&self, samples: u64, pool_bytes: u64, value: i32) {
        self.sessions.fetch_add(1, Ordering::Relaxed);
        self.samples.fetch_add(samples, Ordering::Relaxed);
        self.pool_bytes.fetch_add(pool_bytes, Ordering::Relaxed);
        self.last_outcome.store(value as i64, Ordering::Relaxed);
        self.has_outcome.store(true, Ordering::Relaxed);
    }

    /// Records one low-power signal from the idle watchdog.
    pub fn record_idle_signal(&self) {
        self.idle_signals.fetch_add(1, Ordering::Relaxed);
    }

    /// Sessions recorded so far.
    pub fn sessions(&self) -> u64 {
        self.sessions.load(Ordering::Relaxed)
    }

    /// Low-power signals recorded so far.
    pub fn idle_signals(&self) -> u64 {
        self.idle_signals.load(Ordering::Relaxed)
    }

    /// Most recent outcome value, if any session has completed.
    pub fn last_outcome(&self) -> Option<i32> {
        self.has_outcome
            .load(Ordering::Relaxed)
            .then(|| self.last_outcome.load(Ordering::Relaxed) as i32)
    }

    /// Folds the counters and a distribution into a metrics snapshot.
    pub fn snapshot(&self, distribution: &DistributionSnapshot) -> RollMetricsSnapshot {
        RollMetricsSnapshot::from_components(
            distribution,
            self.sessions(),
            self.samples.load(Ordering::Relaxed),
            self.pool_bytes.load(Ordering::Relaxed),
            self.idle_signals(),
            self.last_outcome(),
        )
    }
}

/// Prometheus metrics registry for roll monitoring.
pub struct RollMetricsRegistry {
    registry: Registry,

    // Session metrics
    sessions_total: IntCounter,
    samples_total: IntCounter,
    pool_bytes_total: IntCounter,

    // Idle metrics
    idle_signals_total: IntCounter,

    // Outcome metrics
    outcomes_total: IntCounter,
    last_outcome: IntGauge,
}

impl RollMetricsRegistry {
    /// Creates a new metrics registry with all roll metrics registered.
    pub fn new() -> Result<Self, MetricsError> {
        let registry = Registry::new();

        let sessions_total = IntCounter::new(
            "shake_dice_sessions_total",
            "Total shake sessions completed",
        )?;
        let samples_total = IntCounter::new(
            "shake_dice_samples_total",
            "Total sample ticks fed into entropy pools",
        )?;
        let pool_bytes_total = IntCounter::new(
            "shake_dice_pool_bytes_total",
            "Total bytes accumulated across entropy pools",
        )?;
        let idle_signals_total = IntCounter::new(
            "shake_dice_idle_signals_total",
            "Total low-power signals emitted by the idle watchdog",
        )?;
        let outcomes_total = IntCounter::new(
            "shake_dice_outcomes_total",
            "Total outcomes recorded in the distribution",
        )?;
        let last_outcome =
            IntGauge::new("shake_dice_last_outcome", "Most recent outcome value")?;

        registry.register(Box::new(sessions_total.clone()))?;
        registry.register(Box::new(samples_total.clone()))?;
        registry.register(Box::new(pool_bytes_total.clone()))?;
        registry.register(Box::new(idle_signals_total.clone()))?;
        registry.register(Box::new(outcomes_total.clone()))?;
        registry.register(Box::new(last_outcome.clone()))?;

        Ok(Self {
            registry,
            sessions_total,
            samples_total,
            pool_bytes_total,
            idle_signals_total,
            outcomes_total,
            last_outcome,
        })
    }

    /// Updates all metrics from a snapshot of system state.
    pub fn update(&self, snapshot: &RollMetricsSnapshot) {
        // Counters only move forward; increment by the observed delta.
        let pairs = [
            (&self.sessions_total, snapshot.sessions_total),
            (&self.samples_total, snapshot.samples_total),
            (&self.pool_bytes_total, snapshot.pool_bytes_total),
            (&self.idle_signals_total, snapshot.idle_signals_total),
            (&self.outcomes_total, snapshot.outcomes_total),
        ];
        for (counter, target) in pairs {
            let current = counter.get();
            if target > current {
                counter.inc_by(target - current);
            }
        }

        if let Some(value) = snapshot.last_outcome {
            self.last_outcome.set(value as i64);
        }
    }

    /// Returns the underlying Prometheus registry.
    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    /// Encodes all metrics in Prometheus text format.
    pub fn encode(&self) -> Result<String, MetricsError> {
        let encoder = TextEncoder::new();
        let metric_families = self.registry.gather();
        let mut buffer = Vec::new();
        encoder.encode(&metric_families, &mut buffer)?;
        Ok(String::from_utf8_lossy(&buffer).into_owned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::outcome::OutcomeTracker;

    #[test]
    fn test_registry_creation() {
        let registry = RollMetricsRegistry::new();
        assert!(registry.is_ok());
    }

    #[test]
    fn test_metrics_update() {
        let registry = RollMetricsRegistry::new().unwrap();

        let snapshot = RollMetricsSnapshot {
            sessions_total: 4,
            samples_total: 37,
            pool_bytes_total: 1216,
            idle_signals_total: 1,
            outcomes_total: 4,
            last_outcome: Some(6),
        };
        registry.update(&snapshot);

        let output = registry.encode().unwrap();
        assert!(output.contains("shake_dice_sessions_total 4"));
        assert!(output.contains("shake_dice_samples_total 37"));
        assert!(output.contains("shake_dice_last_outcome 6"));
    }

    #[test]
    fn test_counters_never_regress() {
        let registry = RollMetricsRegistry::new().unwrap();

        registry.update(&RollMetricsSnapshot {
            sessions_total: 5,
            ..Default::default()
        });
        // A stale snapshot must not decrement the counter.
        registry.update(&RollMetricsSnapshot {
            sessions_total: 3,
            ..Default::default()
        });

        let output = registry.encode().unwrap();
        assert!(output.contains("shake_dice_sessions_total 5"));
    }

    #[test]
    fn test_stats_fold_into_snapshot() {
        let stats = RollStats::default();
        assert_eq!(stats.last_outcome(), None);

        stats.record_session(5, 168, 3);
        stats.record_session(2, 72, 6);
        stats.record_idle_signal();

        let mut tracker = OutcomeTracker::new(1, 6);
        tracker.record(3).unwrap();
        tracker.record(6).unwrap();

        let snapshot = stats.snapshot(&tracker.snapshot());
        assert_eq!(snapshot.sessions_total, 2);
        assert_eq!(snapshot.samples_total, 7);
        assert_eq!(snapshot.pool_bytes_total, 240);
        assert_eq!(snapshot.idle_signals_total, 1);
        assert_eq!(snapshot.outcomes_total, 2);
        assert_eq!(snapshot.last_outcome, Some(6));
    }

    #[test]
    fn test_snapshot_from_components() {
        let mut tracker = OutcomeTracker::new(1, 6);
        tracker.record(2).unwrap();
        tracker.record(5).unwrap();

        let snapshot =
            RollMetricsSnapshot::from_components(&tracker.snapshot(), 2, 13, 424, 0, Some(5));
        assert_eq!(snapshot.outcomes_total, 2);
        assert_eq!(snapshot.last_outcome, Some(5));
    }
}
