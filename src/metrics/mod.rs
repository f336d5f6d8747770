//! Prometheus metrics exporter for roll monitoring.
//!
//! This module provides observability into the shake-to-roll pipeline
//! by exposing metrics in Prometheus format via an HTTP endpoint.
//!
//! # Metrics Exposed
//!
//! ## Session Metrics
//! - `shake_dice_sessions_total` - Total shake sessions completed
//! - `shake_dice_samples_total` - Total sample ticks fed into entropy pools
//! - `shake_dice_pool_bytes_total` - Total bytes accumulated across pools
//!
//! ## Idle Metrics
//! - `shake_dice_idle_signals_total` - Low-power signals emitted
//!
//! ## Outcome Metrics
//! - `shake_dice_outcomes_total` - Outcomes recorded in the distribution
//! - `shake_dice_last_outcome` - Most recent outcome value
//!
//! The HTTP exporter is behind the `metrics` feature; the registry,
//! snapshot and live-counter types are always available. The exporter
//! reads shared pipeline state on each scrape and also serves the raw
//! distribution as JSON on `/distribution`.

mod collector;

pub use collector::{MetricsError, RollMetricsRegistry, RollMetricsSnapshot, RollStats};

#[cfg(feature = "metrics")]
mod server;

#[cfg(feature = "metrics")]
pub use server::{MetricsServer, MetricsState, ServerError};
