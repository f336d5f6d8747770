//! HTTP exporter for pipeline metrics.
//!
//! Serves live state rather than pushed snapshots: each scrape reads
//! the shared tracker and counters, folds them into the Prometheus
//! registry and encodes the result. A `/distribution` route exposes the
//! raw counts and percentages for consumers that do not speak the
//! Prometheus text format.

use crate::metrics::{MetricsError, RollMetricsRegistry, RollStats};
use crate::outcome::OutcomeTracker;
use axum::{extract::State, http::StatusCode, response::IntoResponse, routing::get, Json, Router};
use serde::Serialize;
use std::collections::BTreeMap;
use std::net::SocketAddr;
use std::sync::{Arc, RwLock};
use thiserror::Error;

/// Errors that can occur during exporter operations.
#[derive(Debug, Error)]
pub enum ServerError {
    #[error("failed to bind to address: {0}")]
    Bind(#[from] std::io::Error),

    #[error("server error: {0}")]
    Server(String),
}

/// Shared handles the exporter reads on every request.
pub struct MetricsState {
    registry: RollMetricsRegistry,
    tracker: Arc<RwLock<OutcomeTracker>>,
    stats: Arc<RollStats>,
}

impl MetricsState {
    fn render_metrics(&self) -> Result<String, MetricsError> {
        let distribution = self
            .tracker
            .read()
            .expect("tracker lock poisoned")
            .snapshot();
        self.registry.update(&self.stats.snapshot(&distribution));
        self.registry.encode()
    }

    fn distribution(&self) -> DistributionResponse {
        let tracker = self.tracker.read().expect("tracker lock poisoned");
        DistributionResponse {
            total: tracker.total(),
            counts: tracker.snapshot().counts,
            percentages: tracker.percentages(),
        }
    }
}

/// Payload of the `/distribution` route.
#[derive(Debug, Serialize)]
struct DistributionResponse {
    total: u64,
    counts: BTreeMap<i32, u64>,
    percentages: BTreeMap<i32, u32>,
}

/// HTTP server exposing the live roll distribution and counters.
pub struct MetricsServer {
    bind_addr: SocketAddr,
    state: Arc<MetricsState>,
}

impl MetricsServer {
    /// Creates an exporter over the pipeline's shared state.
    pub fn new(
        bind_addr: SocketAddr,
        registry: RollMetricsRegistry,
        tracker: Arc<RwLock<OutcomeTracker>>,
        stats: Arc<RollStats>,
    ) -> Self {
        Self {
            bind_addr,
            state: Arc::new(MetricsState {
                registry,
                tracker,
                stats,
            }),
        }
    }

    /// Starts the HTTP server.
    ///
    /// This method runs the server until it is shut down.
    pub async fn run(self) -> Result<(), ServerError> {
        let app = Router::new()
            .route("/metrics", get(metrics_handler))
            .route("/distribution", get(distribution_handler))
            .route("/health", get(health_handler))
            .with_state(self.state);

        let listener = tokio::net::TcpListener::bind(self.bind_addr).await?;

        tracing::info!(addr = %self.bind_addr, "Metrics exporter listening");

        axum::serve(listener, app)
            .await
            .map_err(|e| ServerError::Server(e.to_string()))?;

        Ok(())
    }
}

/// Handler for the /metrics endpoint.
async fn metrics_handler(State(state): State<Arc<MetricsState>>) -> impl IntoResponse {
    match state.render_metrics() {
        Ok(output) => (
            StatusCode::OK,
            [("content-type", "text/plain; version=0.0.4; charset=utf-8")],
            output,
        ),
        Err(e) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            [("content-type", "text/plain; charset=utf-8")],
            format!("Failed to encode metrics: {}", e),
        ),
    }
}

/// Handler for the /distribution endpoint.
async fn distribution_handler(State(state): State<Arc<MetricsState>>) -> impl IntoResponse {
    Json(state.distribution())
}

/// Handler for the /health endpoint.
async fn health_handler() -> impl IntoResponse {
    (StatusCode::OK, "OK")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn state_with_rolls() -> MetricsState {
        let mut tracker = OutcomeTracker::new(1, 6);
        tracker.record(3).unwrap();
        tracker.record(3).unwrap();
        tracker.record(5).unwrap();

        let stats = RollStats::default();
        stats.record_session(4, 136, 3);
        stats.record_session(6, 200, 3);
        stats.record_session(2, 72, 5);

        MetricsState {
            registry: RollMetricsRegistry::new().unwrap(),
            tracker: Arc::new(RwLock::new(tracker)),
            stats: Arc::new(stats),
        }
    }

    #[test]
    fn test_scrape_reflects_live_state() {
        let state = state_with_rolls();

        let output = state.render_metrics().unwrap();
        assert!(output.contains("shake_dice_sessions_total 3"));
        assert!(output.contains("shake_dice_samples_total 12"));
        assert!(output.contains("shake_dice_outcomes_total 3"));
        assert!(output.contains("shake_dice_last_outcome 5"));

        // A roll between scrapes shows up on the next one.
        state.tracker.write().unwrap().record(1).unwrap();
        state.stats.record_session(1, 40, 1);
        let output = state.render_metrics().unwrap();
        assert!(output.contains("shake_dice_sessions_total 4"));
        assert!(output.contains("shake_dice_last_outcome 1"));
    }

    #[test]
    fn test_distribution_payload() {
        let response = state_with_rolls().distribution();

        assert_eq!(response.total, 3);
        assert_eq!(response.counts[&3], 2);
        assert_eq!(response.counts[&5], 1);
        assert_eq!(response.counts[&1], 0);
        assert_eq!(response.percentages[&3], 67);
    }
}
