//! Display collaborator abstraction.
//!
//! The core hands outcomes and distribution percentages to a display
//! through this narrow interface; panel layout, fonts and driver
//! registers live entirely behind it. All calls are fire-and-forget.
//! The underlying surface is not safe for concurrent writers, so every
//! caller goes through one shared mutex (see the session module).

use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// Trait for display implementations.
///
/// This abstraction allows swapping between real display hardware and
/// mock implementations for testing.
pub trait RollDisplay: Send {
    /// Shows the outcome of a completed session.
    fn show_outcome(&mut self, value: i32);

    /// Shows the running distribution as per-value percentages.
    fn show_distribution(&mut self, percentages: &BTreeMap<i32, u32>, total: u64);

    /// Shows the time remaining until the idle low-power signal.
    fn show_idle_countdown(&mut self, remaining: Duration);
}

/// Display that reports through the logging layer.
///
/// Stands in for panel hardware in the demo binary.
#[derive(Debug, Default)]
pub struct ConsoleDisplay;

impl ConsoleDisplay {
    pub fn new() -> Self {
        Self
    }
}

impl RollDisplay for ConsoleDisplay {
    fn show_outcome(&mut self, value: i32) {
        tracing::info!(value, "Rolled");
        println!("rolled: {value}");
    }

    fn show_distribution(&mut self, percentages: &BTreeMap<i32, u32>, total: u64) {
        let line = percentages
            .iter()
            .map(|(v, p)| format!("{v}:{p}%"))
            .collect::<Vec<_>>()
            .join(" ");
        tracing::info!(total, distribution = %line, "Distribution");
    }

    fn show_idle_countdown(&mut self, remaining: Duration) {
        tracing::debug!(remaining_secs = remaining.as_secs(), "Idle countdown");
    }
}

/// A call captured by [`RecordingDisplay`].
#[derive(Debug, Clone, PartialEq)]
pub enum DisplayCall {
    Outcome(i32),
    Distribution { total: u64 },
    IdleCountdown(Duration),
}

/// Display mock that records every call, for testing ordering and
/// content of what the core emits.
#[derive(Debug, Default, Clone)]
pub struct RecordingDisplay {
    calls: Arc<Mutex<Vec<DisplayCall>>>,
}

impl RecordingDisplay {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a copy of the calls recorded so far.
    pub fn calls(&self) -> Vec<DisplayCall> {
        self.calls.lock().expect("display call log poisoned").clone()
    }

    /// Returns the outcome values shown, in order.
    pub fn outcomes(&self) -> Vec<i32> {
        self.calls()
            .into_iter()
            .filter_map(|c| match c {
                DisplayCall::Outcome(v) => Some(v),
                _ => None,
            })
            .collect()
    }
}

impl RollDisplay for RecordingDisplay {
    fn show_outcome(&mut self, value: i32) {
        self.calls
            .lock()
            .expect("display call log poisoned")
            .push(DisplayCall::Outcome(value));
    }

    fn show_distribution(&mut self, _percentages: &BTreeMap<i32, u32>, total: u64) {
        self.calls
            .lock()
            .expect("display call log poisoned")
            .push(DisplayCall::Distribution { total });
    }

    fn show_idle_countdown(&mut self, remaining: Duration) {
        self.calls
            .lock()
            .expect("display call log poisoned")
            .push(DisplayCall::IdleCountdown(remaining));
    }
}
