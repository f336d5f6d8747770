//! Outcome derivation and bookkeeping.
//!
//! This module turns a finalized pool digest into an integer in the
//! configured range via rejection sampling, and maintains the running
//! frequency distribution of outcomes for display and diagnostics.

pub mod persist;
mod range;
mod tracker;

pub use range::{map_to_range, RangeError};
pub use tracker::{DistributionSnapshot, OutcomeTracker, TrackerError};
