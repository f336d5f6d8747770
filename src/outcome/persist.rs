//! Optional persistence of the outcome distribution.
//!
//! Counts are stored keyed by the active range's identity string (for
//! example "D6"). On a mismatch between the stored identity and the
//! current configuration the tracker starts from zero rather than
//! reusing stale counts.

use super::tracker::OutcomeTracker;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;
use thiserror::Error;

/// Errors that can occur during distribution persistence.
#[derive(Debug, Error)]
pub enum PersistError {
    #[error("failed to access distribution file: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse distribution file: {0}")]
    Parse(String),
    #[error("failed to serialize distribution: {0}")]
    Serialize(String),
}

/// On-disk distribution format.
///
/// TOML tables require string keys, so counts are stored keyed by the
/// decimal outcome value.
#[derive(Debug, Serialize, Deserialize)]
struct PersistedCounts {
    range_id: String,
    saved_at: DateTime<Utc>,
    counts: BTreeMap<String, u64>,
}

/// Saves the tracker's distribution to a TOML file.
pub fn save(
    tracker: &OutcomeTracker,
    range_id: &str,
    path: impl AsRef<Path>,
) -> Result<(), PersistError> {
    let snapshot = tracker.snapshot();
    let record = PersistedCounts {
        range_id: range_id.to_string(),
        saved_at: Utc::now(),
        counts: snapshot
            .counts
            .iter()
            .map(|(v, c)| (v.to_string(), *c))
            .collect(),
    };

    let content = toml::to_string_pretty(&record).map_err(|e| PersistError::Serialize(e.to_string()))?;
    std::fs::write(path.as_ref(), content)?;

    tracing::info!(
        range_id,
        total = snapshot.total,
        path = %path.as_ref().display(),
        "Saved outcome distribution"
    );
    Ok(())
}

/// Loads a tracker for `[min, max]`, restoring persisted counts.
///
/// Starts from zero when the file is missing or its range identity does
/// not match `range_id`.
pub fn load(
    path: impl AsRef<Path>,
    range_id: &str,
    min: i32,
    max: i32,
) -> Result<OutcomeTracker, PersistError> {
    let mut tracker = OutcomeTracker::new(min, max);
    let path = path.as_ref();

    if !path.exists() {
        tracing::debug!(path = %path.display(), "No persisted distribution; starting fresh");
        return Ok(tracker);
    }

    let content = std::fs::read_to_string(path)?;
    let record: PersistedCounts =
        toml::from_str(&content).map_err(|e| PersistError::Parse(e.to_string()))?;

    if record.range_id != range_id {
        tracing::info!(
            stored = %record.range_id,
            configured = %range_id,
            "Persisted range identity mismatch; resetting distribution"
        );
        return Ok(tracker);
    }

    let counts: BTreeMap<i32, u64> = record
        .counts
        .iter()
        .filter_map(|(k, &c)| k.parse::<i32>().ok().map(|v| (v, c)))
        .collect();
    tracker.restore_counts(&counts);

    tracing::info!(
        range_id,
        total = tracker.total(),
        saved_at = %record.saved_at,
        "Restored persisted outcome distribution"
    );
    Ok(tracker)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_path(name: &str) -> std::path::PathBuf {
        let mut path = std::env::temp_dir();
        path.push(format!("shake-dice-test-{name}-{}", std::process::id()));
        path
    }

    #[test]
    fn test_round_trip() {
        let path = temp_path("round-trip");
        let mut tracker = OutcomeTracker::new(1, 6);
        tracker.record(3).unwrap();
        tracker.record(3).unwrap();
        tracker.record(5).unwrap();

        save(&tracker, "D6", &path).unwrap();
        let restored = load(&path, "D6", 1, 6).unwrap();
        std::fs::remove_file(&path).ok();

        assert_eq!(restored.total(), 3);
        assert_eq!(restored.snapshot().counts[&3], 2);
        assert_eq!(restored.snapshot().counts[&5], 1);
    }

    #[test]
    fn test_range_identity_mismatch_resets() {
        let path = temp_path("mismatch");
        let mut tracker = OutcomeTracker::new(1, 6);
        tracker.record(2).unwrap();
        save(&tracker, "D6", &path).unwrap();

        // Range changed from D6 to D12: stale counts are discarded.
        let restored = load(&path, "D12", 1, 12).unwrap();
        std::fs::remove_file(&path).ok();

        assert_eq!(restored.total(), 0);
        assert_eq!(restored.min(), 1);
        assert_eq!(restored.max(), 12);
    }

    #[test]
    fn test_missing_file_starts_fresh() {
        let restored = load(temp_path("does-not-exist"), "D6", 1, 6).unwrap();
        assert_eq!(restored.total(), 0);
    }
}
