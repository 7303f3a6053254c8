//! Raw harvest snapshot
//!
//! Every run persists its unfiltered results and failure tally as a JSON
//! snapshot before any filtering or formatting happens. `--report-only`
//! re-renders the report files from this snapshot, so filter or report
//! settings can be tuned without re-fetching anything.

use crate::harvest::{ContentResult, HarvestFailure};
use crate::{HarvestError, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Everything a report can be rebuilt from
#[derive(Debug, Serialize, Deserialize)]
pub struct HarvestSnapshot {
    /// When the harvest started
    pub recorded_at: DateTime<Utc>,

    /// Hash of the configuration the harvest ran under
    pub config_hash: String,

    /// Search keywords the harvest ran with
    pub keywords: Vec<String>,

    pub results: Vec<ContentResult>,
    pub failures: Vec<HarvestFailure>,
}

/// Writes the snapshot as pretty-printed JSON
pub fn write_snapshot(snapshot: &HarvestSnapshot, path: &Path) -> Result<()> {
    let json = serde_json::to_string_pretty(snapshot).map_err(|source| HarvestError::Snapshot {
        path: path.display().to_string(),
        source,
    })?;
    fs::write(path, json)?;
    Ok(())
}

/// Reads a snapshot written by a previous run
pub fn read_snapshot(path: &Path) -> Result<HarvestSnapshot> {
    let content = fs::read_to_string(path)?;
    serde_json::from_str(&content).map_err(|source| HarvestError::Snapshot {
        path: path.display().to_string(),
        source,
    })
}
