//! Snapshot data model
//!
//! A [`Snapshot`] is the complete cached mirror of every run across every
//! level, plus the timestamp of the last cycle that reset staleness. It is
//! the only durable record and is always replaced wholesale.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// One completion of one level by one runner
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Run {
    /// Level name, stable across refreshes
    pub level: String,
    /// Primary elapsed time in seconds
    pub time: f64,
    /// 1-based rank on the level leaderboard
    pub place: i64,
    /// Runner display name (identity key)
    pub runner: String,
}

/// Full cached state persisted under the snapshot key
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    pub runs: Vec<Run>,
    #[serde(rename = "lastUpdated")]
    pub last_updated: DateTime<Utc>,
}

impl Snapshot {
    pub fn new(runs: Vec<Run>, last_updated: DateTime<Utc>) -> Self {
        Self { runs, last_updated }
    }

    /// Runs whose level is in `levels`, in snapshot order
    pub fn runs_for_levels(&self, levels: &HashSet<&str>) -> Vec<Run> {
        self.runs
            .iter()
            .filter(|r| levels.contains(r.level.as_str()))
            .cloned()
            .collect()
    }
}
