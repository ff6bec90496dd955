//! Staleness policy
//!
//! Decides whether the previous snapshot is "old", which selects the half
//! of the level catalog refreshed this cycle and whether `lastUpdated`
//! moves forward.

use crate::error::StandingsError;
use chrono::{DateTime, Datelike, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum StalenessPolicy {
    /// Old iff `day_of_month(now) - day_of_month(previous) > 0` (UTC).
    ///
    /// Compares calendar days of the month only: it never fires when `now`
    /// falls on an earlier day-of-month than `previous` (month rollover)
    /// and ignores time of day.
    DayOfMonth,
    /// Old iff strictly more than `threshold_secs` elapsed since `previous`
    Elapsed { threshold_secs: u64 },
}

impl Default for StalenessPolicy {
    fn default() -> Self {
        Self::DayOfMonth
    }
}

impl StalenessPolicy {
    pub fn is_stale(&self, previous: DateTime<Utc>, now: DateTime<Utc>) -> bool {
        match self {
            Self::DayOfMonth => i64::from(now.day()) - i64::from(previous.day()) > 0,
            Self::Elapsed { threshold_secs } => {
                let threshold = i64::try_from(*threshold_secs).unwrap_or(i64::MAX);
                (now - previous).num_seconds() > threshold
            }
        }
    }
}

impl fmt::Display for StalenessPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::DayOfMonth => write!(f, "day-of-month"),
            Self::Elapsed { threshold_secs } => write!(f, "elapsed:{}", threshold_secs),
        }
    }
}

impl FromStr for StalenessPolicy {
    type Err = StandingsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s == "day-of-month" {
            return Ok(Self::DayOfMonth);
        }
        if let Some(secs) = s.strip_prefix("elapsed:") {
            let threshold_secs = secs.parse().map_err(|e| {
                StandingsError::Config(format!("invalid elapsed threshold '{}': {}", secs, e))
            })?;
            return Ok(Self::Elapsed { threshold_secs });
        }
        Err(StandingsError::Config(format!(
            "unknown staleness policy '{}' (expected day-of-month or elapsed:<secs>)",
            s
        )))
    }
}
