//! Refresh Engine
//!
//! One invocation = one refresh cycle:
//!
//! ```text
//! catalog ──split──► [first half | second half]
//!                        │               │
//!        previous ───────┴─ staleness ───┘
//!                        │
//!          refresh one half (fetch) + retain the other (filter previous)
//!                        │
//!                  fresh ++ retained ──► single put
//! ```
//!
//! Nothing is written unless every fetch of the cycle succeeded.

use super::staleness::StalenessPolicy;
use crate::error::Result;
use crate::snapshot::{Run, Snapshot};
use crate::storage::{KvStore, SnapshotStore};
use crate::upstream::{LeaderboardSource, Level};
use chrono::{DateTime, Utc};
use futures::stream::{self, StreamExt, TryStreamExt};
use std::collections::HashSet;
use std::fmt;
use tracing::{debug, info};

/// One of the two positional partitions of the level catalog
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Half {
    First,
    Second,
}

impl Half {
    pub fn other(self) -> Self {
        match self {
            Half::First => Half::Second,
            Half::Second => Half::First,
        }
    }

    /// This half's slice of `levels`, split at the truncating midpoint
    pub fn of(self, levels: &[Level]) -> &[Level] {
        let (first, second) = levels.split_at(levels.len() / 2);
        match self {
            Half::First => first,
            Half::Second => second,
        }
    }
}

impl fmt::Display for Half {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Half::First => write!(f, "first"),
            Half::Second => write!(f, "second"),
        }
    }
}

/// Which half a cycle refreshes and whether it resets `lastUpdated`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CyclePlan {
    pub refresh: Half,
    pub reset_timestamp: bool,
}

impl CyclePlan {
    pub fn retain(&self) -> Half {
        self.refresh.other()
    }

    /// Cold start refreshes the second half; otherwise a stale snapshot
    /// refreshes the first half and a fresh one the second.
    pub fn decide(
        previous: Option<&Snapshot>,
        policy: &StalenessPolicy,
        now: DateTime<Utc>,
    ) -> Self {
        match previous {
            None => Self {
                refresh: Half::Second,
                reset_timestamp: true,
            },
            Some(prev) if policy.is_stale(prev.last_updated, now) => Self {
                refresh: Half::First,
                reset_timestamp: true,
            },
            Some(_) => Self {
                refresh: Half::Second,
                reset_timestamp: false,
            },
        }
    }
}

/// Stitch freshly fetched runs with the retained half of the previous
/// snapshot. Retained runs are restricted to the levels currently in the
/// retained half of the catalog.
pub fn merge_snapshot(
    fresh: Vec<Run>,
    previous: Option<&Snapshot>,
    retained_levels: &[Level],
    plan: CyclePlan,
    now: DateTime<Utc>,
) -> Snapshot {
    let retained_names: HashSet<&str> = retained_levels.iter().map(|l| l.name.as_str()).collect();
    let retained = previous
        .map(|prev| prev.runs_for_levels(&retained_names))
        .unwrap_or_default();

    let last_updated = match previous {
        Some(prev) if !plan.reset_timestamp => prev.last_updated,
        _ => now,
    };

    let mut runs = fresh;
    runs.extend(retained);
    Snapshot::new(runs, last_updated)
}

/// Summary of a completed cycle
#[derive(Debug, Clone, PartialEq)]
pub struct CycleReport {
    pub plan: CyclePlan,
    pub catalog_levels: usize,
    pub refreshed_levels: usize,
    pub fresh_runs: usize,
    pub retained_runs: usize,
    pub last_updated: DateTime<Utc>,
}

pub struct RefreshEngine<S, K> {
    source: S,
    store: SnapshotStore<K>,
    policy: StalenessPolicy,
    fetch_concurrency: usize,
}

impl<S: LeaderboardSource, K: KvStore> RefreshEngine<S, K> {
    pub fn new(source: S, store: SnapshotStore<K>, policy: StalenessPolicy) -> Self {
        Self {
            source,
            store,
            policy,
            fetch_concurrency: 1,
        }
    }

    /// Allow up to `n` leaderboard fetches in flight. Output order is kept.
    pub fn with_fetch_concurrency(mut self, n: usize) -> Self {
        self.fetch_concurrency = n.max(1);
        self
    }

    pub fn store(&self) -> &SnapshotStore<K> {
        &self.store
    }

    pub async fn run_cycle(&self) -> Result<CycleReport> {
        self.run_cycle_at(Utc::now()).await
    }

    /// Run one cycle as if the current time were `now`
    pub async fn run_cycle_at(&self, now: DateTime<Utc>) -> Result<CycleReport> {
        let levels = self.source.levels().await?;
        let previous = self.store.load().await?;
        let plan = CyclePlan::decide(previous.as_ref(), &self.policy, now);

        let to_refresh = plan.refresh.of(&levels);
        let to_retain = plan.retain().of(&levels);

        info!(
            "Refresh cycle: {} levels in catalog, refreshing {} half ({} levels), retaining {} half ({} levels)",
            levels.len(),
            plan.refresh,
            to_refresh.len(),
            plan.retain(),
            to_retain.len()
        );

        let fresh = self.fetch_half(to_refresh).await?;
        let fresh_runs = fresh.len();

        let snapshot = merge_snapshot(fresh, previous.as_ref(), to_retain, plan, now);
        let retained_runs = snapshot.runs.len() - fresh_runs;

        self.store.save(&snapshot).await?;

        info!(
            "Snapshot written: {} fresh + {} retained runs, last updated {}",
            fresh_runs, retained_runs, snapshot.last_updated
        );

        Ok(CycleReport {
            plan,
            catalog_levels: levels.len(),
            refreshed_levels: to_refresh.len(),
            fresh_runs,
            retained_runs,
            last_updated: snapshot.last_updated,
        })
    }

    async fn fetch_half(&self, levels: &[Level]) -> Result<Vec<Run>> {
        let fetches: Vec<_> = levels.iter().map(|level| self.fetch_level(level)).collect();
        let per_level: Vec<Vec<Run>> = stream::iter(fetches)
            .buffered(self.fetch_concurrency)
            .try_collect()
            .await?;

        Ok(per_level.into_iter().flatten().collect())
    }

    async fn fetch_level(&self, level: &Level) -> Result<Vec<Run>> {
        let runs = self.source.leaderboard(level).await?.into_runs(&level.name)?;
        debug!("Fetched {} runs for '{}'", runs.len(), level.name);
        Ok(runs)
    }
}
