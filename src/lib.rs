//! Speedrun Standings
//!
//! Keeps a cached snapshot of every individual-level leaderboard of one
//! speedrun.com game and serves points-based views over it.
//!
//! The level catalog is too large to refresh within one scheduled cycle
//! without upsetting upstream rate limits, so each cycle refreshes one half
//! of the catalog and carries the other half over from the previous
//! snapshot.
//!
//! ## Module Structure
//!
//! - `scoring`: points for a leaderboard placement
//! - `snapshot`: `Run` / `Snapshot` data model
//! - `storage`: key-value backends and the snapshot adapter
//! - `upstream`: speedrun.com client and response shapes
//! - `refresh`: two-half refresh engine, staleness policy, scheduler
//! - `query`: aggregate / level / runner / single-run views
//! - `api`, `server`: HTTP dispatcher and router
//! - `config`, `error`: configuration and error types

pub mod api;
pub mod config;
pub mod error;
pub mod query;
pub mod refresh;
pub mod scoring;
pub mod server;
pub mod snapshot;
pub mod storage;
pub mod upstream;

pub use config::StandingsConfig;
pub use error::{Result, StandingsError};
pub use query::{QueryFilter, QueryResult};
pub use refresh::{CycleReport, RefreshEngine, RefreshScheduler, StalenessPolicy};
pub use scoring::points_for_place;
pub use snapshot::{Run, Snapshot};
pub use storage::{KvStore, MemoryStore, SnapshotStore, SqliteStore};
pub use upstream::{LeaderboardSource, SpeedrunClient};
