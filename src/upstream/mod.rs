//! Upstream leaderboard API (speedrun.com).

pub mod client;
pub mod types;

pub use client::{LeaderboardSource, SpeedrunClient};
pub use types::{Leaderboard, Level, Link, Player};
