//! speedrun.com response shapes
//!
//! Only the fields the refresh cycle reads are modelled; everything else in
//! the upstream documents is ignored.

use crate::error::{Result, StandingsError};
use crate::snapshot::Run;
use serde::Deserialize;
use tracing::warn;

/// Link relation naming a level's leaderboard resource
pub const LEADERBOARD_REL: &str = "leaderboard";

/// `{"data": ...}` wrapper used by every upstream document
#[derive(Debug, Clone, Deserialize)]
pub struct Envelope<T> {
    pub data: T,
}

/// Game document fetched with `embed=levels`
#[derive(Debug, Clone, Deserialize)]
pub struct GameWithLevels {
    pub levels: Envelope<Vec<Level>>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Level {
    #[serde(default)]
    pub id: Option<String>,
    pub name: String,
    #[serde(default)]
    pub links: Vec<Link>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Link {
    pub rel: String,
    pub uri: String,
}

impl Level {
    /// URI of the link whose relation is `leaderboard`
    pub fn leaderboard_uri(&self) -> Result<&str> {
        self.links
            .iter()
            .find(|l| l.rel == LEADERBOARD_REL)
            .map(|l| l.uri.as_str())
            .ok_or_else(|| {
                StandingsError::UpstreamContract(format!(
                    "level '{}' has no {} link",
                    self.name, LEADERBOARD_REL
                ))
            })
    }
}

/// Level leaderboard fetched with `embed=players`
#[derive(Debug, Clone, Deserialize)]
pub struct Leaderboard {
    pub runs: Vec<PlacedRun>,
    pub players: Envelope<Vec<Player>>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PlacedRun {
    pub place: i64,
    pub run: RunDetail,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RunDetail {
    pub times: RunTimes,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RunTimes {
    pub primary_t: f64,
}

/// Embedded player: guests carry `name`, users carry `names`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Player {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub names: Option<PlayerNames>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct PlayerNames {
    #[serde(default)]
    pub international: Option<String>,
}

impl Player {
    pub fn display_name(&self) -> Option<&str> {
        self.name
            .as_deref()
            .filter(|n| !n.is_empty())
            .or_else(|| self.names.as_ref()?.international.as_deref())
    }
}

impl Leaderboard {
    /// Pair `runs[i]` with `players[i]` and emit one [`Run`] per entry.
    ///
    /// Upstream embeds players as a list parallel to the runs. Every run
    /// needs a player at its index; surplus players (co-op partners) are
    /// ignored.
    pub fn into_runs(self, level: &str) -> Result<Vec<Run>> {
        let players = self.players.data;
        if players.len() < self.runs.len() {
            return Err(StandingsError::UpstreamContract(format!(
                "level '{}' returned {} runs but {} players",
                level,
                self.runs.len(),
                players.len()
            )));
        }
        if players.len() > self.runs.len() {
            warn!(
                "level '{}' returned {} players for {} runs, ignoring the surplus",
                level,
                players.len(),
                self.runs.len()
            );
        }

        self.runs
            .into_iter()
            .zip(players)
            .map(|(placed, player)| {
                let runner = player.display_name().ok_or_else(|| {
                    StandingsError::UpstreamContract(format!(
                        "player at place {} on '{}' has no name",
                        placed.place, level
                    ))
                })?;
                Ok(Run {
                    level: level.to_string(),
                    time: placed.run.times.primary_t,
                    place: placed.place,
                    runner: runner.to_string(),
                })
            })
            .collect()
    }
}
