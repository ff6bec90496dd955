//! speedrun.com REST client
//!
//! Two calls are needed per refresh cycle: the game document with its
//! embedded level catalog, then one leaderboard per level being refreshed.

use super::types::{Envelope, GameWithLevels, Leaderboard, Level};
use crate::config::StandingsConfig;
use crate::error::{Result, StandingsError};
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use std::time::Duration;
use tracing::debug;

const USER_AGENT: &str = concat!("speedrun-standings/", env!("CARGO_PKG_VERSION"));

/// Source of level catalogs and leaderboards
#[async_trait]
pub trait LeaderboardSource: Send + Sync {
    /// Ordered level catalog of the configured game
    async fn levels(&self) -> Result<Vec<Level>>;

    /// Leaderboard of one level, players embedded
    async fn leaderboard(&self, level: &Level) -> Result<Leaderboard>;
}

pub struct SpeedrunClient {
    client: reqwest::Client,
    api_base: String,
    game: String,
}

impl SpeedrunClient {
    pub fn new(api_base: &str, game: &str, timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(USER_AGENT)
            .build()?;

        Ok(Self {
            client,
            api_base: api_base.trim_end_matches('/').to_string(),
            game: game.to_string(),
        })
    }

    pub fn from_config(config: &StandingsConfig) -> Result<Self> {
        Self::new(&config.api_base, &config.game, config.request_timeout())
    }

    async fn get_json<T: DeserializeOwned>(&self, url: &str, embed: &str) -> Result<T> {
        debug!("GET {}?embed={}", url, embed);

        let response = self
            .client
            .get(url)
            .query(&[("embed", embed)])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(StandingsError::UpstreamStatus {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        let body = response.text().await?;
        let envelope: Envelope<T> = serde_json::from_str(&body)?;
        Ok(envelope.data)
    }
}

#[async_trait]
impl LeaderboardSource for SpeedrunClient {
    async fn levels(&self) -> Result<Vec<Level>> {
        let url = format!("{}/games/{}", self.api_base, self.game);
        let game: GameWithLevels = self.get_json(&url, "levels").await?;
        Ok(game.levels.data)
    }

    async fn leaderboard(&self, level: &Level) -> Result<Leaderboard> {
        let uri = level.leaderboard_uri()?;
        self.get_json(uri, "players").await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::upstream::types::Link;
    use httpmock::prelude::*;

    fn client(base: &str) -> SpeedrunClient {
        SpeedrunClient::new(base, "rac4", Duration::from_secs(5)).unwrap()
    }

    #[tokio::test]
    async fn test_levels_with_mock_server() {
        let server = MockServer::start();

        let mock = server.mock(|when, then| {
            when.method(GET)
                .path("/games/rac4")
                .query_param("embed", "levels");
            then.status(200)
                .header("content-type", "application/json")
                .json_body(serde_json::json!({
                    "data": {
                        "id": "rac4",
                        "levels": {"data": [
                            {"id": "l1", "name": "Dreadzone Station", "links": [
                                {"rel": "leaderboard", "uri": "http://x/leaderboards/l1"}
                            ]},
                            {"id": "l2", "name": "Catacrom Four", "links": []}
                        ]}
                    }
                }));
        });

        let levels = client(&server.base_url()).levels().await.unwrap();

        mock.assert();
        assert_eq!(levels.len(), 2);
        assert_eq!(levels[0].name, "Dreadzone Station");
        assert_eq!(levels[1].id.as_deref(), Some("l2"));
    }

    #[tokio::test]
    async fn test_leaderboard_follows_link() {
        let server = MockServer::start();

        server.mock(|when, then| {
            when.method(GET)
                .path("/leaderboards/rac4/level/l1/c1")
                .query_param("embed", "players");
            then.status(200).json_body(serde_json::json!({
                "data": {
                    "runs": [{"place": 1, "run": {"times": {"primary_t": 12.0}}}],
                    "players": {"data": [{"name": "alice"}]}
                }
            }));
        });

        let level = Level {
            id: Some("l1".to_string()),
            name: "Orbit".to_string(),
            links: vec![Link {
                rel: "leaderboard".to_string(),
                uri: server.url("/leaderboards/rac4/level/l1/c1"),
            }],
        };

        let board = client(&server.base_url()).leaderboard(&level).await.unwrap();
        assert_eq!(board.runs.len(), 1);
        assert_eq!(board.players.data[0].display_name(), Some("alice"));
    }

    #[tokio::test]
    async fn test_server_error_status() {
        let server = MockServer::start();

        server.mock(|when, then| {
            when.method(GET).path("/games/rac4");
            then.status(420);
        });

        let err = client(&server.base_url()).levels().await.unwrap_err();
        match err {
            StandingsError::UpstreamStatus { status, url } => {
                assert_eq!(status, 420);
                assert!(url.ends_with("/games/rac4"));
            }
            other => panic!("Expected UpstreamStatus, got: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_malformed_body() {
        let server = MockServer::start();

        server.mock(|when, then| {
            when.method(GET).path("/games/rac4");
            then.status(200).body("not valid json");
        });

        let err = client(&server.base_url()).levels().await.unwrap_err();
        assert!(matches!(err, StandingsError::Serialization(_)));
    }

    #[tokio::test]
    async fn test_connection_error() {
        let err = client("http://127.0.0.1:65534").levels().await.unwrap_err();
        assert!(matches!(err, StandingsError::Http(_)));
    }
}
