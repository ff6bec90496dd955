//! Service Configuration
//!
//! Defines where standings come from and how they are refreshed:
//! - Upstream API base URL and game
//! - Snapshot key in the key-value store
//! - Refresh interval, request timeout and fetch concurrency
//! - Staleness policy deciding which half of the catalog is refreshed

use crate::error::{Result, StandingsError};
use crate::refresh::StalenessPolicy;
use serde::{Deserialize, Serialize};
use std::time::Duration;

pub const DEFAULT_API_BASE: &str = "https://www.speedrun.com/api/v1";
pub const DEFAULT_GAME: &str = "rac4";

/// Complete service configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StandingsConfig {
    /// speedrun.com REST API base URL
    pub api_base: String,
    /// Game id or abbreviation on speedrun.com
    pub game: String,
    /// Key the snapshot document is stored under
    pub snapshot_key: String,
    /// Seconds between scheduled refresh cycles
    pub refresh_interval_secs: u64,
    /// Per-request upstream timeout in seconds
    pub request_timeout_secs: u64,
    /// Max leaderboard fetches in flight (1 = sequential)
    pub fetch_concurrency: usize,
    /// Rule deciding whether the previous snapshot is old
    pub staleness: StalenessPolicy,
}

impl Default for StandingsConfig {
    fn default() -> Self {
        Self {
            api_base: DEFAULT_API_BASE.to_string(),
            game: DEFAULT_GAME.to_string(),
            snapshot_key: crate::storage::snapshot_store::DEFAULT_SNAPSHOT_KEY.to_string(),
            refresh_interval_secs: 3600,
            request_timeout_secs: 30,
            fetch_concurrency: 1,
            staleness: StalenessPolicy::DayOfMonth,
        }
    }
}

impl StandingsConfig {
    /// Create config from environment variables, falling back to defaults
    pub fn from_env() -> Result<Self> {
        let defaults = Self::default();

        let api_base = std::env::var("SPEEDRUN_API_BASE").unwrap_or(defaults.api_base);
        let game = std::env::var("SPEEDRUN_GAME").unwrap_or(defaults.game);
        let snapshot_key = std::env::var("SNAPSHOT_KEY").unwrap_or(defaults.snapshot_key);

        let refresh_interval_secs =
            parse_env("REFRESH_INTERVAL_SECS")?.unwrap_or(defaults.refresh_interval_secs);
        let request_timeout_secs =
            parse_env("REQUEST_TIMEOUT_SECS")?.unwrap_or(defaults.request_timeout_secs);
        let fetch_concurrency =
            parse_env("FETCH_CONCURRENCY")?.unwrap_or(defaults.fetch_concurrency);
        let staleness = parse_env("STALENESS_POLICY")?.unwrap_or(defaults.staleness);

        let config = Self {
            api_base,
            game,
            snapshot_key,
            refresh_interval_secs,
            request_timeout_secs,
            fetch_concurrency,
            staleness,
        };
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.game.trim().is_empty() {
            return Err(StandingsError::Config("game must not be empty".to_string()));
        }
        if self.snapshot_key.is_empty() {
            return Err(StandingsError::Config(
                "snapshot_key must not be empty".to_string(),
            ));
        }
        if self.refresh_interval_secs == 0 {
            return Err(StandingsError::Config(
                "refresh_interval_secs must be positive".to_string(),
            ));
        }
        if self.fetch_concurrency == 0 {
            return Err(StandingsError::Config(
                "fetch_concurrency must be at least 1".to_string(),
            ));
        }
        Ok(())
    }

    pub fn refresh_interval(&self) -> Duration {
        Duration::from_secs(self.refresh_interval_secs)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

fn parse_env<T>(name: &str) -> Result<Option<T>>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match std::env::var(name) {
        Ok(raw) => raw
            .trim()
            .parse()
            .map(Some)
            .map_err(|e| StandingsError::Config(format!("{}: {}", name, e))),
        Err(_) => Ok(None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    const VARS: &[&str] = &[
        "SPEEDRUN_API_BASE",
        "SPEEDRUN_GAME",
        "SNAPSHOT_KEY",
        "REFRESH_INTERVAL_SECS",
        "REQUEST_TIMEOUT_SECS",
        "FETCH_CONCURRENCY",
        "STALENESS_POLICY",
    ];

    fn clear_env() {
        for var in VARS {
            std::env::remove_var(var);
        }
    }

    #[test]
    fn test_default_config() {
        let config = StandingsConfig::default();
        assert_eq!(config.api_base, "https://www.speedrun.com/api/v1");
        assert_eq!(config.game, "rac4");
        assert_eq!(config.snapshot_key, "data");
        assert_eq!(config.fetch_concurrency, 1);
        assert_eq!(config.staleness, StalenessPolicy::DayOfMonth);
        assert!(config.validate().is_ok());
    }

    #[test]
    #[serial]
    fn test_from_env_defaults() {
        clear_env();
        let config = StandingsConfig::from_env().unwrap();
        assert_eq!(config.game, "rac4");
        assert_eq!(config.refresh_interval(), Duration::from_secs(3600));
        assert_eq!(config.request_timeout(), Duration::from_secs(30));
    }

    #[test]
    #[serial]
    fn test_from_env_overrides() {
        clear_env();
        std::env::set_var("SPEEDRUN_GAME", "rac3");
        std::env::set_var("FETCH_CONCURRENCY", "4");
        std::env::set_var("STALENESS_POLICY", "elapsed:86400");

        let config = StandingsConfig::from_env().unwrap();
        clear_env();

        assert_eq!(config.game, "rac3");
        assert_eq!(config.fetch_concurrency, 4);
        assert_eq!(
            config.staleness,
            StalenessPolicy::Elapsed {
                threshold_secs: 86400
            }
        );
    }

    #[test]
    #[serial]
    fn test_from_env_rejects_garbage() {
        clear_env();
        std::env::set_var("REFRESH_INTERVAL_SECS", "soon");
        let err = StandingsConfig::from_env().unwrap_err();
        clear_env();

        assert!(matches!(err, StandingsError::Config(_)));
        assert!(err.to_string().contains("REFRESH_INTERVAL_SECS"));
    }

    #[test]
    fn test_validate_zero_concurrency() {
        let config = StandingsConfig {
            fetch_concurrency: 0,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }
}
