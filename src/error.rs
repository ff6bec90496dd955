//! Error types for the standings service

use thiserror::Error;

/// Result type for standings operations
pub type Result<T> = std::result::Result<T, StandingsError>;

/// Errors that can occur while refreshing or serving standings
#[derive(Error, Debug)]
pub enum StandingsError {
    #[error("HTTP error: {0}")]
    Http(String),

    #[error("Upstream returned {status} for {url}")]
    UpstreamStatus { url: String, status: u16 },

    #[error("Upstream contract violated: {0}")]
    UpstreamContract(String),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Invalid configuration: {0}")]
    Config(String),
}

impl From<reqwest::Error> for StandingsError {
    fn from(err: reqwest::Error) -> Self {
        StandingsError::Http(err.to_string())
    }
}

impl From<serde_json::Error> for StandingsError {
    fn from(err: serde_json::Error) -> Self {
        StandingsError::Serialization(err.to_string())
    }
}

impl From<rusqlite::Error> for StandingsError {
    fn from(err: rusqlite::Error) -> Self {
        StandingsError::Storage(err.to_string())
    }
}
