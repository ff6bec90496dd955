//! HTTP query API.

pub mod handlers;
pub mod state;

pub use handlers::{health_check, query_standings, QueryResponse, NO_DATA};
pub use state::ApiState;
