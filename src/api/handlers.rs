//! Request Dispatcher
//!
//! `GET /?runner=..&level=..` reads the snapshot once and answers with:
//! - `200 application/json` `{"data": .., "lastUpdated": ..}` on a hit
//! - `200 text/plain` `no data found` on a miss or before the first refresh
//! - `500 text/plain` with the error text on any failure

use super::state::ApiState;
use crate::error::Result;
use crate::query::{self, QueryFilter, QueryResult};
use axum::{
    extract::{rejection::QueryRejection, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::sync::Arc;
use tracing::{debug, error};

pub const NO_DATA: &str = "no data found";

#[derive(Debug, Clone, Serialize)]
pub struct QueryResponse {
    pub data: QueryResult,
    #[serde(rename = "lastUpdated")]
    pub last_updated: DateTime<Utc>,
}

/// GET / - standings views over the current snapshot
pub async fn query_standings(
    State(state): State<Arc<ApiState>>,
    query: std::result::Result<Query<QueryFilter>, QueryRejection>,
) -> Response {
    let filter = match query {
        Ok(Query(filter)) => filter.normalized(),
        Err(rejection) => {
            error!("Failed to parse query string: {}", rejection);
            return (StatusCode::INTERNAL_SERVER_ERROR, rejection.body_text()).into_response();
        }
    };

    match dispatch(&state, &filter).await {
        Ok(Some(body)) => Json(body).into_response(),
        Ok(None) => {
            debug!("No data for {:?}", filter);
            (StatusCode::OK, NO_DATA).into_response()
        }
        Err(e) => {
            error!("Query {:?} failed: {}", filter, e);
            (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()).into_response()
        }
    }
}

async fn dispatch(state: &ApiState, filter: &QueryFilter) -> Result<Option<QueryResponse>> {
    let Some(snapshot) = state.snapshots.load().await? else {
        return Ok(None);
    };

    Ok(
        query::execute(&snapshot.runs, filter).map(|data| QueryResponse {
            data,
            last_updated: snapshot.last_updated,
        }),
    )
}

pub async fn health_check() -> &'static str {
    "OK"
}
