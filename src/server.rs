//! Standings HTTP Server
//!
//! ```text
//! standings serve
//!  ├── Refresh scheduler (background, interval)
//!  │   └── catalog → half → leaderboards → merge → single put
//!  └── Query API (concurrent, read-only)
//!      └── GET / → one snapshot read → view
//! ```

use crate::api::{health_check, query_standings, ApiState};
use axum::{routing::get, Router};
use std::future::Future;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::info;

pub fn router(state: Arc<ApiState>) -> Router {
    Router::new()
        .route("/", get(query_standings))
        .route("/health", get(health_check))
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state)
}

pub async fn run_server<F>(
    state: Arc<ApiState>,
    host: &str,
    port: u16,
    shutdown: F,
) -> anyhow::Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    let app = router(state);

    let addr = format!("{}:{}", host, port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    info!("╔══════════════════════════════════════════════════════════════╗");
    info!("║                 Speedrun Standings Server                    ║");
    info!("╠══════════════════════════════════════════════════════════════╣");
    info!("║  Listening on: {:44} ║", addr);
    info!("╠══════════════════════════════════════════════════════════════╣");
    info!("║  Endpoints:                                                  ║");
    info!("║    GET  /?runner=&level= - Standings views                   ║");
    info!("║    GET  /health          - Health check                      ║");
    info!("╚══════════════════════════════════════════════════════════════╝");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown)
        .await?;

    Ok(())
}
