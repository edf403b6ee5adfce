use axum::{extract::State, routing::get, Json, Router};
use tower_http::services::ServeDir;

use crate::page;
use crate::poll::VoteTally;
use crate::state::AppState;
use crate::ws::handler as ws_handler;

/// Build the full axum Router: the watched page at /, the realtime
/// gateway at /ws, read-only poll endpoints, and sibling static assets
/// as the fallback.
pub fn build_router(state: AppState) -> Router {
    let assets = ServeDir::new(state.static_root.as_ref().clone());

    Router::new()
        .route("/", get(page::serve_page))
        .route("/ws", get(ws_handler::ws_upgrade))
        .route("/api/poll", get(poll_snapshot))
        .route("/api/online", get(online_count))
        .route("/health", get(health_check))
        .fallback_service(assets)
        .with_state(state)
}

/// GET /api/poll — current tally snapshot.
async fn poll_snapshot(State(state): State<AppState>) -> Json<VoteTally> {
    Json(state.ledger.tally())
}

#[derive(serde::Serialize)]
struct OnlineResponse {
    count: usize,
}

/// GET /api/online — number of connected sessions.
async fn online_count(State(state): State<AppState>) -> Json<OnlineResponse> {
    Json(OnlineResponse {
        count: state.sessions.count(),
    })
}

/// Basic health check endpoint
async fn health_check() -> &'static str {
    "ok"
}
