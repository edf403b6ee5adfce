//! WebSocket upgrade endpoint.

use axum::{
    extract::{ws::WebSocketUpgrade, ConnectInfo, Query, State},
    http::{header, HeaderMap},
    response::Response,
};
use serde::Deserialize;
use std::net::SocketAddr;

use crate::state::AppState;
use crate::ws::actor;

/// Query parameters for a WebSocket connection. A returning browser
/// passes the identity it was issued earlier; first-timers omit it.
#[derive(Debug, Deserialize)]
pub struct WsConnectQuery {
    #[serde(default, rename = "userId")]
    pub user_id: Option<String>,
}

/// GET /ws?userId=...
/// Upgrades the connection and hands it to the per-connection actor
/// along with the remote address and client descriptor.
pub async fn ws_upgrade(
    State(state): State<AppState>,
    Query(params): Query<WsConnectQuery>,
    ConnectInfo(remote_addr): ConnectInfo<SocketAddr>,
    headers: HeaderMap,
    ws: WebSocketUpgrade,
) -> Response {
    let client_descriptor = headers
        .get(header::USER_AGENT)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("unknown")
        .to_string();

    ws.on_upgrade(move |socket| {
        actor::run_connection(socket, state, params.user_id, remote_addr, client_descriptor)
    })
}
