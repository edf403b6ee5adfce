//! Actor-per-connection handling for the realtime gateway.
//!
//! Each accepted WebSocket gets a reader loop plus a spawned writer task
//! draining an mpsc channel into the sink. Cloning the channel sender is
//! how the broadcast hub reaches this client. A periodic WebSocket-level
//! ping guards against silently dead peers.

use axum::extract::ws::{CloseFrame, Message, WebSocket};
use futures_util::{SinkExt, StreamExt};
use std::net::SocketAddr;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::time::{interval, timeout};

use crate::identity;
use crate::state::AppState;
use crate::ws::protocol::{self, ServerEvent};

/// Ping interval: server sends a WebSocket ping every 30 seconds to
/// detect connections that died without a close frame.
const PING_INTERVAL: Duration = Duration::from_secs(30);

/// Pong timeout: if no pong arrives within 10 seconds of a ping, close.
const PONG_TIMEOUT: Duration = Duration::from_secs(10);

/// Run one connection's lifecycle.
///
/// On connect: resolve the identity, register the session, broadcast the
/// updated online count, then send this session its id and the current
/// tally over its own channel, in that order. On disconnect: remove the
/// session and broadcast the updated count to everyone left.
pub async fn run_connection(
    socket: WebSocket,
    state: AppState,
    supplied_id: Option<String>,
    remote_addr: SocketAddr,
    client_descriptor: String,
) {
    let identity = identity::resolve(supplied_id.as_deref());
    let session = state
        .sessions
        .register(identity.clone(), remote_addr, client_descriptor);

    let (ws_sender, mut ws_receiver) = socket.split();
    let (tx, rx) = mpsc::unbounded_channel::<Message>();

    // Register the delivery channel before announcing the count so the
    // new session sees its own connect reflected.
    state.hub.add_channel(session.id, tx.clone());
    state
        .hub
        .announce(&ServerEvent::UserCount(state.sessions.count()));
    state
        .hub
        .send_to(session.id, &ServerEvent::UserId(identity.clone()));
    state
        .hub
        .send_to(session.id, &ServerEvent::VoteUpdate(state.ledger.tally()));

    tracing::info!(
        session_id = session.id,
        identity = %identity,
        remote_addr = %remote_addr,
        "Client connected"
    );

    // Writer task: forwards mpsc messages to the WebSocket sink.
    let writer_handle = tokio::spawn(writer_task(ws_sender, rx));

    // Track pong reception for the keep-alive probe.
    let (pong_tx, mut pong_rx) = mpsc::unbounded_channel::<()>();

    let ping_tx = tx.clone();
    let ping_handle = tokio::spawn(async move {
        let mut ping_timer = interval(PING_INTERVAL);
        // Skip the first immediate tick.
        ping_timer.tick().await;

        loop {
            ping_timer.tick().await;

            if ping_tx.send(Message::Ping(vec![1, 2, 3, 4].into())).is_err() {
                // Writer task has died, the connection is gone.
                break;
            }

            match timeout(PONG_TIMEOUT, pong_rx.recv()).await {
                Ok(Some(())) => {}
                _ => {
                    tracing::warn!("Pong timeout, closing connection");
                    let _ = ping_tx.send(Message::Close(Some(CloseFrame {
                        code: 1001,
                        reason: "Pong timeout".into(),
                    })));
                    break;
                }
            }
        }
    });

    // Reader loop: dispatch incoming frames until the peer goes away.
    loop {
        match ws_receiver.next().await {
            Some(Ok(msg)) => match msg {
                Message::Text(text) => {
                    protocol::handle_text_message(text.as_str(), &state, session.id, &identity);
                }
                Message::Binary(_) => {
                    tracing::debug!(
                        session_id = session.id,
                        "Received binary frame (expected JSON text), ignoring"
                    );
                }
                Message::Pong(_) => {
                    let _ = pong_tx.send(());
                }
                Message::Ping(data) => {
                    let _ = tx.send(Message::Pong(data));
                }
                Message::Close(frame) => {
                    tracing::info!(
                        session_id = session.id,
                        reason = ?frame,
                        "Client initiated close"
                    );
                    break;
                }
            },
            Some(Err(e)) => {
                tracing::warn!(
                    session_id = session.id,
                    error = %e,
                    "WebSocket receive error"
                );
                break;
            }
            None => {
                tracing::info!(session_id = session.id, "WebSocket stream ended");
                break;
            }
        }
    }

    writer_handle.abort();
    ping_handle.abort();

    state.hub.remove_channel(session.id);
    state.sessions.remove(session.id);
    state
        .hub
        .announce(&ServerEvent::UserCount(state.sessions.count()));

    tracing::info!(
        session_id = session.id,
        identity = %identity,
        "Client disconnected"
    );
}

/// Writer task: receives messages from the mpsc channel and forwards
/// them to the WebSocket sink.
async fn writer_task(
    mut ws_sender: futures_util::stream::SplitSink<WebSocket, Message>,
    mut rx: mpsc::UnboundedReceiver<Message>,
) {
    while let Some(msg) = rx.recv().await {
        if ws_sender.send(msg).await.is_err() {
            // Send failed, the connection is broken.
            break;
        }
    }
}
