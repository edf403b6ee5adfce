//! End-to-end live-reload: a change to the watched page reaches every
//! connected client as a reload event.

use futures_util::StreamExt;
use serde_json::Value;
use std::net::SocketAddr;
use std::time::Duration;
use tokio::net::TcpListener;
use tokio_tungstenite::tungstenite::Message;

use vibecheck_server::poll::VotePolicy;
use vibecheck_server::routes::build_router;
use vibecheck_server::state::AppState;
use vibecheck_server::watch;

type WsStream =
    tokio_tungstenite::WebSocketStream<tokio_tungstenite::MaybeTlsStream<tokio::net::TcpStream>>;

async fn next_event(ws: &mut WsStream, window: Duration) -> Value {
    loop {
        let msg = tokio::time::timeout(window, ws.next())
            .await
            .expect("Timed out waiting for event")
            .expect("WebSocket stream ended")
            .expect("WebSocket error");
        match msg {
            Message::Text(text) => {
                return serde_json::from_str(text.as_str()).expect("Event frames are JSON")
            }
            Message::Ping(_) | Message::Pong(_) => continue,
            other => panic!("Unexpected frame: {:?}", other),
        }
    }
}

#[tokio::test]
async fn page_change_broadcasts_reload_to_connected_clients() {
    let tmp_dir = tempfile::tempdir().expect("Failed to create temp dir");
    let page_path = tmp_dir.path().join("index.html");
    std::fs::write(&page_path, "<html><body>v1</body></html>").unwrap();

    let state = AppState::new(VotePolicy::Replace, page_path.clone());
    let _watcher =
        watch::spawn(&state.page_path, state.hub.clone()).expect("Failed to start watcher");

    let app = build_router(state.clone());
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(
            listener,
            app.into_make_service_with_connect_info::<SocketAddr>(),
        )
        .await
        .unwrap();
    });

    let (mut ws, _) = tokio_tungstenite::connect_async(format!("ws://{}/ws", addr))
        .await
        .expect("Failed to connect");

    // Connect handshake: userCount, userId, voteUpdate.
    for expected in ["userCount", "userId", "voteUpdate"] {
        let event = next_event(&mut ws, Duration::from_secs(5)).await;
        assert_eq!(event["event"], expected);
    }

    // Give the watcher a beat to be fully established, then edit the page.
    tokio::time::sleep(Duration::from_millis(200)).await;
    std::fs::write(&page_path, "<html><body>v2</body></html>").unwrap();

    let event = next_event(&mut ws, Duration::from_secs(10)).await;
    assert_eq!(event["event"], "reload");
}

#[tokio::test]
async fn unrelated_sibling_files_do_not_trigger_reload() {
    let tmp_dir = tempfile::tempdir().expect("Failed to create temp dir");
    let page_path = tmp_dir.path().join("index.html");
    std::fs::write(&page_path, "<html></html>").unwrap();

    let state = AppState::new(VotePolicy::Replace, page_path.clone());
    let _watcher =
        watch::spawn(&state.page_path, state.hub.clone()).expect("Failed to start watcher");

    // Register a bare channel instead of a full connection; only delivery
    // matters here.
    let (tx, mut rx) = tokio::sync::mpsc::unbounded_channel();
    state.hub.add_channel(1, tx);

    tokio::time::sleep(Duration::from_millis(200)).await;
    std::fs::write(tmp_dir.path().join("notes.txt"), "scratch").unwrap();

    let got = tokio::time::timeout(Duration::from_millis(800), rx.recv()).await;
    assert!(got.is_err(), "expected no reload for sibling file");

    std::fs::write(&page_path, "<html>v2</html>").unwrap();
    let msg = tokio::time::timeout(Duration::from_secs(10), rx.recv())
        .await
        .expect("Timed out waiting for reload")
        .expect("Channel closed");
    match msg {
        axum::extract::ws::Message::Text(text) => {
            assert!(text.as_str().contains("reload"));
        }
        other => panic!("Unexpected frame: {:?}", other),
    }
}
