//! Integration tests for the HTTP surface: page serving with bootstrap
//! injection, poll/online snapshots, and the health check.

use std::net::SocketAddr;
use tokio::net::TcpListener;

use vibecheck_server::poll::VotePolicy;
use vibecheck_server::routes::build_router;
use vibecheck_server::state::AppState;

async fn start_test_server(page_html: &str) -> (AppState, String, tempfile::TempDir) {
    let tmp_dir = tempfile::tempdir().expect("Failed to create temp dir");
    let page_path = tmp_dir.path().join("index.html");
    std::fs::write(&page_path, page_html).expect("Failed to write page");

    let state = AppState::new(VotePolicy::Replace, page_path);
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

    (state, format!("http://{}", addr), tmp_dir)
}

#[tokio::test]
async fn page_is_served_with_bootstrap_injected() {
    let (_state, base_url, _tmp) =
        start_test_server("<html><body><h1>vibe check</h1></body></html>").await;

    let body = reqwest::get(format!("{}/", base_url))
        .await
        .unwrap()
        .text()
        .await
        .unwrap();

    assert!(body.contains("<h1>vibe check</h1>"));
    let script_pos = body
        .find("data-vibecheck=\"bootstrap\"")
        .expect("bootstrap script injected");
    let body_close = body.rfind("</body>").unwrap();
    assert!(script_pos < body_close, "script sits before </body>");
}

#[tokio::test]
async fn missing_page_returns_404() {
    let (state, base_url, tmp) = start_test_server("<html></html>").await;
    std::fs::remove_file(state.page_path.as_ref()).unwrap();

    let resp = reqwest::get(format!("{}/", base_url)).await.unwrap();
    assert_eq!(resp.status(), 404);
    drop(tmp);
}

#[tokio::test]
async fn sibling_assets_are_served_from_the_page_directory() {
    let (state, base_url, _tmp) = start_test_server("<html></html>").await;
    let css_path = state.page_path.parent().unwrap().join("style.css");
    std::fs::write(&css_path, "body { background: #222; }").unwrap();

    let resp = reqwest::get(format!("{}/style.css", base_url)).await.unwrap();
    assert_eq!(resp.status(), 200);
    let body = resp.text().await.unwrap();
    assert!(body.contains("background"));
}

#[tokio::test]
async fn poll_snapshot_reflects_the_ledger() {
    let (state, base_url, _tmp) = start_test_server("<html></html>").await;

    state.ledger.cast_vote("u1", "good").unwrap();
    state.ledger.cast_vote("u2", "good").unwrap();
    state.ledger.cast_vote("u3", "bad").unwrap();

    let tally: serde_json::Value = reqwest::get(format!("{}/api/poll", base_url))
        .await
        .unwrap()
        .json()
        .await
        .unwrap();

    assert_eq!(tally["good"], 2);
    assert_eq!(tally["bad"], 1);
    assert_eq!(tally["total"], 3);
}

#[tokio::test]
async fn online_count_reflects_the_registry() {
    let (state, base_url, _tmp) = start_test_server("<html></html>").await;

    let addr = "127.0.0.1:4000".parse().unwrap();
    let session = state
        .sessions
        .register("u1".to_string(), addr, "test-agent".to_string());

    let online: serde_json::Value = reqwest::get(format!("{}/api/online", base_url))
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(online["count"], 1);

    state.sessions.remove(session.id);
    let online: serde_json::Value = reqwest::get(format!("{}/api/online", base_url))
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(online["count"], 0);
}

#[tokio::test]
async fn health_check_responds() {
    let (_state, base_url, _tmp) = start_test_server("<html></html>").await;

    let resp = reqwest::get(format!("{}/health", base_url)).await.unwrap();
    assert_eq!(resp.status(), 200);
    assert_eq!(resp.text().await.unwrap(), "ok");
}
