//! Serving of the watched HTML document.
//!
//! The page is read from disk on every request and gets the client
//! bootstrap script injected before `</body>` at response time. The file
//! itself is never rewritten; edits to it are what trigger live reloads,
//! so writing into it from the server would loop.

use axum::{
    extract::State,
    http::StatusCode,
    response::{Html, IntoResponse, Response},
};

use crate::state::AppState;

/// Marker attribute used to detect a page that already carries the
/// bootstrap (e.g. saved from a served copy).
const SCRIPT_MARKER: &str = "data-vibecheck=\"bootstrap\"";

/// Client bootstrap: opens the realtime socket, persists the issued
/// identity, reloads on file-change signals, and keeps the session warm
/// with application-level pings. Exposed as `window.vibecheck.vote` for
/// the page's own poll UI.
const BOOTSTRAP_SCRIPT: &str = r#"
    <script data-vibecheck="bootstrap">
        (() => {
            const params = new URLSearchParams(window.location.search);
            const stored = params.get('userId') || localStorage.getItem('userId');
            const query = stored ? `?userId=${encodeURIComponent(stored)}` : '';
            const proto = window.location.protocol === 'https:' ? 'wss' : 'ws';
            const socket = new WebSocket(`${proto}://${window.location.host}/ws${query}`);

            socket.addEventListener('message', (raw) => {
                let msg;
                try { msg = JSON.parse(raw.data); } catch { return; }
                if (msg.event === 'userId') {
                    localStorage.setItem('userId', msg.data);
                }
                if (msg.event === 'reload') {
                    console.log('Reloading page...');
                    window.location.reload();
                }
            });

            socket.addEventListener('close', () => {
                console.log('Disconnected from server, will reload in 1 second...');
                setTimeout(() => window.location.reload(), 1000);
            });

            setInterval(() => {
                if (socket.readyState === WebSocket.OPEN) {
                    socket.send(JSON.stringify({ event: 'ping' }));
                }
            }, 30000);

            window.vibecheck = {
                socket,
                vote: (option) => socket.send(JSON.stringify({ event: 'vote', data: { option } })),
            };
        })();
    </script>
"#;

/// Inject the bootstrap script before the closing body tag. Pages that
/// already carry the marker, or have no `</body>` at all, get the script
/// appended-in-place semantics the browser still accepts.
pub fn inject_bootstrap(html: &str) -> String {
    if html.contains(SCRIPT_MARKER) {
        return html.to_string();
    }

    match html.rfind("</body>") {
        Some(pos) => {
            let mut injected = String::with_capacity(html.len() + BOOTSTRAP_SCRIPT.len());
            injected.push_str(&html[..pos]);
            injected.push_str(BOOTSTRAP_SCRIPT);
            injected.push_str(&html[pos..]);
            injected
        }
        None => {
            let mut injected = html.to_string();
            injected.push_str(BOOTSTRAP_SCRIPT);
            injected
        }
    }
}

/// GET / — the watched page with the bootstrap script injected.
pub async fn serve_page(State(state): State<AppState>) -> Response {
    match tokio::fs::read_to_string(state.page_path.as_ref()).await {
        Ok(contents) => Html(inject_bootstrap(&contents)).into_response(),
        Err(e) => {
            tracing::warn!(
                page = %state.page_path.display(),
                error = %e,
                "Failed to read page"
            );
            (StatusCode::NOT_FOUND, "page not found").into_response()
        }
    }
}
