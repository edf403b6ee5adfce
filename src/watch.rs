//! File watcher feeding reload signals into the broadcast hub.
//!
//! Watches the page's parent directory (editors commonly replace files
//! on save, which breaks a watch on the file itself) and relays change
//! events for the page as external reload signals. The hub never sees
//! notify types; this module is the producer side of `relay_external`.

use std::ffi::OsString;
use std::path::Path;

use notify::{Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use tokio::sync::mpsc;

use crate::ws::hub::BroadcastHub;
use crate::ws::protocol::ServerEvent;

/// Start watching the page file and spawn the relay task.
///
/// Returns the watcher, which must be kept alive for the lifetime of the
/// server; dropping it stops the event stream. Failure to establish the
/// watch is a configuration error and should abort startup.
pub fn spawn(page_path: &Path, hub: BroadcastHub) -> notify::Result<RecommendedWatcher> {
    let watch_dir = page_path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));
    let page_name: OsString = page_path
        .file_name()
        .map(OsString::from)
        .unwrap_or_default();

    let (tx, mut rx) = mpsc::unbounded_channel::<notify::Result<Event>>();
    let mut watcher = notify::recommended_watcher(move |res| {
        let _ = tx.send(res);
    })?;
    watcher.watch(watch_dir, RecursiveMode::NonRecursive)?;

    tracing::info!(
        page = %page_path.display(),
        "Watching page for changes"
    );

    let page_path = page_path.to_path_buf();
    tokio::spawn(async move {
        while let Some(res) = rx.recv().await {
            match res {
                Ok(event) => {
                    if !is_content_change(&event.kind) {
                        continue;
                    }
                    let touches_page = event
                        .paths
                        .iter()
                        .any(|p| p.file_name() == Some(page_name.as_os_str()));
                    if touches_page {
                        tracing::info!(
                            page = %page_path.display(),
                            "Page changed, broadcasting reload"
                        );
                        hub.relay_external(&ServerEvent::Reload);
                    }
                }
                Err(e) => {
                    tracing::warn!(error = %e, "File watch error");
                }
            }
        }
    });

    Ok(watcher)
}

/// Modify and create cover both in-place writes and the write-temp-then-
/// rename save strategy.
fn is_content_change(kind: &EventKind) -> bool {
    matches!(kind, EventKind::Modify(_) | EventKind::Create(_))
}
