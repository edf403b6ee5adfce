use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::poll::{VoteLedger, VotePolicy};
use crate::session::SessionRegistry;
use crate::ws::hub::BroadcastHub;

/// Shared application state passed to all handlers via the axum State
/// extractor. Constructed once at startup (and fresh per test); nothing
/// in the core lives in file-scope globals.
#[derive(Clone)]
pub struct AppState {
    /// Live-session registry (online count, per-connection metadata)
    pub sessions: SessionRegistry,
    /// Vote tallies and per-identity records, policy applied at construction
    pub ledger: Arc<VoteLedger>,
    /// Fan-out of server events to connected sessions
    pub hub: BroadcastHub,
    /// The watched HTML document served at /
    pub page_path: Arc<PathBuf>,
    /// Root for sibling static assets (the page's directory)
    pub static_root: Arc<PathBuf>,
}

impl AppState {
    pub fn new(policy: VotePolicy, page_path: PathBuf) -> Self {
        let static_root = page_path
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from("."));

        Self {
            sessions: SessionRegistry::new(),
            ledger: Arc::new(VoteLedger::new(policy)),
            hub: BroadcastHub::new(),
            page_path: Arc::new(page_path),
            static_root: Arc::new(static_root),
        }
    }
}
