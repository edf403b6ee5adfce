//! Wire protocol: JSON event envelopes and inbound dispatch.
//!
//! Frames are JSON text of the form `{"event": ..., "data": ...}`, with
//! `data` omitted for payload-less events.

use serde::{Deserialize, Serialize};

use crate::poll::{VoteError, VoteTally};
use crate::session::SessionId;
use crate::state::AppState;

/// Events the client sends.
#[derive(Debug, Deserialize)]
#[serde(tag = "event", content = "data", rename_all = "camelCase")]
pub enum ClientEvent {
    /// Cast or change a vote.
    Vote(VotePayload),
    /// Application-level keep-alive; refreshes the session's activity
    /// timestamp. No response.
    Ping,
}

#[derive(Debug, Deserialize)]
pub struct VotePayload {
    pub option: String,
}

/// Events the server sends.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "event", content = "data", rename_all = "camelCase")]
pub enum ServerEvent {
    /// The session's resolved identity, sent once right after connect.
    UserId(String),
    /// Current online count, broadcast on every connect and disconnect.
    UserCount(usize),
    /// Current tally, broadcast on every successful vote and pushed to
    /// each newly connected session as initial state.
    VoteUpdate(VoteTally),
    /// Vote refusal, sent only to the session that voted.
    VoteError(String),
    /// The watched page changed on disk; clients should refresh.
    Reload,
}

/// Handle one inbound text frame from a connected session.
pub fn handle_text_message(text: &str, state: &AppState, session_id: SessionId, identity: &str) {
    let event = match serde_json::from_str::<ClientEvent>(text) {
        Ok(event) => event,
        Err(e) => {
            tracing::debug!(
                session_id,
                identity = %identity,
                error = %e,
                "Ignoring malformed client event"
            );
            return;
        }
    };

    match event {
        ClientEvent::Vote(payload) => handle_vote(state, session_id, identity, &payload.option),
        ClientEvent::Ping => state.sessions.touch(session_id),
    }
}

fn handle_vote(state: &AppState, session_id: SessionId, identity: &str, option: &str) {
    match state.ledger.cast_vote(identity, option) {
        Ok(tally) => {
            tracing::info!(
                identity = %identity,
                option = %option,
                good = tally.good,
                bad = tally.bad,
                "Vote recorded"
            );
            state.hub.announce(&ServerEvent::VoteUpdate(tally));
        }
        Err(VoteError::Rejected(message)) => {
            // Decorative refusals go back to the voter alone; nobody else
            // learns the attempt happened.
            tracing::info!(
                identity = %identity,
                message = %message,
                "Vote censored"
            );
            state
                .hub
                .send_to(session_id, &ServerEvent::VoteError(message));
        }
        Err(err @ (VoteError::InvalidOption(_) | VoteError::AlreadyVoted)) => {
            tracing::debug!(
                identity = %identity,
                option = %option,
                error = %err,
                "Vote ignored"
            );
        }
    }
}
