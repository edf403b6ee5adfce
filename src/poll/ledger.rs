//! Vote ledger: aggregate tallies plus per-identity vote records.
//!
//! The ledger is the one piece of state with real invariants. Every
//! read-modify-write runs under a single mutex acquisition, so a tally
//! snapshot can never observe a half-applied vote and `total` always
//! equals `good + bad` under the replace policy.
//!
//! Three deployment variants exist and are modeled as one ledger
//! parameterized by `VotePolicy`, picked at construction time.

use std::collections::HashMap;
use std::sync::Mutex;

use rand::Rng;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// The two recognized poll options.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VoteOption {
    Good,
    Bad,
}

impl VoteOption {
    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "good" => Some(Self::Good),
            "bad" => Some(Self::Bad),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Good => "good",
            Self::Bad => "bad",
        }
    }
}

/// How repeat and unwelcome votes are treated.
#[derive(Debug, Clone)]
pub enum VotePolicy {
    /// An identity may change its vote; the old option is decremented and
    /// the tally carries a running total.
    Replace,
    /// First vote wins; later attempts are refused without mutation and
    /// the tally carries no total.
    Immutable,
    /// One option is refused unconditionally with a decorative message
    /// drawn from the catalog; the surviving option behaves like Replace.
    RejectOption {
        option: VoteOption,
        catalog: Vec<String>,
    },
}

/// Aggregate counts pushed to clients. `total` is present only for
/// policies that track it (replace and reject-option).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct VoteTally {
    pub good: u64,
    pub bad: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total: Option<u64>,
}

#[derive(Debug, Error)]
pub enum VoteError {
    /// Malformed vote payload; nothing recognized to count.
    #[error("unrecognized vote option: {0:?}")]
    InvalidOption(String),
    /// Duplicate attempt under the immutable policy.
    #[error("identity has already voted")]
    AlreadyVoted,
    /// The policy refuses this option outright.
    #[error("{0}")]
    Rejected(String),
}

#[derive(Default)]
struct LedgerInner {
    good: u64,
    bad: u64,
    votes: HashMap<String, VoteOption>,
}

/// In-memory vote ledger. Records are keyed by identity, not session,
/// so a voter that reconnects keeps their record.
pub struct VoteLedger {
    policy: VotePolicy,
    inner: Mutex<LedgerInner>,
}

impl VoteLedger {
    pub fn new(policy: VotePolicy) -> Self {
        Self {
            policy,
            inner: Mutex::new(LedgerInner::default()),
        }
    }

    fn tracks_total(&self) -> bool {
        !matches!(self.policy, VotePolicy::Immutable)
    }

    /// Consistent snapshot of the current counts.
    pub fn tally(&self) -> VoteTally {
        let inner = self.inner.lock().expect("vote ledger lock poisoned");
        self.snapshot(&inner)
    }

    fn snapshot(&self, inner: &LedgerInner) -> VoteTally {
        VoteTally {
            good: inner.good,
            bad: inner.bad,
            total: self.tracks_total().then_some(inner.good + inner.bad),
        }
    }

    /// Validate and apply one vote. On success the returned tally is the
    /// state immediately after this vote; every failure leaves the ledger
    /// untouched.
    pub fn cast_vote(&self, identity: &str, option: &str) -> Result<VoteTally, VoteError> {
        let option = VoteOption::from_str(option)
            .ok_or_else(|| VoteError::InvalidOption(option.to_string()))?;

        // The reject-option check happens before any state is consulted:
        // a refused option never even looks at prior votes.
        if let VotePolicy::RejectOption {
            option: refused,
            catalog,
        } = &self.policy
        {
            if option == *refused {
                let message = match catalog.len() {
                    0 => "vote rejected".to_string(),
                    len => catalog[rand::rng().random_range(0..len)].clone(),
                };
                return Err(VoteError::Rejected(message));
            }
        }

        let mut inner = self.inner.lock().expect("vote ledger lock poisoned");

        match self.policy {
            VotePolicy::Immutable => {
                if inner.votes.contains_key(identity) {
                    return Err(VoteError::AlreadyVoted);
                }
                *count_mut(&mut inner, option) += 1;
                inner.votes.insert(identity.to_string(), option);
            }
            VotePolicy::Replace | VotePolicy::RejectOption { .. } => {
                match inner.votes.get(identity).copied() {
                    Some(previous) if previous == option => {
                        // Re-casting the same option changes nothing.
                        return Ok(self.snapshot(&inner));
                    }
                    Some(previous) => {
                        *count_mut(&mut inner, previous) -= 1;
                        *count_mut(&mut inner, option) += 1;
                        inner.votes.insert(identity.to_string(), option);
                    }
                    None => {
                        *count_mut(&mut inner, option) += 1;
                        inner.votes.insert(identity.to_string(), option);
                    }
                }
            }
        }

        Ok(self.snapshot(&inner))
    }
}

fn count_mut(inner: &mut LedgerInner, option: VoteOption) -> &mut u64 {
    match option {
        VoteOption::Good => &mut inner.good,
        VoteOption::Bad => &mut inner.bad,
    }
}
