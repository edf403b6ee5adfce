//! Decorative rejection messages for the good-vibes-only deployment.
//!
//! The reject-bad policy answers every "bad" vote with one of these,
//! chosen at random. The catalog is injected at ledger construction so
//! deployments can swap it and tests can pin a single entry.

/// Default catalog shipped with the reject-bad policy.
pub const DEFAULT_REJECTION_MESSAGES: &[&str] = &[
    "ERROR 404: Negativity not found in this dimension 🌈",
    "SYSTEM MALFUNCTION: Bad vibes detected, redirecting to happiness protocol ✨",
    "COSMIC INTERFERENCE: The universe rejects your pessimism 🛸",
    "TECHNICAL DIFFICULTY: Our servers are allergic to bad vibes 🤧",
    "CONNECTION TIMEOUT: Your negativity is buffering... please try positivity instead 🔄",
    "SECURITY ALERT: Bad vibes blocked by our happiness firewall 🔒",
    "DATABASE ERROR: Table 'bad_vibes' has been deleted by the joy department 💫",
    "NETWORK REJECTED: This network only supports good vibes transmission 📡",
];

/// Owned copy of the default catalog.
pub fn default_catalog() -> Vec<String> {
    DEFAULT_REJECTION_MESSAGES
        .iter()
        .map(|m| m.to_string())
        .collect()
}
