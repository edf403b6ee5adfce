//! Voter identity resolution.
//!
//! Identities are opaque trust-on-first-use tokens: a client that supplies
//! one on connect keeps it verbatim, otherwise a fresh token is generated.
//! Vote records are keyed by identity, so a browser that reconnects with
//! its stored token keeps its voting history for the process lifetime.

use std::time::{SystemTime, UNIX_EPOCH};

use rand::distr::Alphanumeric;
use rand::Rng;

/// Length of the random suffix appended to generated identities.
/// 9 alphanumeric characters is ~53 bits of entropy, more than enough to
/// rule out collisions across a single process lifetime.
const SUFFIX_LEN: usize = 9;

/// Resolve a client identity from optional connection metadata.
/// A non-empty supplied token is trusted verbatim; anything else gets a
/// newly generated token.
pub fn resolve(supplied: Option<&str>) -> String {
    match supplied {
        Some(id) if !id.is_empty() => id.to_string(),
        _ => generate(),
    }
}

/// Generate a fresh identity: epoch-millis timestamp plus a random
/// alphanumeric suffix.
fn generate() -> String {
    let millis = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis();

    let suffix: String = rand::rng()
        .sample_iter(Alphanumeric)
        .take(SUFFIX_LEN)
        .map(char::from)
        .collect();

    format!("user-{}-{}", millis, suffix)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn supplied_identity_is_kept_verbatim() {
        assert_eq!(resolve(Some("u1")), "u1");
        assert_eq!(resolve(Some("user-123-abcdefghi")), "user-123-abcdefghi");
    }

    #[test]
    fn empty_or_missing_identity_is_generated() {
        let generated = resolve(None);
        assert!(generated.starts_with("user-"));

        let from_empty = resolve(Some(""));
        assert!(from_empty.starts_with("user-"));
    }

    #[test]
    fn generated_identities_are_unique() {
        let mut seen = HashSet::new();
        for _ in 0..1000 {
            assert!(seen.insert(resolve(None)), "duplicate generated identity");
        }
    }
}
