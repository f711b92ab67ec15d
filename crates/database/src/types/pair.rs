//! Canonical unordered participant pair.

use crate::types::errors::{MessagingError, MessagingResult};
use serde::{Deserialize, Serialize};

/// Separator for the storage key. Identities are opaque strings, so a
/// control character keeps two distinct pairs from colliding on join.
const KEY_SEPARATOR: char = '\u{1f}';

/// The normalized identity pair that names a conversation.
///
/// Construction sorts the two identities, so `PairKey::new(a, b)` and
/// `PairKey::new(b, a)` are equal and index the same room.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PairKey {
    low: String,
    high: String,
}

impl PairKey {
    /// Build a pair key, rejecting empty or identical identities.
    pub fn new(a: &str, b: &str) -> MessagingResult<Self> {
        if a.is_empty() || b.is_empty() {
            return Err(MessagingError::InvalidParticipants(
                "participant identity must not be empty".to_string(),
            ));
        }
        if a == b {
            return Err(MessagingError::InvalidParticipants(format!(
                "sender and recipient must differ (both were {a})"
            )));
        }

        let (low, high) = if a <= b { (a, b) } else { (b, a) };
        Ok(Self {
            low: low.to_string(),
            high: high.to_string(),
        })
    }

    /// Lexicographically smaller participant.
    pub fn low(&self) -> &str {
        &self.low
    }

    /// Lexicographically larger participant.
    pub fn high(&self) -> &str {
        &self.high
    }

    /// The key stored and indexed in SQLite.
    pub fn storage_key(&self) -> String {
        format!("{}{}{}", self.low, KEY_SEPARATOR, self.high)
    }

}

impl std::fmt::Display for PairKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}<->{}", self.low, self.high)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn order_independent() {
        let ab = PairKey::new("alice", "bob").unwrap();
        let ba = PairKey::new("bob", "alice").unwrap();
        assert_eq!(ab, ba);
        assert_eq!(ab.storage_key(), ba.storage_key());
        assert_eq!(ab.low(), "alice");
        assert_eq!(ab.high(), "bob");
    }

    #[test]
    fn rejects_empty_identity() {
        let err = PairKey::new("", "bob").unwrap_err();
        assert!(matches!(err, MessagingError::InvalidParticipants(_)));

        let err = PairKey::new("alice", "").unwrap_err();
        assert!(matches!(err, MessagingError::InvalidParticipants(_)));
    }

    #[test]
    fn rejects_self_conversation() {
        let err = PairKey::new("alice", "alice").unwrap_err();
        assert!(matches!(err, MessagingError::InvalidParticipants(_)));
    }

    #[test]
    fn distinct_pairs_never_collide_on_storage_key() {
        // "a" + "b:c" vs "a:b" + "c" would collide with a plain ':' join.
        let first = PairKey::new("a", "b:c").unwrap();
        let second = PairKey::new("a:b", "c").unwrap();
        assert_ne!(first.storage_key(), second.storage_key());
    }
}
