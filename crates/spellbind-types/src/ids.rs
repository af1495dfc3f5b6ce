//! Type-safe identifier wrappers for lock-engine entities.
//!
//! Spell node identifiers are stable strings minted by the external tree
//! generator (game form IDs such as `"0x000A26EA"`); the engine never
//! creates them, only carries them. Scorer request identifiers are UUID v4
//! values minted locally so that concurrent in-flight scoring requests can
//! never cross-talk.

use serde::{Deserialize, Serialize};
use ts_rs::TS;
use uuid::Uuid;

/// Unique identifier for a spell node in the skill tree.
///
/// Wraps the generator-supplied form ID string. Ordered and hashable so it
/// can key the graph's `BTreeMap` storage.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct SpellId(pub String);

impl SpellId {
    /// Wrap a raw form-ID string.
    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    /// Return the identifier as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consume the wrapper and return the inner string.
    pub fn into_inner(self) -> String {
        self.0
    }
}

impl core::fmt::Display for SpellId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for SpellId {
    fn from(raw: String) -> Self {
        Self(raw)
    }
}

impl From<&str> for SpellId {
    fn from(raw: &str) -> Self {
        Self(String::from(raw))
    }
}

impl From<SpellId> for String {
    fn from(id: SpellId) -> Self {
        id.0
    }
}

/// Correlation identifier for one dispatched scoring request.
///
/// Every request sent over the scorer bridge carries a fresh `RequestId`,
/// and the matching response echoes it back, so a late or duplicate reply
/// can never be applied to the wrong batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct RequestId(pub Uuid);

impl RequestId {
    /// Create a new random request identifier.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Return the inner [`Uuid`] value.
    pub const fn into_inner(self) -> Uuid {
        self.0
    }
}

impl Default for RequestId {
    fn default() -> Self {
        Self::new()
    }
}

impl core::fmt::Display for RequestId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn spell_id_round_trip() {
        let id = SpellId::from("0x000A26EA");
        assert_eq!(id.as_str(), "0x000A26EA");
        assert_eq!(String::from(id), "0x000A26EA");
    }

    #[test]
    fn spell_id_ordering_is_stable() {
        let a = SpellId::from("0x0001");
        let b = SpellId::from("0x0002");
        assert!(a < b);
    }

    #[test]
    fn request_ids_are_unique() {
        assert_ne!(RequestId::new(), RequestId::new());
    }

    #[test]
    fn spell_id_serializes_as_plain_string() {
        let id = SpellId::from("0x000A26EA");
        let json = serde_json::to_string(&id).unwrap_or_default();
        assert_eq!(json, "\"0x000A26EA\"");
    }
}
