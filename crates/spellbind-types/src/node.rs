//! Spell node, layout position, and lock edge types.
//!
//! Nodes and their tree edges (`prerequisites`/`children`) are created by
//! the external tree generator and are read-only inputs to this engine:
//! the two edge lists are mutually consistent (B in A's `children` iff A in
//! B's `prerequisites`) and the engine never mutates them. The `locks`
//! list is the one field this engine owns.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::enums::Tier;
use crate::ids::SpellId;

// ---------------------------------------------------------------------------
// Position
// ---------------------------------------------------------------------------

/// Layout coordinates assigned to a node by the external placement pass.
///
/// Used only for the `nearby` candidate filter and proximity blending;
/// nodes without a position are simply excluded from distance-based pairs.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct Position {
    /// Horizontal canvas coordinate.
    pub x: f64,
    /// Vertical canvas coordinate.
    pub y: f64,
}

impl Position {
    /// Euclidean distance to another position.
    pub fn distance_to(&self, other: &Self) -> f64 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        dx.hypot(dy)
    }
}

// ---------------------------------------------------------------------------
// LockEdge
// ---------------------------------------------------------------------------

/// A hidden similarity-based prerequisite attached to a node.
///
/// Owned by the locked node; `target_id` names the spell that must be
/// learned first. At most one lock edge per distinct target per node.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export, export_to = "bindings/")]
pub struct LockEdge {
    /// The prerequisite spell this lock points at.
    pub target_id: SpellId,
    /// Similarity score that selected the target, rounded to 3 decimals.
    pub score: f64,
    /// Whether the lock has been revealed to the player. Starts `false`.
    pub revealed: bool,
}

impl LockEdge {
    /// Create an unrevealed lock edge.
    pub const fn new(target_id: SpellId, score: f64) -> Self {
        Self {
            target_id,
            score,
            revealed: false,
        }
    }
}

// ---------------------------------------------------------------------------
// SpellNode
// ---------------------------------------------------------------------------

/// One unlockable spell in the generated skill tree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export, export_to = "bindings/")]
pub struct SpellNode {
    /// Stable generator-supplied identifier.
    pub id: SpellId,
    /// The school (category) this spell belongs to.
    pub school: String,
    /// Display name; weighted double in similarity scoring.
    pub name: String,
    /// Flavor/description text, used only for scoring.
    #[serde(default)]
    pub desc: String,
    /// Effect names, used only for scoring.
    #[serde(default)]
    pub effects: Vec<String>,
    /// Whether this node is a school root. Roots never receive locks and
    /// never serve as lock targets.
    #[serde(default)]
    pub is_root: bool,
    /// Semantic skill-level label, when the generator supplies one.
    #[serde(default)]
    pub skill_level: Option<String>,
    /// Numeric tier hint: either an explicit tier index in `[0, 4]` or the
    /// node's raw tree depth. See [`Tier::resolve`] for the precedence.
    #[serde(default)]
    pub tier_hint: Option<u32>,
    /// Layout position, when the placement pass has run.
    #[serde(default)]
    pub position: Option<Position>,
    /// Tree ("hard") prerequisites. Read-only input.
    #[serde(default)]
    pub prerequisites: Vec<SpellId>,
    /// Inverse of `prerequisites`. Read-only input.
    #[serde(default)]
    pub children: Vec<SpellId>,
    /// Lock edges assigned by this engine.
    #[serde(default)]
    pub locks: Vec<LockEdge>,
}

impl SpellNode {
    /// Resolve this node's tier from its label and numeric hints.
    pub fn tier(&self) -> Tier {
        Tier::resolve(self.skill_level.as_deref(), self.tier_hint)
    }

    /// Whether this node already carries a lock pointing at `target`.
    pub fn has_lock_on(&self, target: &SpellId) -> bool {
        self.locks.iter().any(|l| &l.target_id == target)
    }

    /// Whether `candidate` is a direct tree prerequisite of this node.
    pub fn has_prerequisite(&self, candidate: &SpellId) -> bool {
        self.prerequisites.iter().any(|p| p == candidate)
    }

    /// Append a lock edge, rejecting duplicates per target.
    ///
    /// Returns `true` if the edge was added, `false` if a lock on the same
    /// target already existed.
    pub fn add_lock(&mut self, edge: LockEdge) -> bool {
        if self.has_lock_on(&edge.target_id) {
            return false;
        }
        self.locks.push(edge);
        true
    }

    /// Remove the lock pointing at `target`, if present.
    ///
    /// Returns `true` if a lock was removed. Removing an absent lock is a
    /// no-op, not an error.
    pub fn remove_lock(&mut self, target: &SpellId) -> bool {
        let before = self.locks.len();
        self.locks.retain(|l| &l.target_id != target);
        self.locks.len() < before
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_node(id: &str) -> SpellNode {
        SpellNode {
            id: SpellId::from(id),
            school: String::from("Destruction"),
            name: String::from("Firebolt"),
            desc: String::new(),
            effects: Vec::new(),
            is_root: false,
            skill_level: None,
            tier_hint: None,
            position: None,
            prerequisites: Vec::new(),
            children: Vec::new(),
            locks: Vec::new(),
        }
    }

    #[test]
    fn duplicate_lock_target_rejected() {
        let mut node = make_node("0x01");
        assert!(node.add_lock(LockEdge::new(SpellId::from("0x02"), 0.5)));
        assert!(!node.add_lock(LockEdge::new(SpellId::from("0x02"), 0.9)));
        assert_eq!(node.locks.len(), 1);
    }

    #[test]
    fn remove_lock_is_noop_when_absent() {
        let mut node = make_node("0x01");
        assert!(!node.remove_lock(&SpellId::from("0x02")));
        let _ = node.add_lock(LockEdge::new(SpellId::from("0x02"), 0.5));
        assert!(node.remove_lock(&SpellId::from("0x02")));
        assert!(node.locks.is_empty());
    }

    #[test]
    fn position_distance_is_euclidean() {
        let a = Position { x: 0.0, y: 0.0 };
        let b = Position { x: 3.0, y: 4.0 };
        assert!((a.distance_to(&b) - 5.0).abs() < 1e-9);
        assert!((b.distance_to(&a) - 5.0).abs() < 1e-9);
    }

    #[test]
    fn tier_uses_label_before_hint() {
        let mut node = make_node("0x01");
        node.skill_level = Some(String::from("Adept"));
        node.tier_hint = Some(0);
        assert_eq!(node.tier(), Tier::Adept);

        node.skill_level = None;
        assert_eq!(node.tier(), Tier::Novice);
    }

    #[test]
    fn node_deserializes_from_generator_json() {
        let json = r#"{
            "id": "0x000A26EA",
            "school": "Destruction",
            "name": "Firebolt",
            "desc": "A bolt of fire.",
            "effects": ["Fire Damage"],
            "isRoot": false,
            "skillLevel": "Apprentice",
            "prerequisites": ["0x000A26E0"],
            "children": []
        }"#;
        let node: SpellNode = serde_json::from_str(json).unwrap_or_else(|_| make_node("bad"));
        assert_eq!(node.id.as_str(), "0x000A26EA");
        assert_eq!(node.tier(), Tier::Apprentice);
        assert!(node.locks.is_empty());
    }
}
