//! Assignment request and scoring payload types.
//!
//! A batch flows through three shapes: an [`AssignmentRequest`] (one
//! [`ScorePair`] per lock recipient, carrying the text the scorer needs),
//! ranked [`PoolScores`] produced by whichever scorer backend ran, and an
//! [`AssignmentSummary`] reporting what was committed. The pair/candidate
//! types serialize with camelCase names because they double as the wire
//! payload for the external scorer.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::ids::SpellId;
use crate::settings::LockSettings;

// ---------------------------------------------------------------------------
// Scoring inputs
// ---------------------------------------------------------------------------

/// The text fields of a spell that participate in similarity scoring.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SpellText {
    /// Display name; counted twice when building the scoring blob.
    pub name: String,
    /// Description text.
    #[serde(default)]
    pub desc: String,
    /// Effect names.
    #[serde(default)]
    pub effects: Vec<String>,
}

/// One legal lock candidate for a spell, with its scoring text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CandidateText {
    /// The candidate node's identifier.
    pub node_id: SpellId,
    /// Display name.
    pub name: String,
    /// Description text.
    #[serde(default)]
    pub desc: String,
    /// Effect names.
    #[serde(default)]
    pub effects: Vec<String>,
    /// Layout distance from the queried spell. When either node lacks a
    /// position this carries the configured maximum distance, matching the
    /// external scorer's own default.
    pub distance: f64,
}

impl From<&CandidateText> for SpellText {
    fn from(candidate: &CandidateText) -> Self {
        Self {
            name: candidate.name.clone(),
            desc: candidate.desc.clone(),
            effects: candidate.effects.clone(),
        }
    }
}

/// A spell paired with its legal candidate pool.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScorePair {
    /// The spell that will receive a lock.
    pub spell_id: SpellId,
    /// Scoring text for the spell.
    pub spell: SpellText,
    /// The legal candidates, already filtered and capped.
    pub candidates: Vec<CandidateText>,
}

/// A full assignment batch: every (node, pool) pair plus the settings
/// snapshot the pools were built under.
#[derive(Debug, Clone, PartialEq)]
pub struct AssignmentRequest {
    /// One entry per lock recipient with a non-empty candidate pool.
    pub pairs: Vec<ScorePair>,
    /// The settings snapshot used to build the pools.
    pub settings: LockSettings,
}

impl AssignmentRequest {
    /// Whether the batch has no work to do.
    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }
}

// ---------------------------------------------------------------------------
// Scoring outputs
// ---------------------------------------------------------------------------

/// A single scored candidate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoredCandidate {
    /// The candidate this score belongs to.
    pub target_id: SpellId,
    /// Final score in `[0, 1]` (similarity, possibly proximity-blended).
    pub score: f64,
}

/// The ranked scoring result for one spell's candidate pool, sorted
/// descending by score.
#[derive(Debug, Clone, PartialEq)]
pub struct PoolScores {
    /// The spell the pool belongs to.
    pub spell_id: SpellId,
    /// Candidates in descending score order.
    pub ranked: Vec<ScoredCandidate>,
}

// ---------------------------------------------------------------------------
// Renderer edge view
// ---------------------------------------------------------------------------

/// A flattened lock edge for the renderer: `from` must be learned before
/// `to` unlocks.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export, export_to = "bindings/")]
pub struct LockBinding {
    /// The prerequisite end (the lock's target).
    pub from: SpellId,
    /// The gated end (the lock's owner).
    pub to: SpellId,
    /// The similarity score recorded on the edge.
    pub score: f64,
}

// ---------------------------------------------------------------------------
// Batch summary
// ---------------------------------------------------------------------------

/// Outcome of one assignment batch, with reconciled counts:
/// `locks_applied = attempted - skipped - removed_by_cycle_repair`,
/// floored at 0.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export, export_to = "bindings/")]
pub struct AssignmentSummary {
    /// Nodes that entered selection with a non-empty candidate pool.
    pub attempted: usize,
    /// Nodes skipped because every candidate was filtered out during
    /// selection (reuse cap, batch chain prevention).
    pub skipped: usize,
    /// Lock edges removed afterwards by cycle repair.
    pub removed_by_cycle_repair: usize,
    /// Net lock edges in place after repair.
    pub locks_applied: usize,
    /// Nodes reported unreachable by the post-assignment validation.
    /// Always expected to be empty; non-empty values indicate a candidate
    /// safety filter defect and are logged as warnings.
    pub unreachable: Vec<SpellId>,
}
