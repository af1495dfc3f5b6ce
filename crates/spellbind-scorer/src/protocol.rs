//! Wire types for the external scorer protocol.
//!
//! The external scorer runs out-of-process and speaks a JSON line
//! protocol: each request is wrapped in a `{id, command, data}` envelope,
//! and each reply echoes the envelope `id` around a scoring result. The
//! inner request reuses [`ScorePair`] directly -- the internal batch type
//! and the wire type are deliberately the same shape, with camelCase
//! renames doing the translation.

use serde::{Deserialize, Serialize};
use spellbind_types::{AssignmentRequest, LockSettings, PoolSource, RequestId, ScorePair, SpellId};

/// The bridge command for candidate scoring.
pub const SCORE_COMMAND: &str = "prm_score";

// ---------------------------------------------------------------------------
// Request
// ---------------------------------------------------------------------------

/// The subset of settings the external scorer needs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoreSettings {
    /// Blend factor between similarity and proximity.
    pub proximity_bias: f64,
    /// Active pool source (the scorer only blends for `nearby`).
    pub pool_source: PoolSource,
    /// Maximum layout distance, the proximity normalization divisor.
    pub distance: f64,
}

impl From<&LockSettings> for ScoreSettings {
    fn from(settings: &LockSettings) -> Self {
        Self {
            proximity_bias: settings.proximity_bias,
            pool_source: settings.pool_source,
            distance: settings.distance,
        }
    }
}

/// The inner scoring request payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoreRequest {
    /// One entry per spell with its candidate pool.
    pub pairs: Vec<ScorePair>,
    /// The scoring-relevant settings subset.
    pub settings: ScoreSettings,
}

impl ScoreRequest {
    /// Build a wire request from an internal assignment batch.
    pub fn from_assignment(request: &AssignmentRequest) -> Self {
        Self {
            pairs: request.pairs.clone(),
            settings: ScoreSettings::from(&request.settings),
        }
    }
}

/// The request envelope sent over the bridge.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BridgeRequest {
    /// Correlation identifier echoed back by the reply.
    pub id: RequestId,
    /// Bridge command; always [`SCORE_COMMAND`] for this crate.
    pub command: String,
    /// The scoring payload.
    pub data: ScoreRequest,
}

impl BridgeRequest {
    /// Wrap an assignment batch in a fresh envelope.
    pub fn scoring(request: &AssignmentRequest) -> Self {
        Self {
            id: RequestId::new(),
            command: String::from(SCORE_COMMAND),
            data: ScoreRequest::from_assignment(request),
        }
    }
}

// ---------------------------------------------------------------------------
// Response
// ---------------------------------------------------------------------------

/// One scored candidate as reported by the external scorer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WireScore {
    /// The candidate's identifier.
    pub node_id: SpellId,
    /// The candidate's final (blended) score.
    pub score: f64,
}

/// The scoring result for one spell.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoreEntry {
    /// The spell the entry belongs to.
    pub spell_id: SpellId,
    /// Top candidates in descending score order.
    #[serde(default)]
    pub top_candidates: Vec<WireScore>,
    /// Best single match, kept for older scorer versions.
    #[serde(default)]
    pub best_match: Option<SpellId>,
    /// Best single score, kept for older scorer versions.
    #[serde(default)]
    pub score: Option<f64>,
}

/// The inner scoring response payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoreResponse {
    /// Whether the scorer completed successfully.
    pub success: bool,
    /// Error description when `success` is false.
    #[serde(default)]
    pub error: Option<String>,
    /// Per-spell score entries.
    #[serde(default)]
    pub scores: Vec<ScoreEntry>,
    /// Number of entries, as counted by the scorer.
    #[serde(default)]
    pub count: usize,
}

/// The reply envelope received over the bridge.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BridgeResponse {
    /// Correlation identifier copied from the request.
    pub id: RequestId,
    /// Whether the bridge itself succeeded.
    pub success: bool,
    /// The scoring payload when present.
    #[serde(default)]
    pub result: Option<ScoreResponse>,
    /// Bridge-level error description.
    #[serde(default)]
    pub error: Option<String>,
}
