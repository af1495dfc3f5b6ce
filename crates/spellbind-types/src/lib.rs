//! Shared type definitions for the Spellbind lock engine.
//!
//! This crate is the single source of truth for the types that cross the
//! engine's boundaries: the skill-tree node model, the lock-assignment
//! settings snapshot, and the scoring request/response payloads. Renderer-
//! facing types flow downstream to `TypeScript` via `ts-rs` for the canvas
//! UI.
//!
//! # Modules
//!
//! - [`ids`] -- Type-safe wrappers for spell and scorer-request identifiers
//! - [`enums`] -- Tier ladder with resolution fallbacks, settings enums
//! - [`node`] -- Spell nodes, layout positions, and lock edges
//! - [`settings`] -- The immutable per-run settings snapshot
//! - [`request`] -- Assignment batch, scoring payloads, and batch summary

pub mod enums;
pub mod ids;
pub mod node;
pub mod request;
pub mod settings;

// Re-export all public types at crate root for convenience.
pub use enums::{
    DEPTH_ADEPT_MAX, DEPTH_APPRENTICE_MAX, DEPTH_EXPERT_MAX, DEPTH_NOVICE_MAX, PoolSource,
    SchoolDistribution, Tier,
};
pub use ids::{RequestId, SpellId};
pub use node::{LockEdge, Position, SpellNode};
pub use request::{
    AssignmentRequest, AssignmentSummary, CandidateText, LockBinding, PoolScores, ScorePair,
    ScoredCandidate, SpellText,
};
pub use settings::LockSettings;
