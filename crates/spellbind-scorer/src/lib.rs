//! Text-similarity scoring for the Spellbind lock engine.
//!
//! Turns two spells' text (name, description, effect names) into a
//! similarity score in `[0, 1]`. The local TF-IDF/cosine implementation is
//! always available and defines the reference semantics; an external
//! scorer can be plugged in over the bridge protocol and must be a drop-in
//! replacement. Every failure mode of the external path degrades to the
//! local scorer, never to an error the caller sees.
//!
//! # Modules
//!
//! - [`error`] -- Error types for scoring and bridge dispatch.
//! - [`text`] -- Tokenization and scoring-blob assembly.
//! - [`tfidf`] -- Sparse TF-IDF vectors and cosine similarity.
//! - [`local`] -- The [`ScoreSource`] trait and local implementation.
//! - [`protocol`] -- Wire types for the external scorer protocol.
//! - [`remote`] -- Fire-and-forget dispatch with per-request channels.
//!
//! [`ScoreSource`]: local::ScoreSource

pub mod error;
pub mod local;
pub mod protocol;
pub mod remote;
pub mod text;
pub mod tfidf;

// Re-export primary types at crate root.
pub use error::ScorerError;
pub use local::{LocalScorer, ScoreSource, blend_proximity};
pub use protocol::{BridgeRequest, BridgeResponse, SCORE_COMMAND, ScoreRequest, ScoreResponse};
pub use remote::{PendingScores, RemoteScorer, ScoreJob, ScoreOutcome, normalize_response};
pub use tfidf::{SparseVector, compute_tfidf, cosine_similarity};
