//! Budget allocation, candidate pools, and lock assignment orchestration
//! for the Spellbind lock engine.
//!
//! This crate is the top of the stack: it decides which spells receive a
//! hidden lock prerequisite, what each may legally lock to, and which
//! candidate wins, then repairs anything the combined dependency graph
//! cannot tolerate. Graph storage and safety analysis live in
//! `spellbind-graph`; similarity scoring lives in `spellbind-scorer`.
//!
//! # Modules
//!
//! - [`budget`] -- Global/school/tier lock budget math and recipient
//!   sampling.
//! - [`pool`] -- Per-recipient legal candidate pools.
//! - [`assign`] -- Constrained weighted-random selection and commit.
//! - [`engine`] -- [`LockEngine`] batch orchestration and repair.

pub mod assign;
pub mod budget;
pub mod engine;
pub mod pool;

// Re-export primary types at crate root.
pub use assign::{CommitOutcome, MIN_WEIGHT, SELECTION_POOL, TARGET_REUSE_CAP, select_and_commit};
pub use budget::{select_recipients, total_lock_budget};
pub use engine::LockEngine;
pub use pool::{POOL_CAP, PoolCandidate, build_candidate_pool, layout_distance, position_index};
