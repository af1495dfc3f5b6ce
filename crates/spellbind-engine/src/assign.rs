//! Constrained weighted-random lock selection and commit.
//!
//! Recipients are processed in random order so no school or tier is
//! systematically favored once the target reuse cap starts binding. Each
//! recipient draws from the top of its ranked candidate list via a
//! score-proportional roll; zero-scored candidates keep a small floor
//! weight so a pool of all-zero scores still assigns something.

use std::collections::{BTreeMap, BTreeSet};

use rand::Rng;
use rand::seq::SliceRandom;
use spellbind_graph::SkillGraph;
use spellbind_types::{AssignmentRequest, LockEdge, PoolScores, ScoredCandidate, SpellId};
use tracing::{debug, warn};

/// How many distinct nodes may lock to the same target in one batch.
pub const TARGET_REUSE_CAP: u32 = 2;

/// How many top-ranked candidates enter the weighted roll.
pub const SELECTION_POOL: usize = 5;

/// Weight floor for the roll, so zero-scored candidates retain a chance.
pub const MIN_WEIGHT: f64 = 0.01;

/// Decimal places kept on committed lock-edge scores.
const EDGE_SCORE_DECIMALS: f64 = 1_000.0;

/// Counts from one selection-and-commit pass, before cycle repair.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CommitOutcome {
    /// Recipients that entered selection.
    pub attempted: usize,
    /// Lock edges committed.
    pub applied: usize,
    /// Recipients skipped because every candidate was filtered away.
    pub skipped: usize,
}

/// Select one candidate per recipient and write the lock edges.
///
/// Applies the per-batch reuse cap and, when locked-lock chaining is
/// disallowed, excludes candidates that already received a lock earlier in
/// this same batch. Recipients whose candidates are all filtered out are
/// skipped and logged, never errored.
pub fn select_and_commit(
    graph: &mut SkillGraph,
    request: &AssignmentRequest,
    scores: &[PoolScores],
    rng: &mut impl Rng,
) -> CommitOutcome {
    let ranked_by_spell: BTreeMap<&SpellId, &PoolScores> =
        scores.iter().map(|s| (&s.spell_id, s)).collect();

    let mut order: Vec<&SpellId> = request.pairs.iter().map(|p| &p.spell_id).collect();
    order.shuffle(rng);

    let mut target_usage: BTreeMap<SpellId, u32> = BTreeMap::new();
    let mut locked_this_batch: BTreeSet<SpellId> = BTreeSet::new();
    let mut outcome = CommitOutcome {
        attempted: request.pairs.len(),
        ..CommitOutcome::default()
    };

    for spell_id in order {
        let Some(pool) = ranked_by_spell.get(spell_id) else {
            debug!(spell = %spell_id, "no scores for recipient; skipping");
            outcome.skipped = outcome.skipped.saturating_add(1);
            continue;
        };

        let eligible: Vec<&ScoredCandidate> = pool
            .ranked
            .iter()
            .filter(|c| {
                target_usage.get(&c.target_id).copied().unwrap_or(0) < TARGET_REUSE_CAP
            })
            .filter(|c| {
                request.settings.allow_locked_lock
                    || !locked_this_batch.contains(&c.target_id)
            })
            .collect();

        if eligible.is_empty() {
            debug!(spell = %spell_id, "candidate pool exhausted; no lock assigned");
            outcome.skipped = outcome.skipped.saturating_add(1);
            continue;
        }

        let top: Vec<&ScoredCandidate> = eligible.into_iter().take(SELECTION_POOL).collect();
        let Some(chosen) = weighted_pick(&top, rng) else {
            outcome.skipped = outcome.skipped.saturating_add(1);
            continue;
        };

        let edge = LockEdge::new(chosen.target_id.clone(), round_edge_score(chosen.score));
        match graph.add_lock(spell_id, edge) {
            Ok(true) => {
                outcome.applied = outcome.applied.saturating_add(1);
                let usage = target_usage.entry(chosen.target_id.clone()).or_insert(0);
                *usage = usage.saturating_add(1);
                locked_this_batch.insert(spell_id.clone());
            }
            Ok(false) => {
                debug!(spell = %spell_id, target = %chosen.target_id, "duplicate lock target; skipping");
                outcome.skipped = outcome.skipped.saturating_add(1);
            }
            Err(e) => {
                warn!(spell = %spell_id, error = %e, "failed to commit lock edge");
                outcome.skipped = outcome.skipped.saturating_add(1);
            }
        }
    }

    outcome
}

/// Score-proportional weighted random pick over a small candidate slate.
///
/// Each candidate weighs `max(score, MIN_WEIGHT)`; the roll is uniform in
/// `[0, total)` and the walk picks the first candidate whose cumulative
/// weight reaches it.
fn weighted_pick<'a>(
    candidates: &[&'a ScoredCandidate],
    rng: &mut impl Rng,
) -> Option<&'a ScoredCandidate> {
    if candidates.is_empty() {
        return None;
    }

    let total: f64 = candidates.iter().map(|c| c.score.max(MIN_WEIGHT)).sum();
    let roll: f64 = rng.random_range(0.0..total);

    let mut cumulative = 0.0_f64;
    for candidate in candidates {
        cumulative += candidate.score.max(MIN_WEIGHT);
        if cumulative >= roll {
            return Some(candidate);
        }
    }
    candidates.last().copied()
}

/// Round a committed edge score to 3 decimal places.
fn round_edge_score(score: f64) -> f64 {
    (score * EDGE_SCORE_DECIMALS).round() / EDGE_SCORE_DECIMALS
}
