//! The lock-assignment orchestrator.
//!
//! One [`LockEngine`] owns a sanitized settings snapshot and the per-batch
//! caches that older revisions kept as process globals. A batch runs in
//! three phases: *prepare* (budget allocation and candidate pools),
//! *score* (any [`ScoreSource`] backend), and *commit* (constrained
//! selection, then cycle repair and reachability validation). The phases
//! are public so a host driving the asynchronous external scorer can run
//! prepare, dispatch the request, and commit whenever the response
//! resolves; [`LockEngine::assign_locks`] composes them for the
//! synchronous path.
//!
//! Per the error-handling contract, none of these operations fail: an
//! empty graph or a zero budget produces an empty summary, and a scorer
//! backend error degrades to local scoring with a warning.

use std::collections::BTreeMap;

use rand::Rng;
use spellbind_graph::{SkillGraph, detect_cycles, validate_reachability};
use spellbind_scorer::{LocalScorer, ScoreSource};
use spellbind_types::{
    AssignmentRequest, AssignmentSummary, CandidateText, LockSettings, PoolScores, Position,
    ScorePair, SpellId, SpellText,
};
use tracing::{debug, info, warn};

use crate::assign::select_and_commit;
use crate::budget::select_recipients;
use crate::pool::{build_candidate_pool, position_index};

/// Orchestrates lock assignment over a skill graph.
#[derive(Debug, Clone, Default)]
pub struct LockEngine {
    /// The sanitized settings snapshot for the current batch.
    settings: LockSettings,
    /// Layout positions cached at batch start; rebuilt by
    /// [`LockEngine::prepare_request`] and dropped on settings changes.
    positions: BTreeMap<SpellId, Position>,
}

impl LockEngine {
    /// Create an engine over a settings snapshot.
    ///
    /// The snapshot is sanitized up front: percents clamp to `[0, 100]`,
    /// proximity bias to `[0, 1]`.
    pub fn new(settings: &LockSettings) -> Self {
        Self {
            settings: settings.sanitized(),
            positions: BTreeMap::new(),
        }
    }

    /// The active settings snapshot.
    pub const fn settings(&self) -> &LockSettings {
        &self.settings
    }

    /// Replace the settings snapshot, invalidating per-batch caches.
    pub fn update_settings(&mut self, settings: &LockSettings) {
        self.settings = settings.sanitized();
        self.positions.clear();
    }

    /// Phase 1: pick recipients and build their candidate pools.
    ///
    /// Recipients whose pool comes out empty are dropped here (they get no
    /// lock); the returned request carries one pair per survivor. An empty
    /// graph or zero budget yields an empty request.
    pub fn prepare_request(
        &mut self,
        graph: &SkillGraph,
        rng: &mut impl Rng,
    ) -> AssignmentRequest {
        self.refresh_positions(graph);

        let recipients = select_recipients(graph, &self.settings, rng);
        let mut pairs = Vec::with_capacity(recipients.len());

        for spell_id in recipients {
            let pool =
                build_candidate_pool(graph, &spell_id, &self.settings, &self.positions, rng);
            if pool.is_empty() {
                debug!(spell = %spell_id, "empty candidate pool; recipient dropped");
                continue;
            }
            let Some(node) = graph.get(&spell_id) else {
                continue;
            };
            let candidates = pool
                .into_iter()
                .filter_map(|candidate| {
                    let target = graph.get(&candidate.id)?;
                    Some(CandidateText {
                        node_id: candidate.id,
                        name: target.name.clone(),
                        desc: target.desc.clone(),
                        effects: target.effects.clone(),
                        distance: candidate.distance.unwrap_or(self.settings.distance),
                    })
                })
                .collect();
            pairs.push(ScorePair {
                spell_id: spell_id.clone(),
                spell: SpellText {
                    name: node.name.clone(),
                    desc: node.desc.clone(),
                    effects: node.effects.clone(),
                },
                candidates,
            });
        }

        info!(pairs = pairs.len(), "assignment request prepared");
        AssignmentRequest {
            pairs,
            settings: self.settings.clone(),
        }
    }

    /// Phases 2 + 3 for the synchronous path: score with the given
    /// backend (falling back to the local scorer on backend failure),
    /// commit, and repair.
    pub fn assign_locks(
        &mut self,
        graph: &mut SkillGraph,
        scorer: &mut dyn ScoreSource,
        rng: &mut impl Rng,
    ) -> AssignmentSummary {
        let request = self.prepare_request(graph, rng);
        if request.is_empty() {
            return AssignmentSummary::default();
        }

        let scores = match scorer.score_batch(&request) {
            Ok(scores) => scores,
            Err(e) => {
                warn!(error = %e, "score backend failed; falling back to local scorer");
                LocalScorer::new()
                    .score_batch(&request)
                    .unwrap_or_default()
            }
        };

        self.commit_scores(graph, &request, &scores, rng)
    }

    /// Phase 3: select and commit lock edges, then repair.
    ///
    /// Always runs the post-assignment safety net: cycle detection with
    /// offending-lock removal, and a reachability validation whose
    /// findings are logged but never auto-fixed. The summary's counts
    /// reconcile as `locks_applied = attempted - skipped - removed`,
    /// floored at zero.
    pub fn commit_scores(
        &mut self,
        graph: &mut SkillGraph,
        request: &AssignmentRequest,
        scores: &[PoolScores],
        rng: &mut impl Rng,
    ) -> AssignmentSummary {
        let outcome = select_and_commit(graph, request, scores, rng);
        let removed = repair_cycles(graph);
        let unreachable = report_unreachable(graph);

        let summary = AssignmentSummary {
            attempted: outcome.attempted,
            skipped: outcome.skipped,
            removed_by_cycle_repair: removed,
            locks_applied: outcome.applied.saturating_sub(removed),
            unreachable,
        };
        info!(
            attempted = summary.attempted,
            applied = summary.locks_applied,
            skipped = summary.skipped,
            removed = summary.removed_by_cycle_repair,
            "assignment batch committed"
        );
        summary
    }

    fn refresh_positions(&mut self, graph: &SkillGraph) {
        self.positions = position_index(graph);
    }
}

/// Remove lock edges until the combined graph is acyclic.
///
/// Each pass deletes every offending lock edge, which strictly shrinks the
/// edge set, so the loop always terminates; tree edges alone are a DAG, so
/// one pass is normally enough. Returns the number of edges removed.
fn repair_cycles(graph: &mut SkillGraph) -> usize {
    let mut removed = 0_usize;
    loop {
        let report = detect_cycles(graph);
        if report.is_acyclic() || report.offending_locks.is_empty() {
            break;
        }
        warn!(
            nodes_in_cycle = report.nodes_in_cycle.len(),
            offending = report.offending_locks.len(),
            "lock cycle detected; removing offending lock edges"
        );
        let count = graph.remove_lock_edges(&report.offending_locks);
        if count == 0 {
            break;
        }
        removed = removed.saturating_add(count);
    }
    removed
}

/// Log and flatten any unreachable nodes found after assignment.
///
/// A non-empty result means a candidate safety filter let something
/// through; the tree itself is never mutated here.
fn report_unreachable(graph: &SkillGraph) -> Vec<SpellId> {
    let mut unreachable = Vec::new();
    for (school, nodes) in validate_reachability(graph) {
        warn!(
            school = school.as_str(),
            count = nodes.len(),
            "unreachable nodes after assignment; investigate candidate filters"
        );
        unreachable.extend(nodes);
    }
    unreachable
}
