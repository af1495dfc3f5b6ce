//! Candidate pool construction for lock recipients.
//!
//! A pool holds every node a recipient may legally lock to. The filters
//! come in two kinds: policy (school, distance, tier relations, existing
//! locks) and safety (no descendants, no sole-gateway targets). The safety
//! filters are what keep the combined graph solvable -- see
//! `spellbind_graph::safety` for why each exists.
//!
//! Layout distances are read from a position index built once per batch
//! ([`position_index`]), not from the nodes pair-by-pair; the engine owns
//! that index and rebuilds it whenever the settings snapshot changes.

use std::collections::BTreeMap;

use rand::Rng;
use rand::seq::SliceRandom;
use spellbind_graph::{SkillGraph, descendants_of, reachable_without};
use spellbind_types::{LockSettings, PoolSource, Position, SpellId, SpellNode};

/// Maximum number of candidates kept per pool.
pub const POOL_CAP: usize = 50;

/// One pool entry: a legal lock target and its layout distance, when both
/// endpoints carry positions.
#[derive(Debug, Clone, PartialEq)]
pub struct PoolCandidate {
    /// The candidate node.
    pub id: SpellId,
    /// Euclidean layout distance to the recipient, if computable.
    pub distance: Option<f64>,
}

/// Collect every positioned node into a lookup index for one batch.
pub fn position_index(graph: &SkillGraph) -> BTreeMap<SpellId, Position> {
    graph
        .nodes()
        .filter_map(|node| node.position.map(|p| (node.id.clone(), p)))
        .collect()
}

/// Layout distance between two nodes via the position index.
///
/// `None` when either node has no position, which excludes the pair from
/// distance-based filtering.
pub fn layout_distance(
    positions: &BTreeMap<SpellId, Position>,
    a: &SpellId,
    b: &SpellId,
) -> Option<f64> {
    match (positions.get(a), positions.get(b)) {
        (Some(pa), Some(pb)) => Some(pa.distance_to(pb)),
        _ => None,
    }
}

/// Build the legal candidate pool for `node_id`.
///
/// Returns an empty pool when the node is unknown -- recipients with empty
/// pools simply receive no lock. Pools larger than [`POOL_CAP`] keep the
/// nearest candidates in `nearby` mode and a uniform random sample
/// otherwise (Fisher-Yates shuffle, then truncate -- never a comparator
/// trick, which would sample non-uniformly).
pub fn build_candidate_pool(
    graph: &SkillGraph,
    node_id: &SpellId,
    settings: &LockSettings,
    positions: &BTreeMap<SpellId, Position>,
    rng: &mut impl Rng,
) -> Vec<PoolCandidate> {
    let Some(node) = graph.get(node_id) else {
        return Vec::new();
    };

    let descendants = descendants_of(graph, node_id);
    let reachable = reachable_without(graph, node_id);

    let mut pool: Vec<PoolCandidate> = Vec::new();
    for candidate in graph.nodes() {
        let distance = layout_distance(positions, node_id, &candidate.id);
        if !is_eligible(node, candidate, distance, settings, &descendants, &reachable) {
            continue;
        }
        pool.push(PoolCandidate {
            id: candidate.id.clone(),
            distance,
        });
    }

    cap_pool(pool, settings, rng)
}

/// Apply every eligibility rule for one (recipient, candidate) pair.
fn is_eligible(
    node: &SpellNode,
    candidate: &SpellNode,
    distance: Option<f64>,
    settings: &LockSettings,
    descendants: &std::collections::BTreeSet<SpellId>,
    reachable: &std::collections::BTreeSet<SpellId>,
) -> bool {
    if candidate.id == node.id || candidate.is_root {
        return false;
    }

    match settings.pool_source {
        PoolSource::SameSchool => {
            if candidate.school != node.school {
                return false;
            }
        }
        PoolSource::Nearby => {
            // A missing position on either side makes the distance
            // undefined, which excludes the pair.
            match distance {
                Some(d) if d <= settings.distance => {}
                _ => return false,
            }
        }
        PoolSource::Any => {}
    }

    let node_tier = node.tier().index();
    let candidate_tier = candidate.tier().index();
    let tier_allowed = if candidate_tier == node_tier {
        settings.same_tier
    } else if candidate_tier < node_tier {
        settings.prev_tier
    } else {
        settings.higher_tier
    };
    if !tier_allowed {
        return false;
    }

    if !settings.allow_locked_lock && !candidate.locks.is_empty() {
        return false;
    }

    if node.has_prerequisite(&candidate.id) || node.has_lock_on(&candidate.id) {
        return false;
    }

    // Safety: locking to a descendant creates an unsatisfiable cycle.
    if descendants.contains(&candidate.id) {
        return false;
    }

    // Safety: a candidate only reachable through this node would demand
    // the node be learned before its own prerequisite.
    if !reachable.contains(&candidate.id) {
        return false;
    }

    true
}

/// Enforce the pool cap.
fn cap_pool(
    mut pool: Vec<PoolCandidate>,
    settings: &LockSettings,
    rng: &mut impl Rng,
) -> Vec<PoolCandidate> {
    if pool.len() <= POOL_CAP {
        return pool;
    }
    if settings.pool_source == PoolSource::Nearby {
        // Keep the nearest candidates. Every entry has a distance here:
        // the eligibility filter already excluded position-less pairs.
        pool.sort_by(|a, b| {
            a.distance
                .unwrap_or(f64::INFINITY)
                .total_cmp(&b.distance.unwrap_or(f64::INFINITY))
        });
    } else {
        pool.shuffle(rng);
    }
    pool.truncate(POOL_CAP);
    pool
}
