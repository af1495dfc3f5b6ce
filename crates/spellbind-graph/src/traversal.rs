//! Generic breadth-first traversal over the skill graph.
//!
//! Every safety check in this crate is a BFS that differs only in where it
//! starts, which edge family it follows, and whether one node is excluded
//! from the walk entirely. This module provides that walk once, behind an
//! edge-selector closure, instead of four hand-rolled visited-map loops.

use std::collections::{BTreeSet, VecDeque};

use spellbind_types::{SpellId, SpellNode};

use crate::graph::SkillGraph;

/// Breadth-first walk from `starts`, following the edges produced by
/// `edges`, never entering `skip`.
///
/// Returns every visited node, including the start nodes themselves (when
/// they exist in the graph and are not skipped). The selector receives the
/// node being expanded and returns the neighbor IDs to enqueue; neighbors
/// absent from the graph are ignored.
pub fn breadth_first<I, F>(
    graph: &SkillGraph,
    starts: I,
    skip: Option<&SpellId>,
    mut edges: F,
) -> BTreeSet<SpellId>
where
    I: IntoIterator<Item = SpellId>,
    F: FnMut(&SpellNode) -> Vec<SpellId>,
{
    let mut visited: BTreeSet<SpellId> = BTreeSet::new();
    let mut queue: VecDeque<SpellId> = VecDeque::new();

    for start in starts {
        if Some(&start) == skip || graph.get(&start).is_none() {
            continue;
        }
        if visited.insert(start.clone()) {
            queue.push_back(start);
        }
    }

    while let Some(current) = queue.pop_front() {
        let Some(node) = graph.get(&current) else {
            continue;
        };
        for neighbor in edges(node) {
            if Some(&neighbor) == skip || graph.get(&neighbor).is_none() {
                continue;
            }
            if visited.insert(neighbor.clone()) {
                queue.push_back(neighbor);
            }
        }
    }

    visited
}

/// Edge selector: a node's tree children.
pub fn tree_children(node: &SpellNode) -> Vec<SpellId> {
    node.children.clone()
}

/// Edge selector: a node's tree prerequisites.
pub fn tree_prerequisites(node: &SpellNode) -> Vec<SpellId> {
    node.prerequisites.clone()
}

/// Edge selector: everything the node depends on -- tree prerequisites
/// plus lock targets. This is the upstream view of the combined graph.
pub fn combined_dependencies(node: &SpellNode) -> Vec<SpellId> {
    let mut deps = node.prerequisites.clone();
    deps.extend(node.locks.iter().map(|l| l.target_id.clone()));
    deps
}
