//! Cycle detection over the combined dependency graph.
//!
//! The combined graph has an edge A -> B for every tree prerequisite and
//! every lock edge ("B depends on A"). Tree edges are externally guaranteed
//! acyclic, but lock edges committed in separate batches can close a loop
//! between them. Kahn's algorithm finds the loop; only lock edges are ever
//! reported for removal, never tree edges.

use std::collections::{BTreeMap, BTreeSet, VecDeque};

use spellbind_types::{LockBinding, SpellId};

use crate::graph::SkillGraph;

/// Result of a combined-graph cycle scan.
#[derive(Debug, Clone)]
pub struct CycleReport {
    /// Nodes processed by the topological sort.
    pub sorted: usize,
    /// Total nodes in the graph.
    pub total: usize,
    /// Nodes left with residual in-degree: every member sits on a cycle.
    pub nodes_in_cycle: BTreeSet<SpellId>,
    /// Lock edges with either endpoint inside a cycle. Removing them is
    /// guaranteed to restore acyclicity because the tree edges alone form
    /// a DAG.
    pub offending_locks: Vec<LockBinding>,
}

impl CycleReport {
    /// Whether the combined graph is free of cycles.
    pub fn is_acyclic(&self) -> bool {
        self.sorted == self.total
    }
}

/// Run Kahn's algorithm over tree edges plus lock edges.
///
/// Dequeues zero-in-degree nodes, decrementing their dependents; when the
/// queue drains early, every node with residual in-degree participates in
/// a cycle, and each lock edge touching that set is reported.
pub fn detect_cycles(graph: &SkillGraph) -> CycleReport {
    let total = graph.node_count();
    let mut in_degree: BTreeMap<SpellId, usize> = BTreeMap::new();
    let mut dependents: BTreeMap<SpellId, Vec<SpellId>> = BTreeMap::new();

    for node in graph.nodes() {
        in_degree.entry(node.id.clone()).or_insert(0);
        let mut upstream: Vec<&SpellId> = node.prerequisites.iter().collect();
        upstream.extend(node.locks.iter().map(|l| &l.target_id));
        for dep in upstream {
            if graph.get(dep).is_none() {
                continue;
            }
            let degree = in_degree.entry(node.id.clone()).or_insert(0);
            *degree = degree.saturating_add(1);
            dependents
                .entry(dep.clone())
                .or_default()
                .push(node.id.clone());
        }
    }

    let mut queue: VecDeque<SpellId> = in_degree
        .iter()
        .filter(|(_, degree)| **degree == 0)
        .map(|(id, _)| id.clone())
        .collect();

    let mut sorted = 0_usize;
    while let Some(current) = queue.pop_front() {
        sorted = sorted.saturating_add(1);
        let Some(next) = dependents.get(&current) else {
            continue;
        };
        for dependent in next.clone() {
            let Some(degree) = in_degree.get_mut(&dependent) else {
                continue;
            };
            *degree = degree.saturating_sub(1);
            if *degree == 0 {
                queue.push_back(dependent);
            }
        }
    }

    let nodes_in_cycle: BTreeSet<SpellId> = in_degree
        .into_iter()
        .filter(|(_, degree)| *degree > 0)
        .map(|(id, _)| id)
        .collect();

    let mut offending_locks = Vec::new();
    for node in graph.nodes() {
        for lock in &node.locks {
            if nodes_in_cycle.contains(&node.id) || nodes_in_cycle.contains(&lock.target_id) {
                offending_locks.push(LockBinding {
                    from: lock.target_id.clone(),
                    to: node.id.clone(),
                    score: lock.score,
                });
            }
        }
    }

    CycleReport {
        sorted,
        total,
        nodes_in_cycle,
        offending_locks,
    }
}
