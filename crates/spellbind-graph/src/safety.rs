//! Graph-safety checks that keep lock assignment from corrupting the tree.
//!
//! A lock edge adds a dependency, so a badly chosen target can create an
//! unsatisfiable cycle or strand a node behind its own gate. These checks
//! run against candidates *before* assignment; [`crate::cycles`] provides
//! the after-the-fact net for anything that slips through across batches.
//!
//! All checks are O(V+E) breadth-first traversals over the shared
//! [`breadth_first`] helper.

use std::collections::{BTreeMap, BTreeSet};

use spellbind_types::SpellId;
use tracing::debug;

use crate::graph::SkillGraph;
use crate::traversal::{breadth_first, tree_children, tree_prerequisites};

/// Every node below `id` in the tree (excluding `id` itself).
///
/// A node must never lock to one of its own descendants: the descendant
/// already requires the node, so the lock would demand each before the
/// other.
pub fn descendants_of(graph: &SkillGraph, id: &SpellId) -> BTreeSet<SpellId> {
    let mut visited = breadth_first(graph, [id.clone()], None, tree_children);
    visited.remove(id);
    visited
}

/// Whether `candidate` is an ancestor of `spell` along tree prerequisites.
///
/// An ancestor target is safe but redundant -- the player necessarily
/// learns it on the way down -- so callers may deprioritize such
/// candidates but must never reject them.
pub fn is_ancestor_of(graph: &SkillGraph, spell: &SpellId, candidate: &SpellId) -> bool {
    if spell == candidate {
        return false;
    }
    breadth_first(graph, [spell.clone()], None, tree_prerequisites).contains(candidate)
}

/// Every node still reachable from the school roots when `excluded` is
/// removed from the tree entirely.
///
/// A candidate missing from this set is only reachable *through* the node
/// being locked: locking to it would require the very spell it gates to
/// already be learned, an impossible chicken-and-egg requirement.
pub fn reachable_without(graph: &SkillGraph, excluded: &SpellId) -> BTreeSet<SpellId> {
    let roots: Vec<SpellId> = graph.roots().map(|n| n.id.clone()).collect();
    breadth_first(graph, roots, Some(excluded), tree_children)
}

/// Check that every node is reachable from its school's root.
///
/// Returns the unreachable node IDs grouped per school; an empty map means
/// the tree is clean. Diagnostic only -- nothing is mutated, because an
/// unreachable node here points at a candidate-filter defect upstream, not
/// something to patch over by editing tree edges.
pub fn validate_reachability(graph: &SkillGraph) -> BTreeMap<String, Vec<SpellId>> {
    let mut report: BTreeMap<String, Vec<SpellId>> = BTreeMap::new();

    for school in graph.schools() {
        let roots = graph.school_roots(&school);
        if roots.is_empty() {
            debug!(school = school.as_str(), "school has no root; skipping reachability check");
            continue;
        }
        let visited = breadth_first(graph, roots, None, tree_children);
        let missing: Vec<SpellId> = graph
            .school_members(&school)
            .iter()
            .filter(|n| !visited.contains(&n.id))
            .map(|n| n.id.clone())
            .collect();
        if !missing.is_empty() {
            report.insert(school, missing);
        }
    }

    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::test_support::{link, make_graph, make_node};

    /// root -> x -> y -> z, a linear chain.
    fn make_chain() -> SkillGraph {
        let mut root = make_node("root", "Destruction");
        root.is_root = true;
        let mut x = make_node("x", "Destruction");
        let mut y = make_node("y", "Destruction");
        let mut z = make_node("z", "Destruction");
        link(&mut root, &mut x);
        link(&mut x, &mut y);
        link(&mut y, &mut z);
        make_graph(vec![root, x, y, z])
    }

    #[test]
    fn descendants_exclude_self_and_ancestors() {
        let graph = make_chain();
        let descendants = descendants_of(&graph, &SpellId::from("x"));
        assert!(descendants.contains(&SpellId::from("y")));
        assert!(descendants.contains(&SpellId::from("z")));
        assert!(!descendants.contains(&SpellId::from("x")));
        assert!(!descendants.contains(&SpellId::from("root")));
    }

    #[test]
    fn grandchild_is_a_descendant() {
        // X -> Y -> Z: locking X to Z must be rejected by the descendant
        // check, because Z already sits below X.
        let graph = make_chain();
        let descendants = descendants_of(&graph, &SpellId::from("x"));
        assert!(descendants.contains(&SpellId::from("z")));
    }

    #[test]
    fn ancestor_check_walks_prerequisites() {
        let graph = make_chain();
        assert!(is_ancestor_of(&graph, &SpellId::from("z"), &SpellId::from("root")));
        assert!(is_ancestor_of(&graph, &SpellId::from("z"), &SpellId::from("x")));
        assert!(!is_ancestor_of(&graph, &SpellId::from("x"), &SpellId::from("z")));
        assert!(!is_ancestor_of(&graph, &SpellId::from("x"), &SpellId::from("x")));
    }

    #[test]
    fn sole_gateway_node_strands_its_subtree() {
        // R -> b -> a: a's only path from the root runs through b, so
        // locking b to a must be rejected.
        let mut r = make_node("r", "Destruction");
        r.is_root = true;
        let mut b = make_node("b", "Destruction");
        let mut a = make_node("a", "Destruction");
        link(&mut r, &mut b);
        link(&mut b, &mut a);
        let graph = make_graph(vec![r, b, a]);

        let reachable = reachable_without(&graph, &SpellId::from("b"));
        assert!(reachable.contains(&SpellId::from("r")));
        assert!(!reachable.contains(&SpellId::from("a")));
    }

    #[test]
    fn alternate_path_keeps_candidate_reachable() {
        // R -> b -> a and R -> a: removing b leaves a reachable.
        let mut r = make_node("r", "Destruction");
        r.is_root = true;
        let mut b = make_node("b", "Destruction");
        let mut a = make_node("a", "Destruction");
        link(&mut r, &mut b);
        link(&mut b, &mut a);
        link(&mut r, &mut a);
        let graph = make_graph(vec![r, b, a]);

        let reachable = reachable_without(&graph, &SpellId::from("b"));
        assert!(reachable.contains(&SpellId::from("a")));
    }

    #[test]
    fn clean_tree_validates_clean() {
        let graph = make_chain();
        assert!(validate_reachability(&graph).is_empty());
    }

    #[test]
    fn orphaned_node_is_reported_per_school() {
        let mut root = make_node("root", "Destruction");
        root.is_root = true;
        let orphan = make_node("orphan", "Destruction");
        let graph = make_graph(vec![root, orphan]);

        let report = validate_reachability(&graph);
        assert_eq!(
            report.get("Destruction"),
            Some(&vec![SpellId::from("orphan")])
        );
    }

    #[test]
    fn empty_graph_is_clean() {
        let graph = SkillGraph::new();
        assert!(validate_reachability(&graph).is_empty());
        assert!(descendants_of(&graph, &SpellId::from("ghost")).is_empty());
    }
}
