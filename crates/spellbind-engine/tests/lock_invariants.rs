//! End-to-end invariants for the lock-assignment pipeline.
//!
//! These tests drive full batches through [`LockEngine`] over synthetic
//! trees and pin the engine-wide guarantees: the combined graph stays
//! acyclic, reachability is preserved, the target reuse cap holds, and
//! the budget scenarios land on their exact counts.

use rand::SeedableRng;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use spellbind_engine::{LockEngine, build_candidate_pool, position_index};
use spellbind_graph::{SkillGraph, detect_cycles, validate_reachability};
use spellbind_scorer::LocalScorer;
use spellbind_types::{LockEdge, LockSettings, PoolSource, SpellId, SpellNode};

fn make_node(id: &str, school: &str, name: &str, level: Option<&str>) -> SpellNode {
    SpellNode {
        id: SpellId::from(id),
        school: String::from(school),
        name: String::from(name),
        desc: String::new(),
        effects: Vec::new(),
        is_root: false,
        skill_level: level.map(String::from),
        tier_hint: None,
        position: None,
        prerequisites: Vec::new(),
        children: Vec::new(),
        locks: Vec::new(),
    }
}

fn link(parent: &mut SpellNode, child: &mut SpellNode) {
    parent.children.push(child.id.clone());
    child.prerequisites.push(parent.id.clone());
}

/// One school: a root fanning into `count` spells named after the theme.
fn school_nodes(school: &str, theme: &str, count: usize) -> Vec<SpellNode> {
    let mut root = make_node(
        &format!("{school}-root"),
        school,
        &format!("{theme} mastery root"),
        None,
    );
    root.is_root = true;
    let mut nodes = Vec::new();
    for i in 0..count {
        let mut node = make_node(
            &format!("{school}-{i}"),
            school,
            &format!("{theme} invocation {i} of {theme} power"),
            Some("novice"),
        );
        link(&mut root, &mut node);
        nodes.push(node);
    }
    nodes.push(root);
    nodes
}

fn make_three_school_graph() -> SkillGraph {
    let mut nodes = school_nodes("Destruction", "flame", 8);
    nodes.extend(school_nodes("Restoration", "healing", 6));
    nodes.extend(school_nodes("Alteration", "armor", 4));
    SkillGraph::from_nodes(nodes).expect("fixture graph must validate")
}

#[test]
fn no_cycle_invariant_across_sequential_batches() {
    let mut graph = make_three_school_graph();
    let settings = LockSettings {
        global_lock_percent: 60.0,
        pool_source: PoolSource::Any,
        allow_locked_lock: true,
        higher_tier: true,
        ..LockSettings::default()
    };
    let mut engine = LockEngine::new(&settings);
    let mut rng = StdRng::seed_from_u64(42);

    for batch in 0..3 {
        let summary = engine.assign_locks(&mut graph, &mut LocalScorer::new(), &mut rng);
        let report = detect_cycles(&graph);
        assert!(
            report.is_acyclic(),
            "batch {batch} left a cycle: {summary:?}"
        );
        assert_eq!(report.sorted, report.total);
    }
}

#[test]
fn reachability_invariant_preserved() {
    let mut graph = make_three_school_graph();
    assert!(validate_reachability(&graph).is_empty(), "fixture not clean");

    let settings = LockSettings {
        global_lock_percent: 80.0,
        ..LockSettings::default()
    };
    let mut engine = LockEngine::new(&settings);
    let mut rng = StdRng::seed_from_u64(43);
    let summary = engine.assign_locks(&mut graph, &mut LocalScorer::new(), &mut rng);

    assert!(summary.unreachable.is_empty());
    assert!(validate_reachability(&graph).is_empty());
}

#[test]
fn reuse_cap_holds_after_a_full_run() {
    let mut graph = make_three_school_graph();
    let settings = LockSettings {
        global_lock_percent: 100.0,
        pool_source: PoolSource::Any,
        allow_locked_lock: true,
        higher_tier: true,
        ..LockSettings::default()
    };
    let mut engine = LockEngine::new(&settings);
    let mut rng = StdRng::seed_from_u64(44);
    let _ = engine.assign_locks(&mut graph, &mut LocalScorer::new(), &mut rng);

    for id in graph.ids() {
        assert!(
            graph.locks_referencing(&id) <= 2,
            "{id} referenced by more than two locks"
        );
    }
}

#[test]
fn clear_locks_is_idempotent() {
    let mut graph = make_three_school_graph();
    let settings = LockSettings {
        global_lock_percent: 50.0,
        ..LockSettings::default()
    };
    let mut engine = LockEngine::new(&settings);
    let mut rng = StdRng::seed_from_u64(45);
    let summary = engine.assign_locks(&mut graph, &mut LocalScorer::new(), &mut rng);
    assert!(summary.locks_applied > 0);

    let first = graph.clear_locks();
    assert_eq!(first, summary.locks_applied);
    let second = graph.clear_locks();
    assert_eq!(second, 0);
    assert_eq!(graph.lock_count(), 0);
}

#[test]
fn scenario_tier_concentration_with_fallback() {
    // Destruction: 10 non-root spells, only 2 of them adept. 30% global
    // budget -> exactly 3 locks. The adept-only tier split covers 2; the
    // fallback top-up supplies the third from the rest of the school.
    let mut root = make_node("root", "Destruction", "Destruction root", None);
    root.is_root = true;
    let mut nodes = Vec::new();
    for i in 0..10 {
        let level = if i < 2 { "adept" } else { "novice" };
        let mut node = make_node(
            &format!("d{i}"),
            "Destruction",
            &format!("flame invocation {i} of burning"),
            Some(level),
        );
        link(&mut root, &mut node);
        nodes.push(node);
    }
    nodes.push(root);
    let mut graph = SkillGraph::from_nodes(nodes).expect("fixture graph must validate");

    let settings = LockSettings {
        global_lock_percent: 30.0,
        tier_percents: [0.0, 0.0, 100.0, 0.0, 0.0],
        ..LockSettings::default()
    };
    let mut engine = LockEngine::new(&settings);
    let mut rng = StdRng::seed_from_u64(46);
    let summary = engine.assign_locks(&mut graph, &mut LocalScorer::new(), &mut rng);

    assert_eq!(summary.attempted, 3);
    assert!(summary.locks_applied <= 3);
    assert_eq!(graph.lock_count(), summary.locks_applied);

    // Both adept spells were selected by the tier pass.
    let owners: Vec<SpellId> = graph
        .all_lock_edges()
        .into_iter()
        .map(|edge| edge.to)
        .collect();
    for adept in ["d0", "d1"] {
        assert!(
            owners.contains(&SpellId::from(adept)),
            "adept spell {adept} missing from recipients"
        );
    }
}

#[test]
fn scenario_descendant_lock_is_rejected() {
    // X -> Y -> Z: X may never lock to its descendant Z.
    let mut root = make_node("root", "Destruction", "root", None);
    root.is_root = true;
    let mut x = make_node("x", "Destruction", "x", None);
    let mut y = make_node("y", "Destruction", "y", None);
    let mut z = make_node("z", "Destruction", "z", None);
    link(&mut root, &mut x);
    link(&mut x, &mut y);
    link(&mut y, &mut z);
    let graph = SkillGraph::from_nodes(vec![root, x, y, z]).expect("fixture");

    let settings = LockSettings {
        pool_source: PoolSource::Any,
        higher_tier: true,
        ..LockSettings::default()
    };
    let mut rng = StdRng::seed_from_u64(47);
    let pool = build_candidate_pool(
        &graph,
        &SpellId::from("x"),
        &settings,
        &position_index(&graph),
        &mut rng,
    );
    assert!(pool.iter().all(|c| c.id != SpellId::from("z")));
    assert!(pool.iter().all(|c| c.id != SpellId::from("y")));
}

#[test]
fn scenario_sole_gateway_lock_is_rejected() {
    // R -> B -> A: A is only reachable through B, so B may not lock to A.
    let mut r = make_node("r", "Destruction", "root", None);
    r.is_root = true;
    let mut b = make_node("b", "Destruction", "b", None);
    let mut a = make_node("a", "Destruction", "a", None);
    link(&mut r, &mut b);
    link(&mut b, &mut a);
    let graph = SkillGraph::from_nodes(vec![r, b, a]).expect("fixture");

    let settings = LockSettings {
        pool_source: PoolSource::Any,
        higher_tier: true,
        ..LockSettings::default()
    };
    let mut rng = StdRng::seed_from_u64(48);
    let pool = build_candidate_pool(
        &graph,
        &SpellId::from("b"),
        &settings,
        &position_index(&graph),
        &mut rng,
    );
    assert!(pool.iter().all(|c| c.id != SpellId::from("a")));
}

#[test]
fn scenario_cross_batch_cycle_is_detected_and_broken() {
    // Two separate batches left mutual locks: A locks to B, B locks to A.
    let mut graph = make_three_school_graph();
    let a = SpellId::from("Destruction-0");
    let b = SpellId::from("Destruction-1");
    let _ = graph.add_lock(&a, LockEdge::new(b.clone(), 0.6));
    let _ = graph.add_lock(&b, LockEdge::new(a.clone(), 0.5));

    let before = detect_cycles(&graph);
    assert!(!before.is_acyclic());
    assert_eq!(before.offending_locks.len(), 2);

    let removed = graph.remove_lock_edges(&before.offending_locks);
    assert!(removed >= 1);

    let after = detect_cycles(&graph);
    assert!(after.is_acyclic());
    assert_eq!(after.sorted, after.total);
}

#[test]
fn shuffle_uniformity_over_small_array() {
    // The sampling primitive behind pool capping and recipient ordering
    // must be an unbiased shuffle: over 100k runs of a 4-element array,
    // each of the 24 permutations lands near 1/24.
    let mut rng = StdRng::seed_from_u64(49);
    let mut counts: std::collections::BTreeMap<[u8; 4], u32> = std::collections::BTreeMap::new();

    for _ in 0..100_000 {
        let mut items = [0_u8, 1, 2, 3];
        items.shuffle(&mut rng);
        *counts.entry(items).or_insert(0) += 1;
    }

    assert_eq!(counts.len(), 24, "not every permutation occurred");
    for (permutation, count) in counts {
        // Expected ~4167 each; allow a generous statistical band.
        assert!(
            (3700..=4650).contains(&count),
            "permutation {permutation:?} occurred {count} times"
        );
    }
}

#[test]
fn summary_counts_reconcile() {
    let mut graph = make_three_school_graph();
    let settings = LockSettings {
        global_lock_percent: 70.0,
        ..LockSettings::default()
    };
    let mut engine = LockEngine::new(&settings);
    let mut rng = StdRng::seed_from_u64(50);
    let summary = engine.assign_locks(&mut graph, &mut LocalScorer::new(), &mut rng);

    assert_eq!(
        summary.locks_applied,
        summary
            .attempted
            .saturating_sub(summary.skipped)
            .saturating_sub(summary.removed_by_cycle_repair)
    );
    assert_eq!(graph.lock_count(), summary.locks_applied);
}

#[test]
fn reveal_flows_through_after_assignment() {
    let mut graph = make_three_school_graph();
    let settings = LockSettings {
        global_lock_percent: 50.0,
        ..LockSettings::default()
    };
    let mut engine = LockEngine::new(&settings);
    let mut rng = StdRng::seed_from_u64(51);
    let summary = engine.assign_locks(&mut graph, &mut LocalScorer::new(), &mut rng);
    assert!(summary.locks_applied > 0);

    // Nothing is revealed until interaction.
    assert!(graph.revealed_lock_edges().is_empty());

    let Some(edge) = graph.all_lock_edges().into_iter().next() else {
        return;
    };
    let revealed = graph.reveal_locks_for(&edge.to);
    assert!(revealed >= 1);
    assert!(!graph.revealed_lock_edges().is_empty());
}
