//! The skill graph: spell nodes with tree edges and lock edges.
//!
//! [`SkillGraph`] stores every [`SpellNode`] in a `BTreeMap` keyed by
//! [`SpellId`] and is the single owner of lock-edge mutation. Tree edges
//! (`prerequisites`/`children`) are validated once at construction and
//! treated as read-only afterwards; the external generator guarantees they
//! form a DAG rooted at each school's root.

use std::collections::{BTreeMap, BTreeSet};

use spellbind_types::{LockBinding, LockEdge, SpellId, SpellNode};

use crate::error::GraphError;

/// The skill tree with both edge families.
///
/// Lock edges live on their owning nodes (`SpellNode::locks`); this type
/// provides the graph-wide views and bulk operations over them.
#[derive(Debug, Clone, Default, serde::Serialize, serde::Deserialize)]
pub struct SkillGraph {
    /// All nodes indexed by their identifier.
    nodes: BTreeMap<SpellId, SpellNode>,
}

impl SkillGraph {
    /// Create an empty graph.
    pub const fn new() -> Self {
        Self {
            nodes: BTreeMap::new(),
        }
    }

    /// Build a graph from generator output, validating its edges.
    ///
    /// # Errors
    ///
    /// Returns [`GraphError::DuplicateNode`] on repeated IDs,
    /// [`GraphError::UnknownEdgeTarget`] when any prerequisite, child, or
    /// lock target references a missing node, and
    /// [`GraphError::InconsistentTreeEdge`] when the prerequisite and
    /// children lists disagree.
    pub fn from_nodes(nodes: Vec<SpellNode>) -> Result<Self, GraphError> {
        let mut graph = Self::new();
        for node in nodes {
            graph.insert(node)?;
        }
        graph.validate_edges()?;
        Ok(graph)
    }

    /// Insert a single node.
    ///
    /// # Errors
    ///
    /// Returns [`GraphError::DuplicateNode`] if the ID already exists.
    pub fn insert(&mut self, node: SpellNode) -> Result<(), GraphError> {
        if self.nodes.contains_key(&node.id) {
            return Err(GraphError::DuplicateNode(node.id));
        }
        self.nodes.insert(node.id.clone(), node);
        Ok(())
    }

    fn validate_edges(&self) -> Result<(), GraphError> {
        for node in self.nodes.values() {
            for parent_id in &node.prerequisites {
                let parent = self.nodes.get(parent_id).ok_or_else(|| {
                    GraphError::UnknownEdgeTarget {
                        node: node.id.clone(),
                        target: parent_id.clone(),
                    }
                })?;
                if !parent.children.contains(&node.id) {
                    return Err(GraphError::InconsistentTreeEdge {
                        parent: parent_id.clone(),
                        child: node.id.clone(),
                    });
                }
            }
            for child_id in &node.children {
                let child = self.nodes.get(child_id).ok_or_else(|| {
                    GraphError::UnknownEdgeTarget {
                        node: node.id.clone(),
                        target: child_id.clone(),
                    }
                })?;
                if !child.prerequisites.contains(&node.id) {
                    return Err(GraphError::InconsistentTreeEdge {
                        parent: node.id.clone(),
                        child: child_id.clone(),
                    });
                }
            }
            for lock in &node.locks {
                if !self.nodes.contains_key(&lock.target_id) {
                    return Err(GraphError::UnknownEdgeTarget {
                        node: node.id.clone(),
                        target: lock.target_id.clone(),
                    });
                }
            }
        }
        Ok(())
    }

    // -------------------------------------------------------------------
    // Node queries
    // -------------------------------------------------------------------

    /// Get an immutable reference to a node.
    pub fn get(&self, id: &SpellId) -> Option<&SpellNode> {
        self.nodes.get(id)
    }

    /// Get a mutable reference to a node.
    pub fn get_mut(&mut self, id: &SpellId) -> Option<&mut SpellNode> {
        self.nodes.get_mut(id)
    }

    /// Return the number of nodes in the graph.
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Whether the graph holds no nodes.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Return all node IDs.
    pub fn ids(&self) -> Vec<SpellId> {
        self.nodes.keys().cloned().collect()
    }

    /// Iterate over all nodes immutably.
    pub fn nodes(&self) -> impl Iterator<Item = &SpellNode> {
        self.nodes.values()
    }

    /// Return all root nodes.
    pub fn roots(&self) -> impl Iterator<Item = &SpellNode> {
        self.nodes.values().filter(|n| n.is_root)
    }

    /// Return the distinct school names present in the graph.
    pub fn schools(&self) -> BTreeSet<String> {
        self.nodes.values().map(|n| n.school.clone()).collect()
    }

    /// Return all nodes belonging to a school.
    pub fn school_members(&self, school: &str) -> Vec<&SpellNode> {
        self.nodes.values().filter(|n| n.school == school).collect()
    }

    /// Return the root IDs of a school.
    pub fn school_roots(&self, school: &str) -> Vec<SpellId> {
        self.nodes
            .values()
            .filter(|n| n.is_root && n.school == school)
            .map(|n| n.id.clone())
            .collect()
    }

    /// Number of non-root nodes: the population eligible for locks.
    pub fn non_root_count(&self) -> usize {
        self.nodes.values().filter(|n| !n.is_root).count()
    }

    // -------------------------------------------------------------------
    // Lock mutation
    // -------------------------------------------------------------------

    /// Attach a lock edge to `owner`.
    ///
    /// Returns `Ok(false)` when the owner already carries a lock on the
    /// same target (the edge is not duplicated).
    ///
    /// # Errors
    ///
    /// Returns [`GraphError::NodeNotFound`] if either endpoint is missing.
    pub fn add_lock(&mut self, owner: &SpellId, edge: LockEdge) -> Result<bool, GraphError> {
        if !self.nodes.contains_key(&edge.target_id) {
            return Err(GraphError::NodeNotFound(edge.target_id));
        }
        let node = self
            .nodes
            .get_mut(owner)
            .ok_or_else(|| GraphError::NodeNotFound(owner.clone()))?;
        Ok(node.add_lock(edge))
    }

    /// Delete the named lock edges from their owning nodes.
    ///
    /// Idempotent: edges already absent are silently skipped. Returns the
    /// count actually removed.
    pub fn remove_lock_edges(&mut self, edges: &[LockBinding]) -> usize {
        let mut removed = 0_usize;
        for edge in edges {
            if let Some(node) = self.nodes.get_mut(&edge.to)
                && node.remove_lock(&edge.from)
            {
                removed = removed.saturating_add(1);
            }
        }
        removed
    }

    /// Remove every lock edge in the graph.
    ///
    /// Idempotent: a second call returns 0 and changes nothing. Returns the
    /// count removed.
    pub fn clear_locks(&mut self) -> usize {
        let mut removed = 0_usize;
        for node in self.nodes.values_mut() {
            removed = removed.saturating_add(node.locks.len());
            node.locks.clear();
        }
        removed
    }

    /// Total number of lock edges in the graph.
    pub fn lock_count(&self) -> usize {
        self.nodes.values().map(|n| n.locks.len()).sum()
    }

    /// Number of lock edges anywhere in the graph pointing at `target`.
    pub fn locks_referencing(&self, target: &SpellId) -> usize {
        self.nodes
            .values()
            .filter(|n| n.has_lock_on(target))
            .count()
    }

    // -------------------------------------------------------------------
    // Reveal / renderer queries
    // -------------------------------------------------------------------

    /// Reveal every lock owned by `id` and every lock elsewhere in the
    /// graph that targets `id`.
    ///
    /// A node's own locks and "what this node unlocks for others" surface
    /// together, so interacting with either endpoint uncovers the edge.
    /// Returns the number of edges newly revealed.
    pub fn reveal_locks_for(&mut self, id: &SpellId) -> usize {
        let mut revealed = 0_usize;
        for node in self.nodes.values_mut() {
            for lock in &mut node.locks {
                if (node.id == *id || lock.target_id == *id) && !lock.revealed {
                    lock.revealed = true;
                    revealed = revealed.saturating_add(1);
                }
            }
        }
        revealed
    }

    /// Flatten every lock edge into renderer bindings.
    pub fn all_lock_edges(&self) -> Vec<LockBinding> {
        self.collect_lock_edges(|_| true)
    }

    /// Flatten only the revealed lock edges into renderer bindings.
    pub fn revealed_lock_edges(&self) -> Vec<LockBinding> {
        self.collect_lock_edges(|lock| lock.revealed)
    }

    fn collect_lock_edges<F>(&self, mut keep: F) -> Vec<LockBinding>
    where
        F: FnMut(&LockEdge) -> bool,
    {
        let mut edges = Vec::new();
        for node in self.nodes.values() {
            for lock in &node.locks {
                if keep(lock) {
                    edges.push(LockBinding {
                        from: lock.target_id.clone(),
                        to: node.id.clone(),
                        score: lock.score,
                    });
                }
            }
        }
        edges
    }
}
