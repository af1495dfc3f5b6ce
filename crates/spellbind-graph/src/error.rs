//! Error types for the `spellbind-graph` crate.
//!
//! All fallible operations in this crate return [`GraphError`] through the
//! standard [`Result`] type alias.

use spellbind_types::SpellId;

/// Errors that can occur during skill-graph construction and mutation.
#[derive(Debug, thiserror::Error)]
pub enum GraphError {
    /// A node was not found in the graph.
    #[error("spell not found: {0}")]
    NodeNotFound(SpellId),

    /// A duplicate node was inserted where uniqueness is required.
    #[error("duplicate spell id: {0}")]
    DuplicateNode(SpellId),

    /// A tree edge references a node absent from the graph.
    #[error("edge on {node} references unknown spell {target}")]
    UnknownEdgeTarget {
        /// The node carrying the dangling edge.
        node: SpellId,
        /// The missing endpoint.
        target: SpellId,
    },

    /// The generator supplied prerequisite/children lists that disagree.
    #[error("inconsistent tree edge: {child} lists {parent} as prerequisite but is not among its children")]
    InconsistentTreeEdge {
        /// The prerequisite end of the edge.
        parent: SpellId,
        /// The dependent end of the edge.
        child: SpellId,
    },
}
