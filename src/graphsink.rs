//! Graph writer boundary: the trait every pass emits nodes and edges
//! through, plus a default in-memory adapter.

use std::collections::HashMap;
use std::sync::Mutex;

/// A node's label (`Module`, `Class`, `Function`, `Method`) paired with its
/// property bag. `qualified_name` is always present and is the upsert key.
pub type NodeProperties = HashMap<String, String>;

/// One endpoint of a relationship: `(label, key_property, key_value)`.
pub type NodeRef = (&'static str, &'static str, String);

/// The in-process trait boundary every pass hands nodes/edges through.
/// Implementations upsert by `qualified_name` so repeated runs over an
/// unchanged repository are idempotent.
pub trait GraphSink: Send + Sync {
    /// Upserts a batch of nodes carrying the given `label`.
    fn ensure_node_batch(&self, label: &'static str, nodes: Vec<NodeProperties>);

    /// Upserts a batch of relationships of `rel_type` between the given
    /// endpoint pairs.
    fn ensure_relationship_batch(&self, rel_type: &'static str, edges: Vec<(NodeRef, NodeRef)>);
}

/// An edge recorded by [`InMemoryGraphSink`], flattened for inspection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedEdge {
    /// Relationship type (`DEFINES`, `IMPORTS`, `INHERITS`, `CALLS`).
    pub rel_type: &'static str,
    /// Qualified name of the source endpoint.
    pub from: String,
    /// Qualified name of the target endpoint.
    pub to: String,
}

/// Default in-memory [`GraphSink`]: accumulates nodes and edges for later
/// serialization or inspection, so the engine is runnable and testable
/// without an external graph database.
#[derive(Debug, Default)]
pub struct InMemoryGraphSink {
    nodes: Mutex<HashMap<(&'static str, String), NodeProperties>>,
    edges: Mutex<HashMap<(&'static str, String, String), RecordedEdge>>,
}

impl InMemoryGraphSink {
    /// Creates an empty sink.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Total number of distinct nodes recorded so far.
    #[must_use]
    pub fn node_count(&self) -> usize {
        self.nodes.lock().unwrap_or_else(std::sync::PoisonError::into_inner).len()
    }

    /// Total number of edges recorded so far, across all relationship types.
    #[must_use]
    pub fn edge_count(&self) -> usize {
        self.edges.lock().unwrap_or_else(std::sync::PoisonError::into_inner).len()
    }

    /// Returns a snapshot of every recorded edge of `rel_type`.
    #[must_use]
    pub fn edges_of_type(&self, rel_type: &str) -> Vec<RecordedEdge> {
        self.edges
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .values()
            .filter(|edge| edge.rel_type == rel_type)
            .cloned()
            .collect()
    }
}

impl GraphSink for InMemoryGraphSink {
    fn ensure_node_batch(&self, label: &'static str, nodes: Vec<NodeProperties>) {
        let mut table = self.nodes.lock().unwrap_or_else(std::sync::PoisonError::into_inner);
        for props in nodes {
            let Some(qn) = props.get("qualified_name").cloned() else {
                tracing::warn!(label, "skipping node with no qualified_name property");
                continue;
            };
            table.insert((label, qn), props);
        }
    }

    fn ensure_relationship_batch(&self, rel_type: &'static str, edges: Vec<(NodeRef, NodeRef)>) {
        let mut table = self.edges.lock().unwrap_or_else(std::sync::PoisonError::into_inner);
        for ((_, _, from), (_, _, to)) in edges {
            table.insert(
                (rel_type, from.clone(), to.clone()),
                RecordedEdge { rel_type, from, to },
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ensure_node_batch_upserts_by_qualified_name() {
        let sink = InMemoryGraphSink::new();
        let mut props = NodeProperties::new();
        props.insert("qualified_name".to_owned(), "project.a.f".to_owned());
        sink.ensure_node_batch("Function", vec![props.clone()]);
        sink.ensure_node_batch("Function", vec![props]);
        assert_eq!(sink.node_count(), 1);
    }

    #[test]
    fn ensure_relationship_batch_records_edges_by_type() {
        let sink = InMemoryGraphSink::new();
        sink.ensure_relationship_batch(
            "CALLS",
            vec![(
                ("Function", "qualified_name", "project.a.f".to_owned()),
                ("Function", "qualified_name", "project.b.g".to_owned()),
            )],
        );
        let edges = sink.edges_of_type("CALLS");
        assert_eq!(edges.len(), 1);
        assert_eq!(edges[0].from, "project.a.f");
        assert_eq!(edges[0].to, "project.b.g");
        assert_eq!(sink.edge_count(), 1);
    }

    #[test]
    fn ensure_relationship_batch_dedupes_repeated_edges() {
        let sink = InMemoryGraphSink::new();
        let edge = (
            ("Function", "qualified_name", "project.a.f".to_owned()),
            ("Function", "qualified_name", "project.b.g".to_owned()),
        );
        sink.ensure_relationship_batch("CALLS", vec![edge.clone()]);
        sink.ensure_relationship_batch("CALLS", vec![edge]);
        assert_eq!(sink.edge_count(), 1);
        assert_eq!(sink.edges_of_type("CALLS").len(), 1);
    }

    #[test]
    fn node_with_missing_key_is_skipped() {
        let sink = InMemoryGraphSink::new();
        sink.ensure_node_batch("Module", vec![NodeProperties::new()]);
        assert_eq!(sink.node_count(), 0);
    }
}
