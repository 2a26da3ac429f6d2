// src/pipeline/graph.rs

use std::collections::BTreeMap;

use crate::payload::{EdgeDesc, NodeDesc};

/// Node identifiers are opaque strings taken verbatim from the payload.
pub type NodeId = String;

/// In-memory pipeline graph for one job: stage labels plus adjacency.
///
/// Keyed by `BTreeMap` so every iteration runs in ascending node-id order;
/// the sequencer's determinism rests on that.
///
/// Edges referencing undeclared nodes are kept but stay inert on the target
/// side: in-degree counts one unit per declared edge whose target is a known
/// node, while an edge whose *source* is unknown pins its known target above
/// zero forever (the source can never be processed). Parallel edges each
/// count.
#[derive(Debug, Clone)]
pub struct PipelineGraph {
    /// Stage label per declared node.
    labels: BTreeMap<NodeId, String>,
    /// Outgoing edge targets per source, in declaration order.
    successors: BTreeMap<NodeId, Vec<NodeId>>,
    /// Incoming edge count per declared node.
    in_degree: BTreeMap<NodeId, usize>,
}

impl PipelineGraph {
    /// Build the graph from a parsed payload.
    ///
    /// Assumes node ids are unique (enforced by payload validation).
    pub fn from_payload(nodes: &[NodeDesc], edges: &[EdgeDesc]) -> Self {
        let mut labels = BTreeMap::new();
        let mut in_degree = BTreeMap::new();
        for node in nodes {
            labels.insert(node.id.clone(), node.data.label.clone());
            in_degree.insert(node.id.clone(), 0);
        }

        let mut successors: BTreeMap<NodeId, Vec<NodeId>> = BTreeMap::new();
        for edge in edges {
            successors
                .entry(edge.source.clone())
                .or_default()
                .push(edge.target.clone());
            if let Some(degree) = in_degree.get_mut(&edge.target) {
                *degree += 1;
            }
        }

        Self {
            labels,
            successors,
            in_degree,
        }
    }

    /// Number of declared nodes.
    pub fn node_count(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    /// Declared node ids in ascending order.
    pub fn node_ids(&self) -> impl Iterator<Item = &str> {
        self.labels.keys().map(|s| s.as_str())
    }

    /// Stage label of a declared node.
    pub fn label_of(&self, id: &str) -> Option<&str> {
        self.labels.get(id).map(|s| s.as_str())
    }

    /// Edge targets declared with `id` as source, in declaration order.
    /// May contain undeclared ids.
    pub fn successors_of(&self, id: &str) -> &[NodeId] {
        self.successors
            .get(id)
            .map(|targets| targets.as_slice())
            .unwrap_or(&[])
    }

    /// Incoming edge count of a declared node (0 for unknown ids).
    pub fn in_degree_of(&self, id: &str) -> usize {
        self.in_degree.get(id).copied().unwrap_or(0)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.labels.contains_key(id)
    }

    /// `(id, in_degree)` pairs in ascending id order.
    pub fn in_degrees(&self) -> impl Iterator<Item = (&str, usize)> {
        self.in_degree
            .iter()
            .map(|(id, degree)| (id.as_str(), *degree))
    }
}
