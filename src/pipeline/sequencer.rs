// src/pipeline/sequencer.rs

//! Execution-order computation over the pipeline graph.
//!
//! This is Kahn's algorithm with one twist: instead of failing on a cycle,
//! the sequencer returns the partial order it managed to build and a flag
//! saying whether every node made it in. The stage walk downstream decides
//! what an incomplete order means for the job.

use std::collections::{BTreeMap, VecDeque};

use crate::pipeline::graph::{NodeId, PipelineGraph};

/// Linear execution order computed from a pipeline graph.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecutionOrder {
    ids: Vec<NodeId>,
    complete: bool,
}

impl ExecutionOrder {
    /// Ordered node ids. A prefix of the full node set when incomplete.
    pub fn ids(&self) -> &[NodeId] {
        &self.ids
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    /// `false` when a cycle, or an edge from an undeclared node, left part
    /// of the graph unordered.
    pub fn is_complete(&self) -> bool {
        self.complete
    }
}

/// Compute the execution order for `graph`.
///
/// The ready queue is seeded with every zero-in-degree node in ascending id
/// order and consumed first-in-first-out, so the result is identical across
/// runs and platforms for a fixed payload. Nodes trapped on a cycle (or
/// behind an edge whose source was never declared) never reach in-degree
/// zero and are simply absent from the result; callers check
/// [`ExecutionOrder::is_complete`] rather than handling an error.
pub fn execution_order(graph: &PipelineGraph) -> ExecutionOrder {
    let mut remaining: BTreeMap<&str, usize> = graph.in_degrees().collect();

    let mut queue: VecDeque<&str> = remaining
        .iter()
        .filter(|(_, degree)| **degree == 0)
        .map(|(id, _)| *id)
        .collect();

    let mut ids = Vec::with_capacity(graph.node_count());

    while let Some(current) = queue.pop_front() {
        ids.push(current.to_string());

        for target in graph.successors_of(current) {
            // Each successor entry corresponds to exactly one declared edge,
            // so this decrement never underflows.
            if let Some(degree) = remaining.get_mut(target.as_str()) {
                *degree -= 1;
                if *degree == 0 {
                    queue.push_back(target.as_str());
                }
            }
        }
    }

    let complete = ids.len() == graph.node_count();
    ExecutionOrder { ids, complete }
}
