// src/pipeline/stages.rs

//! Stage walk: the reachability gate in front of training.
//!
//! Training only makes sense when the pipeline actually sequences a training
//! stage. The walk follows the execution order, resolving every node to its
//! label, and stops at the first node carrying the target label. Stages
//! sequenced after that node belong to other components and are never
//! visited here.

use tracing::info;

use crate::pipeline::graph::PipelineGraph;
use crate::pipeline::sequencer::ExecutionOrder;

/// Outcome of walking the execution order towards the training stage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StageWalk {
    /// Labels of every visited stage, in visit order. When the target was
    /// found it is the final entry.
    pub visited: Vec<String>,
    /// Whether a node carrying the target label was reached.
    pub reached: bool,
}

/// Walk `order`, collecting stage labels until the first node labelled
/// `target_label`.
///
/// An id without a declared label (possible only if callers hand in an order
/// from a different graph) is logged as `"Unknown"` rather than dropped, so
/// the visited list always mirrors the walk one to one. When several nodes
/// carry the target label, only the first one in the order is visited.
pub fn walk_to_stage(
    graph: &PipelineGraph,
    order: &ExecutionOrder,
    target_label: &str,
) -> StageWalk {
    let mut visited = Vec::new();

    for id in order.ids() {
        let label = graph.label_of(id).unwrap_or("Unknown");
        info!(node = %id, stage = %label, "visiting pipeline stage");
        visited.push(label.to_string());

        if label == target_label {
            return StageWalk {
                visited,
                reached: true,
            };
        }
    }

    StageWalk {
        visited,
        reached: false,
    }
}
