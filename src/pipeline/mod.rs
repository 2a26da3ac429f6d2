// src/pipeline/mod.rs

//! Pipeline graph handling.
//!
//! Responsibilities:
//! - Turn payload nodes/edges into an adjacency model (`graph.rs`).
//! - Compute a deterministic execution order (`sequencer.rs`).
//! - Walk that order up to the training stage (`stages.rs`).

pub mod graph;
pub mod sequencer;
pub mod stages;

pub use graph::{NodeId, PipelineGraph};
pub use sequencer::{execution_order, ExecutionOrder};
pub use stages::{walk_to_stage, StageWalk};
