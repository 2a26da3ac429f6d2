// src/engine/mod.rs

//! Training engine for traindag.
//!
//! This module ties together:
//! - the seeded train/holdout split
//! - the phase-by-phase training orchestrator
//! - the result records written to the wire

pub mod orchestrator;
pub mod result;
pub mod split;

pub use orchestrator::{Phase, TrainingOrchestrator};
pub use result::{ErrorReport, PredictReport, TrainReport, write_json_line};
pub use split::{DataSplit, holdout_split};
