// src/model/mod.rs

//! Trained-model primitives.
//!
//! Responsibilities:
//! - Map class labels to dense indices (`encoder.rs`).
//! - Fit and query the random-forest classifier (`forest.rs`).
//! - Persist and reload the artifact pair (`artifacts.rs`).

pub mod artifacts;
pub mod encoder;
pub mod forest;

pub use artifacts::{ArtifactStore, ENCODER_FILENAME, MODEL_FILENAME};
pub use encoder::LabelEncoder;
pub use forest::{ForestParams, RandomForest};
