// src/config/mod.rs

//! Configuration loading and validation for traindag.
//!
//! Responsibilities:
//! - Define the TOML-backed data model (`model.rs`).
//! - Load a config file from disk (`loader.rs`).
//! - Validate basic invariants like fraction bounds (`validate.rs`).

pub mod loader;
pub mod model;
pub mod validate;

pub use loader::{default_config_path, load_and_validate, load_from_path, load_or_default};
pub use model::{ArtifactsSection, EngineConfig, FeaturesSection, TrainingSection};
pub use validate::validate_config;
