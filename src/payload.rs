// src/payload.rs

//! Job payload schema and boundary validation.
//!
//! A training submission arrives as one JSON document:
//!
//! ```json
//! {
//!   "nodes": [{ "id": "1", "data": { "label": "Data Loading" } }],
//!   "edges": [{ "source": "1", "target": "2" }],
//!   "imageFolder": "/tmp/extracted/job-42"
//! }
//! ```
//!
//! Unknown fields are ignored so upstream tools can attach extra metadata
//! (positions, styling) without breaking the engine. Missing `nodes`, `edges`
//! or `imageFolder` default to empty, which downstream checks then reject
//! with their own specific errors.

use std::collections::BTreeSet;

use serde::Deserialize;

use crate::errors::{EngineError, Result};

/// One declared pipeline stage.
#[derive(Debug, Clone, Deserialize)]
pub struct NodeDesc {
    /// Opaque node identifier, unique within one payload.
    pub id: String,

    /// Nested payload data; graph editors keep the display label here.
    pub data: NodeData,
}

/// The `data` object carried by every node.
#[derive(Debug, Clone, Deserialize)]
pub struct NodeData {
    /// Human-readable stage label, e.g. `"Model Training"`.
    pub label: String,
}

/// Directed dependency: `target` runs after `source`.
#[derive(Debug, Clone, Deserialize)]
pub struct EdgeDesc {
    pub source: String,
    pub target: String,
}

/// Top-level training job submission.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobPayload {
    #[serde(default)]
    pub nodes: Vec<NodeDesc>,

    #[serde(default)]
    pub edges: Vec<EdgeDesc>,

    /// Directory holding one subdirectory per class, full of images.
    #[serde(default)]
    pub image_folder: String,
}

/// Single-image prediction request.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PredictRequest {
    /// Path of the image to classify.
    #[serde(default)]
    pub image_path: String,
}

/// Parse and validate a training submission.
pub fn parse_job(input: &str) -> Result<JobPayload> {
    let payload: JobPayload =
        serde_json::from_str(input).map_err(|err| EngineError::MalformedPayload(err.to_string()))?;
    validate_job(&payload)?;
    Ok(payload)
}

/// Parse a prediction request. The image path itself is checked later, where
/// a missing file gets its dedicated error.
pub fn parse_predict(input: &str) -> Result<PredictRequest> {
    serde_json::from_str(input).map_err(|err| EngineError::MalformedPayload(err.to_string()))
}

/// Structural checks that are cheaper to reject here than to let the graph
/// layer produce confusing orders from: empty and duplicate node ids.
fn validate_job(payload: &JobPayload) -> Result<()> {
    let mut seen = BTreeSet::new();
    for node in &payload.nodes {
        if node.id.is_empty() {
            return Err(EngineError::MalformedPayload(
                "node with empty id".to_string(),
            ));
        }
        if !seen.insert(node.id.as_str()) {
            return Err(EngineError::MalformedPayload(format!(
                "duplicate node id '{}'",
                node.id
            )));
        }
    }
    Ok(())
}
