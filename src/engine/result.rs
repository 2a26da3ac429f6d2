// src/engine/result.rs

//! Wire records for the result channel.
//!
//! Every invocation writes exactly one JSON line to stdout: a success record
//! or an error record. Diagnostics never land here (they go to stderr via
//! `tracing`), so callers can parse stdout without filtering.

use std::io::Write;

use anyhow::{Context, Result};
use serde::Serialize;

/// Success record for a completed training run.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TrainReport {
    pub message: String,
    /// Classifier family identifier for upstream display.
    pub model: String,
    /// Holdout accuracy in [0, 1].
    pub accuracy: f64,
    /// Labels of the pipeline stages visited, training stage last.
    pub stages_executed: Vec<String>,
    /// Server-relative path where the model artifact can be fetched.
    pub download_link: String,
}

/// Error record for a failed run, training or prediction alike.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ErrorReport {
    pub error: String,

    /// Diagnostic chain, attached for unexpected errors only.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub trace: Option<String>,

    /// Echo of the requested image path (missing-image prediction errors).
    #[serde(rename = "imagePath", skip_serializing_if = "Option::is_none")]
    pub image_path: Option<String>,
}

impl ErrorReport {
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            trace: None,
            image_path: None,
        }
    }

    pub fn with_trace(mut self, trace: Option<String>) -> Self {
        self.trace = trace;
        self
    }

    pub fn with_image_path(mut self, path: impl Into<String>) -> Self {
        self.image_path = Some(path.into());
        self
    }
}

/// Success record for a prediction.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PredictReport {
    /// Predicted class label, decoded back to its original string.
    pub prediction: String,
}

/// Serialize `record` as a single JSON line on the result channel.
pub fn write_json_line<W: Write, T: Serialize>(out: &mut W, record: &T) -> Result<()> {
    let line = serde_json::to_string(record).context("serializing result record")?;
    writeln!(out, "{line}").context("writing result record")?;
    out.flush().context("flushing result channel")?;
    Ok(())
}
