// src/errors.rs

//! Crate-wide error types.
//!
//! Every failure a job can cause carries its own variant with a fixed,
//! user-facing message; those render on the result channel without a trace.
//! IO surprises and internal invariant breaks fall through to the catch-all
//! variants and get their diagnostic chain attached via
//! [`EngineError::trace`].

use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum EngineError {
    /// Submission did not deserialize or failed boundary validation.
    #[error("Invalid job payload: {0}")]
    MalformedPayload(String),

    /// The `imageFolder` path is empty or absent from disk.
    #[error("Extracted image folder not found.")]
    ImageFolderMissing,

    /// Dataset discovery produced no (path, label) samples at all.
    #[error("No valid images found.")]
    EmptyDataset,

    /// The execution order never visited a node carrying the training label.
    #[error("{label} node not connected in the pipeline.")]
    TrainingStageUnreachable { label: String },

    /// Every sample failed extraction; there is nothing to train on.
    #[error("Feature extraction failed or no images were processed.")]
    NoFeaturesExtracted,

    /// Too few usable samples to form non-empty train and holdout partitions.
    #[error("Not enough images to split into training and holdout sets.")]
    NotEnoughSamples { total: usize },

    /// Prediction request without a usable image path.
    #[error("Image path is missing or file does not exist.")]
    PredictionImageMissing,

    /// The prediction image could not be turned into a feature vector.
    #[error("Image preprocessing failed: {0}")]
    Preprocessing(String),

    /// Model artifact absent from the artifact directory.
    #[error("Trained model file ({}) not found.", .0.display())]
    ModelArtifactMissing(PathBuf),

    /// Label-encoder artifact absent from the artifact directory.
    #[error("Label encoder file ({}) not found.", .0.display())]
    EncoderArtifactMissing(PathBuf),

    /// Persisted artifacts disagree with each other or with the extractor.
    #[error("Artifact mismatch: {0}")]
    ArtifactMismatch(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl EngineError {
    /// Diagnostic trace for the result channel.
    ///
    /// Only the catch-all variants carry one; job-caused errors are fully
    /// described by their message.
    pub fn trace(&self) -> Option<String> {
        match self {
            EngineError::Io(err) => Some(format!("{err:?}")),
            EngineError::Internal(err) => Some(format!("{err:?}")),
            _ => None,
        }
    }

    /// True for errors the submission caused, as opposed to IO surprises and
    /// internal invariant breaks.
    pub fn is_job_error(&self) -> bool {
        !matches!(self, EngineError::Io(_) | EngineError::Internal(_))
    }
}

pub type Result<T> = std::result::Result<T, EngineError>;
