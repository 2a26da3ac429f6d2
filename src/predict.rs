// src/predict.rs

//! Single-image inference against persisted artifacts.
//!
//! Each prediction is a fresh load of the artifact pair; nothing is cached
//! between invocations. The artifact files are the only state shared with
//! training, and a training run may legitimately overwrite them between two
//! predictions.

use std::path::Path;

use tracing::info;

use crate::config::EngineConfig;
use crate::engine::result::PredictReport;
use crate::errors::{EngineError, Result};
use crate::features::FeatureExtractor;
use crate::model::ArtifactStore;
use crate::payload::PredictRequest;

/// Loads the trained artifacts and classifies one image per call.
pub struct InferenceRunner<'a> {
    cfg: &'a EngineConfig,
    extractor: &'a dyn FeatureExtractor,
}

impl<'a> InferenceRunner<'a> {
    pub fn new(cfg: &'a EngineConfig, extractor: &'a dyn FeatureExtractor) -> Self {
        Self { cfg, extractor }
    }

    /// Classify the image named by `request`.
    pub fn run(&self, request: &PredictRequest) -> Result<PredictReport> {
        let image_path = Path::new(&request.image_path);
        if request.image_path.is_empty() || !image_path.is_file() {
            return Err(EngineError::PredictionImageMissing);
        }
        info!(path = ?image_path, "prediction request");

        let store = ArtifactStore::new(&self.cfg.artifacts.dir);
        let model = store.load_model()?;
        info!(model = ?store.model_path(), trees = model.tree_count(), "model loaded");
        let encoder = store.load_encoder()?;
        info!(encoder = ?store.encoder_path(), classes = encoder.len(), "label encoder loaded");

        if model.n_classes() != encoder.len() {
            return Err(EngineError::ArtifactMismatch(format!(
                "model predicts {} classes but the encoder maps {}",
                model.n_classes(),
                encoder.len()
            )));
        }
        if model.feature_len() != self.extractor.feature_len() {
            return Err(EngineError::ArtifactMismatch(format!(
                "model expects {} features but the extractor produces {}",
                model.feature_len(),
                self.extractor.feature_len()
            )));
        }

        let features = self
            .extractor
            .extract(image_path)
            .map_err(|err| EngineError::Preprocessing(err.to_string()))?;

        let index = model.predict(&features);
        let prediction = encoder.inverse(index).ok_or_else(|| {
            anyhow::anyhow!(
                "predicted class index {index} outside the encoder's {} classes",
                encoder.len()
            )
        })?;
        info!(prediction = %prediction, "prediction completed");

        Ok(PredictReport {
            prediction: prediction.to_string(),
        })
    }
}
