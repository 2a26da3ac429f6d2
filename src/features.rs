// src/features.rs

//! Feature extraction: turning image files into fixed-length vectors.
//!
//! The [`FeatureExtractor`] trait is the seam between image handling and the
//! classifier; [`GrayscaleExtractor`] is the production implementation.
//! Extraction failures are per-sample by contract: the orchestrator logs
//! them, drops the sample and carries on with the rest of the batch.

use std::path::Path;

use image::imageops::FilterType;
use thiserror::Error;

/// Failure to turn a single image into a feature vector.
#[derive(Error, Debug)]
#[error("{reason}")]
pub struct ExtractionError {
    reason: String,
}

impl ExtractionError {
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }
}

/// Converts one image file into a fixed-length numeric vector.
pub trait FeatureExtractor {
    /// Length of every vector produced by [`extract`](Self::extract).
    fn feature_len(&self) -> usize;

    /// Extract the feature vector for one image, or report why this sample
    /// cannot be used. Must not panic on unreadable or corrupt input.
    fn extract(&self, path: &Path) -> Result<Vec<f32>, ExtractionError>;
}

/// Default extractor: decode, convert to grayscale, resize to `side` x
/// `side`, flatten row-major with one `f32` per pixel (0 to 255).
#[derive(Debug, Clone, Copy)]
pub struct GrayscaleExtractor {
    side: u32,
}

impl GrayscaleExtractor {
    pub fn new(side: u32) -> Self {
        Self { side }
    }

    pub fn side(&self) -> u32 {
        self.side
    }
}

impl FeatureExtractor for GrayscaleExtractor {
    fn feature_len(&self) -> usize {
        (self.side as usize) * (self.side as usize)
    }

    fn extract(&self, path: &Path) -> Result<Vec<f32>, ExtractionError> {
        let img = image::open(path)
            .map_err(|err| ExtractionError::new(format!("decoding {}: {err}", path.display())))?;

        let gray = img.to_luma8();
        let resized = image::imageops::resize(&gray, self.side, self.side, FilterType::CatmullRom);

        Ok(resized.pixels().map(|px| f32::from(px.0[0])).collect())
    }
}
