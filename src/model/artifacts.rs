// src/model/artifacts.rs

//! Artifact persistence: the trained model and its label encoder.
//!
//! Both artifacts live as JSON files in one artifact directory and are
//! overwritten wholesale on every successful training run. There is no
//! versioning; the directory always reflects the latest run. Loading guards
//! against a missing or structurally corrupt file with dedicated errors so
//! inference can report exactly which artifact is unusable.

use std::fs::{self, File};
use std::io::{BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

use anyhow::Context;
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::info;

use crate::errors::{EngineError, Result};
use crate::model::encoder::LabelEncoder;
use crate::model::forest::RandomForest;

/// Well-known model filename inside the artifact directory.
pub const MODEL_FILENAME: &str = "model.json";

/// Well-known label-encoder filename inside the artifact directory.
pub const ENCODER_FILENAME: &str = "label_encoder.json";

/// Reads and writes the artifact pair for one artifact directory.
#[derive(Debug, Clone)]
pub struct ArtifactStore {
    dir: PathBuf,
}

impl ArtifactStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn model_path(&self) -> PathBuf {
        self.dir.join(MODEL_FILENAME)
    }

    pub fn encoder_path(&self) -> PathBuf {
        self.dir.join(ENCODER_FILENAME)
    }

    /// Persist both artifacts, creating the directory on demand.
    pub fn save(&self, model: &RandomForest, encoder: &LabelEncoder) -> Result<()> {
        fs::create_dir_all(&self.dir)
            .with_context(|| format!("creating artifact directory {:?}", self.dir))?;
        write_json(&self.model_path(), model)?;
        write_json(&self.encoder_path(), encoder)?;
        info!(
            model = ?self.model_path(),
            encoder = ?self.encoder_path(),
            "artifacts saved"
        );
        Ok(())
    }

    /// Load the fitted model. A missing file is its own error kind so the
    /// caller can report which artifact is absent.
    pub fn load_model(&self) -> Result<RandomForest> {
        let path = self.model_path();
        if !path.is_file() {
            return Err(EngineError::ModelArtifactMissing(path));
        }
        let model: RandomForest = read_json(&path)?;
        if !model.is_well_formed() {
            return Err(EngineError::ArtifactMismatch(format!(
                "model artifact {:?} is structurally corrupt",
                path
            )));
        }
        Ok(model)
    }

    /// Load the label encoder, analogous to [`load_model`](Self::load_model).
    pub fn load_encoder(&self) -> Result<LabelEncoder> {
        let path = self.encoder_path();
        if !path.is_file() {
            return Err(EngineError::EncoderArtifactMissing(path));
        }
        let encoder: LabelEncoder = read_json(&path)?;
        if encoder.is_empty() {
            return Err(EngineError::ArtifactMismatch(format!(
                "label encoder artifact {:?} has no classes",
                path
            )));
        }
        Ok(encoder)
    }
}

fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    let file = File::create(path).with_context(|| format!("creating artifact file {:?}", path))?;
    let mut writer = BufWriter::new(file);
    serde_json::to_writer(&mut writer, value)
        .with_context(|| format!("serializing artifact {:?}", path))?;
    writer
        .flush()
        .with_context(|| format!("flushing artifact file {:?}", path))?;
    Ok(())
}

fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let file = File::open(path).with_context(|| format!("opening artifact file {:?}", path))?;
    let reader = BufReader::new(file);
    let value = serde_json::from_reader(reader)
        .with_context(|| format!("parsing artifact {:?}", path))?;
    Ok(value)
}
