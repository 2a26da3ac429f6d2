// src/engine/orchestrator.rs

//! Training orchestration: one job from payload to persisted artifacts.
//!
//! The run is a linear phase sequence; every phase either hands its output
//! to the next one or aborts the run with an [`EngineError`] that becomes
//! the result record. There is no retry and no partial success: artifacts
//! are only written in the persisting phase, after evaluation succeeded.

use std::fmt;
use std::path::Path;

use anyhow::anyhow;
use tracing::{info, warn};

use crate::config::EngineConfig;
use crate::dataset::{self, Sample};
use crate::engine::result::TrainReport;
use crate::engine::split::{holdout_split, DataSplit};
use crate::errors::{EngineError, Result};
use crate::features::FeatureExtractor;
use crate::model::{ArtifactStore, ForestParams, LabelEncoder, RandomForest, MODEL_FILENAME};
use crate::payload::JobPayload;
use crate::pipeline::{execution_order, walk_to_stage, PipelineGraph};

/// Phases of one training run, entered strictly in declaration order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    LoadingDataset,
    CheckingGraph,
    ExtractingFeatures,
    EncodingLabels,
    Splitting,
    Fitting,
    Evaluating,
    Persisting,
    Done,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Phase::LoadingDataset => "loading-dataset",
            Phase::CheckingGraph => "checking-graph",
            Phase::ExtractingFeatures => "extracting-features",
            Phase::EncodingLabels => "encoding-labels",
            Phase::Splitting => "splitting",
            Phase::Fitting => "fitting",
            Phase::Evaluating => "evaluating",
            Phase::Persisting => "persisting",
            Phase::Done => "done",
        };
        f.write_str(name)
    }
}

/// Drives one training job end to end.
///
/// Holds no per-run state itself; everything flows through `run` so a single
/// orchestrator can serve any number of sequential jobs.
pub struct TrainingOrchestrator<'a> {
    cfg: &'a EngineConfig,
    extractor: &'a dyn FeatureExtractor,
}

impl<'a> TrainingOrchestrator<'a> {
    pub fn new(cfg: &'a EngineConfig, extractor: &'a dyn FeatureExtractor) -> Self {
        Self { cfg, extractor }
    }

    /// Execute the full training sequence for `payload`.
    ///
    /// Expects the payload to be validated and its `imageFolder` to exist on
    /// disk; both are checked at the submission boundary.
    pub fn run(&self, payload: &JobPayload) -> Result<TrainReport> {
        info!("starting pipeline execution");

        let samples = self.load_dataset(Path::new(&payload.image_folder))?;
        // Graph problems surface before feature extraction so an ill-formed
        // pipeline is rejected without paying for image decoding.
        let stages = self.check_graph(payload)?;
        let (features, labels) = self.extract_features(&samples)?;
        let (encoder, encoded) = self.encode_labels(&labels)?;
        let split = self.split_dataset(features.len())?;
        let forest = self.fit_forest(&features, &encoded, &split.train, encoder.len())?;
        let accuracy = self.evaluate(&forest, &features, &encoded, &split.holdout);
        self.persist(&forest, &encoder)?;

        info!(phase = %Phase::Done, accuracy, "pipeline executed");
        Ok(TrainReport {
            message: "Pipeline executed and model trained successfully!".to_string(),
            model: "RandomForestClassifier".to_string(),
            accuracy,
            stages_executed: stages,
            download_link: download_link(&self.cfg.artifacts.dir),
        })
    }

    fn load_dataset(&self, image_dir: &Path) -> Result<Vec<Sample>> {
        info!(phase = %Phase::LoadingDataset, dir = ?image_dir, "loading dataset");
        let samples = dataset::load_dataset(image_dir)?;
        if samples.is_empty() {
            warn!(dir = ?image_dir, "dataset holds no usable images");
            return Err(EngineError::EmptyDataset);
        }
        info!(count = samples.len(), "dataset loaded");
        Ok(samples)
    }

    /// Sequence the graph and make sure the training stage is reachable.
    /// Returns the visited stage labels for the success record.
    fn check_graph(&self, payload: &JobPayload) -> Result<Vec<String>> {
        info!(
            phase = %Phase::CheckingGraph,
            nodes = payload.nodes.len(),
            edges = payload.edges.len(),
            "sequencing pipeline graph"
        );

        let graph = PipelineGraph::from_payload(&payload.nodes, &payload.edges);
        let order = execution_order(&graph);
        info!(order = ?order.ids(), complete = order.is_complete(), "execution order computed");
        if !order.is_complete() {
            warn!(
                ordered = order.len(),
                declared = graph.node_count(),
                "pipeline graph not fully orderable (cycle or edge from an undeclared node)"
            );
        }

        let walk = walk_to_stage(&graph, &order, &self.cfg.training.stage_label);
        if !walk.reached {
            warn!(stage = %self.cfg.training.stage_label, "training stage not reached");
            return Err(EngineError::TrainingStageUnreachable {
                label: self.cfg.training.stage_label.clone(),
            });
        }
        Ok(walk.visited)
    }

    /// Extract one feature vector per sample, dropping samples that fail.
    fn extract_features(&self, samples: &[Sample]) -> Result<(Vec<Vec<f32>>, Vec<String>)> {
        info!(
            phase = %Phase::ExtractingFeatures,
            samples = samples.len(),
            feature_len = self.extractor.feature_len(),
            "extracting features"
        );

        let mut features = Vec::with_capacity(samples.len());
        let mut labels = Vec::with_capacity(samples.len());
        let mut dropped = 0usize;

        for sample in samples {
            match self.extractor.extract(&sample.path) {
                Ok(vector) => {
                    features.push(vector);
                    labels.push(sample.label.clone());
                }
                Err(err) => {
                    dropped += 1;
                    warn!(path = ?sample.path, error = %err, "dropping sample: extraction failed");
                }
            }
        }

        if dropped > 0 {
            info!(dropped, kept = features.len(), "extraction finished with dropped samples");
        }
        if features.is_empty() {
            return Err(EngineError::NoFeaturesExtracted);
        }
        Ok((features, labels))
    }

    fn encode_labels(&self, labels: &[String]) -> Result<(LabelEncoder, Vec<usize>)> {
        info!(phase = %Phase::EncodingLabels, "encoding labels");
        let encoder = LabelEncoder::fit(labels);
        let encoded = labels
            .iter()
            .map(|label| {
                encoder
                    .transform(label)
                    .ok_or_else(|| anyhow!("label {label:?} missing from freshly fitted encoder"))
            })
            .collect::<std::result::Result<Vec<_>, _>>()?;
        info!(classes = ?encoder.classes(), "labels encoded");
        Ok((encoder, encoded))
    }

    fn split_dataset(&self, total: usize) -> Result<DataSplit> {
        info!(
            phase = %Phase::Splitting,
            total,
            holdout_fraction = self.cfg.training.holdout_fraction,
            "splitting dataset"
        );
        match holdout_split(
            total,
            self.cfg.training.holdout_fraction,
            self.cfg.training.seed,
        ) {
            Ok(split) => {
                info!(train = split.train.len(), holdout = split.holdout.len(), "dataset split");
                Ok(split)
            }
            Err(err) => {
                warn!(total, "cannot split dataset into non-empty partitions");
                Err(err)
            }
        }
    }

    fn fit_forest(
        &self,
        features: &[Vec<f32>],
        encoded: &[usize],
        train_rows: &[usize],
        n_classes: usize,
    ) -> Result<RandomForest> {
        let params = ForestParams {
            trees: self.cfg.training.trees,
            max_depth: self.cfg.training.max_depth,
            min_samples_split: self.cfg.training.min_samples_split,
            seed: self.cfg.training.seed,
        };
        info!(
            phase = %Phase::Fitting,
            trees = params.trees,
            max_depth = params.max_depth,
            train = train_rows.len(),
            "fitting random forest"
        );

        let train_features: Vec<&[f32]> = train_rows
            .iter()
            .map(|&row| features[row].as_slice())
            .collect();
        let train_labels: Vec<usize> = train_rows.iter().map(|&row| encoded[row]).collect();

        let forest = RandomForest::fit(&train_features, &train_labels, n_classes, &params)?;
        info!(trees = forest.tree_count(), "forest fitted");
        Ok(forest)
    }

    /// Holdout accuracy. `holdout_rows` is non-empty by construction.
    fn evaluate(
        &self,
        forest: &RandomForest,
        features: &[Vec<f32>],
        encoded: &[usize],
        holdout_rows: &[usize],
    ) -> f64 {
        info!(phase = %Phase::Evaluating, holdout = holdout_rows.len(), "evaluating on holdout set");
        let correct = holdout_rows
            .iter()
            .filter(|&&row| forest.predict(&features[row]) == encoded[row])
            .count();
        let accuracy = correct as f64 / holdout_rows.len() as f64;
        info!(accuracy, correct, holdout = holdout_rows.len(), "holdout accuracy");
        accuracy
    }

    fn persist(&self, forest: &RandomForest, encoder: &LabelEncoder) -> Result<()> {
        info!(phase = %Phase::Persisting, dir = ?self.cfg.artifacts.dir, "persisting artifacts");
        let store = ArtifactStore::new(&self.cfg.artifacts.dir);
        store.save(forest, encoder)
    }
}

/// Server-relative download link for the model artifact: the final path
/// component of the artifact directory, then the model filename.
fn download_link(artifact_dir: &Path) -> String {
    let dir_name = artifact_dir
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| "uploads".to_string());
    format!("/{dir_name}/{MODEL_FILENAME}")
}
