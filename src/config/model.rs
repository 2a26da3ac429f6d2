// src/config/model.rs

use std::path::PathBuf;

use serde::Deserialize;

/// Top-level engine configuration as read from a TOML file.
///
/// A fully spelled-out file looks like this:
///
/// ```toml
/// [artifacts]
/// dir = "uploads"
///
/// [training]
/// stage_label = "Model Training"
/// holdout_fraction = 0.2
/// seed = 42
/// trees = 100
/// max_depth = 32
/// min_samples_split = 2
///
/// [features]
/// image_side = 64
/// ```
///
/// All sections and fields are optional; the defaults above apply to anything
/// left out, so an absent file behaves exactly like an empty one.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct EngineConfig {
    /// Artifact persistence config from `[artifacts]`.
    #[serde(default)]
    pub artifacts: ArtifactsSection,

    /// Training behaviour from `[training]`.
    #[serde(default)]
    pub training: TrainingSection,

    /// Feature extraction config from `[features]`.
    #[serde(default)]
    pub features: FeaturesSection,
}

/// `[artifacts]` section.
#[derive(Debug, Clone, Deserialize)]
pub struct ArtifactsSection {
    /// Directory receiving `model.json` and `label_encoder.json`.
    ///
    /// Created on demand when training persists its artifacts. The final
    /// path component also names the download link in the success record.
    #[serde(default = "default_artifact_dir")]
    pub dir: PathBuf,
}

fn default_artifact_dir() -> PathBuf {
    PathBuf::from("uploads")
}

impl Default for ArtifactsSection {
    fn default() -> Self {
        Self {
            dir: default_artifact_dir(),
        }
    }
}

/// `[training]` section.
#[derive(Debug, Clone, Deserialize)]
pub struct TrainingSection {
    /// Label that marks the training stage inside the pipeline graph.
    ///
    /// The execution order must visit a node with this label for the job to
    /// proceed past the graph check.
    #[serde(default = "default_stage_label")]
    pub stage_label: String,

    /// Fraction of the dataset held out for accuracy evaluation.
    ///
    /// The holdout set gets `ceil(total * holdout_fraction)` rows; must stay
    /// strictly between 0 and 1.
    #[serde(default = "default_holdout_fraction")]
    pub holdout_fraction: f64,

    /// Seed for every random decision of a run (shuffle, bootstrap, feature
    /// subsets). A fixed dataset and seed reproduce the same model bit for
    /// bit.
    #[serde(default = "default_seed")]
    pub seed: u64,

    /// Number of trees in the random-forest ensemble.
    #[serde(default = "default_trees")]
    pub trees: usize,

    /// Hard depth cap per tree.
    #[serde(default = "default_max_depth")]
    pub max_depth: usize,

    /// Tree nodes with fewer samples than this become leaves.
    #[serde(default = "default_min_samples_split")]
    pub min_samples_split: usize,
}

fn default_stage_label() -> String {
    "Model Training".to_string()
}

fn default_holdout_fraction() -> f64 {
    0.2
}

fn default_seed() -> u64 {
    42
}

fn default_trees() -> usize {
    100
}

fn default_max_depth() -> usize {
    32
}

fn default_min_samples_split() -> usize {
    2
}

impl Default for TrainingSection {
    fn default() -> Self {
        Self {
            stage_label: default_stage_label(),
            holdout_fraction: default_holdout_fraction(),
            seed: default_seed(),
            trees: default_trees(),
            max_depth: default_max_depth(),
            min_samples_split: default_min_samples_split(),
        }
    }
}

/// `[features]` section.
#[derive(Debug, Clone, Deserialize)]
pub struct FeaturesSection {
    /// Every image is resized to `image_side` x `image_side` grayscale before
    /// flattening, so feature vectors have `image_side^2` entries.
    #[serde(default = "default_image_side")]
    pub image_side: u32,
}

fn default_image_side() -> u32 {
    64
}

impl Default for FeaturesSection {
    fn default() -> Self {
        Self {
            image_side: default_image_side(),
        }
    }
}
