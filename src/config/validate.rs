// src/config/validate.rs

use anyhow::{anyhow, Result};

use crate::config::model::EngineConfig;

/// Run basic semantic validation against a loaded configuration.
///
/// This checks:
/// - `[training].stage_label` is non-empty
/// - `[training].holdout_fraction` lies strictly between 0 and 1
/// - `[training].trees` and `[training].max_depth` are at least 1
/// - `[training].min_samples_split` is at least 2
/// - `[features].image_side` is within a sane range
/// - `[artifacts].dir` is a non-empty path
pub fn validate_config(cfg: &EngineConfig) -> Result<()> {
    validate_artifacts(cfg)?;
    validate_training(cfg)?;
    validate_features(cfg)?;
    Ok(())
}

fn validate_artifacts(cfg: &EngineConfig) -> Result<()> {
    if cfg.artifacts.dir.as_os_str().is_empty() {
        return Err(anyhow!("[artifacts].dir must be a non-empty path"));
    }
    Ok(())
}

fn validate_training(cfg: &EngineConfig) -> Result<()> {
    let training = &cfg.training;

    if training.stage_label.trim().is_empty() {
        return Err(anyhow!("[training].stage_label must be non-empty"));
    }

    if !(training.holdout_fraction > 0.0 && training.holdout_fraction < 1.0) {
        return Err(anyhow!(
            "[training].holdout_fraction must lie strictly between 0 and 1 (got {})",
            training.holdout_fraction
        ));
    }

    if training.trees == 0 {
        return Err(anyhow!("[training].trees must be >= 1 (got 0)"));
    }

    if training.max_depth == 0 {
        return Err(anyhow!("[training].max_depth must be >= 1 (got 0)"));
    }

    if training.min_samples_split < 2 {
        return Err(anyhow!(
            "[training].min_samples_split must be >= 2 (got {})",
            training.min_samples_split
        ));
    }

    Ok(())
}

fn validate_features(cfg: &EngineConfig) -> Result<()> {
    let side = cfg.features.image_side;
    if !(8..=512).contains(&side) {
        return Err(anyhow!(
            "[features].image_side must be between 8 and 512 (got {})",
            side
        ));
    }
    Ok(())
}
