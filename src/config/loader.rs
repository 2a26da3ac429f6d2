// src/config/loader.rs

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tracing::debug;

use crate::config::model::EngineConfig;
use crate::config::validate::validate_config;

/// Load a configuration file from a given path and return the raw
/// `EngineConfig`.
///
/// This only performs TOML deserialization; it does **not** perform semantic
/// validation (fraction bounds, etc.). Use [`load_and_validate`] for that.
pub fn load_from_path(path: impl AsRef<Path>) -> Result<EngineConfig> {
    let path = path.as_ref();
    let contents = fs::read_to_string(path)
        .with_context(|| format!("reading config file at {:?}", path))?;

    let config: EngineConfig = toml::from_str(&contents)
        .with_context(|| format!("parsing TOML config from {:?}", path))?;

    Ok(config)
}

/// Load a configuration file from path and run basic validation.
///
/// This is the recommended entry point for the rest of the application:
///
/// - Reads TOML.
/// - Applies defaults (handled by `serde` + `Default` impls).
/// - Checks semantic bounds (holdout fraction, tree counts, image side).
pub fn load_and_validate(path: impl AsRef<Path>) -> Result<EngineConfig> {
    let config = load_from_path(&path)?;
    validate_config(&config)?;
    Ok(config)
}

/// Resolve the effective config for a run.
///
/// An explicit `--config` path must exist; a missing file there is an
/// operator error. Without the flag, `Traindag.toml` in the working directory
/// is used when present, otherwise the built-in defaults apply.
pub fn load_or_default(path: Option<&Path>) -> Result<EngineConfig> {
    match path {
        Some(path) => load_and_validate(path),
        None => {
            let fallback = default_config_path();
            if fallback.is_file() {
                debug!(path = ?fallback, "using config file from working directory");
                load_and_validate(&fallback)
            } else {
                debug!("no config file found, using built-in defaults");
                Ok(EngineConfig::default())
            }
        }
    }
}

/// Helper to resolve a default config path.
///
/// Currently this just returns `Traindag.toml` in the current working
/// directory, but this function exists so you can later:
///
/// - Respect an env var (e.g. `TRAINDAG_CONFIG`).
/// - Look for multiple default locations.
pub fn default_config_path() -> PathBuf {
    PathBuf::from("Traindag.toml")
}
