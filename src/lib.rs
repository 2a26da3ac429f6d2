// src/lib.rs

pub mod cli;
pub mod config;
pub mod dataset;
pub mod engine;
pub mod errors;
pub mod features;
pub mod logging;
pub mod model;
pub mod payload;
pub mod pipeline;
pub mod predict;

use std::fs;
use std::io::{Read, Write};
use std::path::Path;

use anyhow::{Context, Result};
use tracing::debug;

use crate::cli::{CliArgs, Command};
use crate::config::loader::load_or_default;
use crate::config::model::EngineConfig;
use crate::config::validate_config;
use crate::engine::result::{ErrorReport, TrainReport, write_json_line};
use crate::engine::TrainingOrchestrator;
use crate::errors::EngineError;
use crate::features::{FeatureExtractor, GrayscaleExtractor};
use crate::payload::{parse_job, parse_predict};
use crate::pipeline::{execution_order, walk_to_stage, PipelineGraph};
use crate::predict::InferenceRunner;

/// High-level entry point used by `main.rs`.
///
/// This wires together:
/// - config resolution (file, defaults, CLI overrides)
/// - the feature extractor
/// - the requested subcommand
///
/// Job-level failures become error records on stdout and still return
/// `Ok(())`; only operator errors (unloadable config, unreadable payload
/// source, unusable stdout) escape as `Err`.
pub fn run(args: CliArgs) -> Result<()> {
    let mut cfg = load_or_default(args.config.as_deref())?;
    if let Some(dir) = args.artifact_dir {
        cfg.artifacts.dir = dir;
    }
    validate_config(&cfg)?;
    debug!(artifact_dir = ?cfg.artifacts.dir, stage_label = %cfg.training.stage_label, "config resolved");

    match args.command {
        Command::Train { payload, dry_run } => {
            let input = read_payload_source(payload.as_deref())?;
            let stdout = std::io::stdout();
            if dry_run {
                print_dry_run(&cfg, &input, &mut stdout.lock())
            } else {
                run_train(&cfg, &input, &mut stdout.lock())
            }
        }
        Command::Predict { payload } => {
            let input = read_payload_source(payload.as_deref())?;
            let stdout = std::io::stdout();
            run_predict(&cfg, &input, &mut stdout.lock())
        }
    }
}

/// Execute one training job and emit exactly one result record on `out`.
///
/// Every failure of the job itself is absorbed into an error record; the
/// returned `Err` is reserved for an unusable result channel.
pub fn run_train<W: Write>(cfg: &EngineConfig, input: &str, out: &mut W) -> Result<()> {
    let extractor = GrayscaleExtractor::new(cfg.features.image_side);
    match train_job(cfg, &extractor, input) {
        Ok(report) => write_json_line(out, &report),
        Err(err) => write_json_line(out, &train_error_report(&err)),
    }
}

/// Execute one prediction and emit exactly one result record on `out`.
pub fn run_predict<W: Write>(cfg: &EngineConfig, input: &str, out: &mut W) -> Result<()> {
    let extractor = GrayscaleExtractor::new(cfg.features.image_side);
    let request = match parse_predict(input) {
        Ok(request) => request,
        Err(err) => return write_json_line(out, &predict_error_report(&err, None)),
    };
    match InferenceRunner::new(cfg, &extractor).run(&request) {
        Ok(report) => write_json_line(out, &report),
        Err(err) => {
            write_json_line(out, &predict_error_report(&err, Some(&request.image_path)))
        }
    }
}

/// Parse + sequence the payload and print the execution plan without
/// touching the dataset or training anything.
pub fn print_dry_run<W: Write>(cfg: &EngineConfig, input: &str, out: &mut W) -> Result<()> {
    let job = match parse_job(input) {
        Ok(job) => job,
        Err(err) => return write_json_line(out, &train_error_report(&err)),
    };

    let graph = PipelineGraph::from_payload(&job.nodes, &job.edges);
    let order = execution_order(&graph);
    let walk = walk_to_stage(&graph, &order, &cfg.training.stage_label);

    writeln!(out, "traindag dry-run")?;
    writeln!(out, "  image folder: {}", job.image_folder)?;
    writeln!(out, "  nodes: {}  edges: {}", job.nodes.len(), job.edges.len())?;
    writeln!(
        out,
        "  execution order ({}complete):",
        if order.is_complete() { "" } else { "in" }
    )?;
    for id in order.ids() {
        writeln!(out, "    - {} ({})", id, graph.label_of(id).unwrap_or("Unknown"))?;
    }
    writeln!(out, "  stages until '{}':", cfg.training.stage_label)?;
    for stage in &walk.visited {
        writeln!(out, "    - {stage}")?;
    }
    writeln!(out, "  training stage reachable: {}", walk.reached)?;

    debug!("dry-run complete (no training executed)");
    Ok(())
}

/// Run the job itself; every failure path comes back as an [`EngineError`].
fn train_job(
    cfg: &EngineConfig,
    extractor: &dyn FeatureExtractor,
    input: &str,
) -> errors::Result<TrainReport> {
    let job = parse_job(input)?;
    if !Path::new(&job.image_folder).is_dir() {
        return Err(EngineError::ImageFolderMissing);
    }
    TrainingOrchestrator::new(cfg, extractor).run(&job)
}

fn train_error_report(err: &EngineError) -> ErrorReport {
    let message = if err.is_job_error() {
        err.to_string()
    } else {
        format!("Unexpected error occurred: {err}")
    };
    ErrorReport::new(message).with_trace(err.trace())
}

fn predict_error_report(err: &EngineError, image_path: Option<&str>) -> ErrorReport {
    let message = if err.is_job_error() {
        err.to_string()
    } else {
        format!("Prediction failed: {err}")
    };
    let mut report = ErrorReport::new(message).with_trace(err.trace());
    // The upstream UI highlights the offending path for this case only.
    if matches!(err, EngineError::PredictionImageMissing) {
        if let Some(path) = image_path {
            report = report.with_image_path(path);
        }
    }
    report
}

/// Read the whole payload from `--payload <file>` or stdin.
fn read_payload_source(path: Option<&Path>) -> Result<String> {
    match path {
        Some(path) => {
            fs::read_to_string(path).with_context(|| format!("reading payload file {:?}", path))
        }
        None => {
            let mut input = String::new();
            std::io::stdin()
                .read_to_string(&mut input)
                .context("reading payload from stdin")?;
            Ok(input)
        }
    }
}
