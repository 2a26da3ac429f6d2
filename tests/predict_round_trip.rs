use std::error::Error;
use std::fs;
use std::path::Path;

use image::{GrayImage, Luma};
use serde_json::{json, Value};
use tempfile::tempdir;

use traindag::config::{ArtifactsSection, EngineConfig, FeaturesSection, TrainingSection};
use traindag::{run_predict, run_train};

type TestResult = Result<(), Box<dyn Error>>;

fn test_config(artifact_dir: &Path) -> EngineConfig {
    EngineConfig {
        artifacts: ArtifactsSection {
            dir: artifact_dir.to_path_buf(),
        },
        training: TrainingSection {
            trees: 15,
            ..TrainingSection::default()
        },
        features: FeaturesSection { image_side: 16 },
    }
}

fn write_png(path: &Path, brightness: u8) -> TestResult {
    GrayImage::from_pixel(8, 8, Luma([brightness])).save(path)?;
    Ok(())
}

/// Train on six dark and six bright images, leaving artifacts behind.
fn train_brightness_model(root: &Path, cfg: &EngineConfig) -> TestResult {
    let dataset = root.join("dataset");
    fs::create_dir_all(dataset.join("dark"))?;
    fs::create_dir_all(dataset.join("bright"))?;
    for i in 0..6u8 {
        write_png(&dataset.join("dark").join(format!("d{i}.png")), 20 + i * 2)?;
        write_png(&dataset.join("bright").join(format!("b{i}.png")), 200 + i * 2)?;
    }

    let payload = json!({
        "nodes": [
            {"id": "1", "data": {"label": "Data Loading"}},
            {"id": "2", "data": {"label": "Model Training"}}
        ],
        "edges": [{"source": "1", "target": "2"}],
        "imageFolder": dataset
    })
    .to_string();

    let mut out: Vec<u8> = Vec::new();
    run_train(cfg, &payload, &mut out)?;
    let record: Value = serde_json::from_slice(&out)?;
    assert!(
        record.get("error").is_none(),
        "training must succeed, got {record}"
    );
    Ok(())
}

fn predict_record(cfg: &EngineConfig, image_path: &Path) -> Result<Value, Box<dyn Error>> {
    let request = json!({ "imagePath": image_path }).to_string();
    let mut out: Vec<u8> = Vec::new();
    run_predict(cfg, &request, &mut out)?;
    Ok(serde_json::from_slice(&out)?)
}

#[test]
fn trained_model_classifies_new_images() -> TestResult {
    let tmp = tempdir()?;
    let cfg = test_config(&tmp.path().join("uploads"));
    train_brightness_model(tmp.path(), &cfg)?;

    let bright_query = tmp.path().join("bright_query.png");
    write_png(&bright_query, 215)?;
    let record = predict_record(&cfg, &bright_query)?;
    assert_eq!(record["prediction"], "bright");

    let dark_query = tmp.path().join("dark_query.png");
    write_png(&dark_query, 25)?;
    let record = predict_record(&cfg, &dark_query)?;
    assert_eq!(record["prediction"], "dark");
    Ok(())
}

#[test]
fn missing_image_path_is_echoed_back() -> TestResult {
    let tmp = tempdir()?;
    let cfg = test_config(&tmp.path().join("uploads"));
    train_brightness_model(tmp.path(), &cfg)?;

    let gone = tmp.path().join("never_uploaded.png");
    let record = predict_record(&cfg, &gone)?;

    assert_eq!(
        record["error"],
        "Image path is missing or file does not exist."
    );
    assert_eq!(record["imagePath"], gone.to_string_lossy().as_ref());
    assert!(record.get("trace").is_none());
    Ok(())
}

#[test]
fn empty_image_path_is_rejected() -> TestResult {
    let tmp = tempdir()?;
    let cfg = test_config(&tmp.path().join("uploads"));

    let mut out: Vec<u8> = Vec::new();
    run_predict(&cfg, "{}", &mut out)?;
    let record: Value = serde_json::from_slice(&out)?;

    assert_eq!(
        record["error"],
        "Image path is missing or file does not exist."
    );
    Ok(())
}

#[test]
fn prediction_without_trained_model_reports_the_missing_artifact() -> TestResult {
    let tmp = tempdir()?;
    let cfg = test_config(&tmp.path().join("uploads"));

    let query = tmp.path().join("query.png");
    write_png(&query, 100)?;
    let record = predict_record(&cfg, &query)?;

    let error = record["error"].as_str().expect("error string");
    assert!(error.starts_with("Trained model file ("), "got: {error}");
    assert!(error.ends_with(") not found."), "got: {error}");
    assert!(error.contains("model.json"));
    Ok(())
}

#[test]
fn deleted_encoder_artifact_is_reported_separately() -> TestResult {
    let tmp = tempdir()?;
    let artifacts = tmp.path().join("uploads");
    let cfg = test_config(&artifacts);
    train_brightness_model(tmp.path(), &cfg)?;

    fs::remove_file(artifacts.join("label_encoder.json"))?;

    let query = tmp.path().join("query.png");
    write_png(&query, 100)?;
    let record = predict_record(&cfg, &query)?;

    let error = record["error"].as_str().expect("error string");
    assert!(error.starts_with("Label encoder file ("), "got: {error}");
    assert!(error.contains("label_encoder.json"));
    Ok(())
}

#[test]
fn unreadable_query_image_is_a_preprocessing_error() -> TestResult {
    let tmp = tempdir()?;
    let cfg = test_config(&tmp.path().join("uploads"));
    train_brightness_model(tmp.path(), &cfg)?;

    let query = tmp.path().join("query.png");
    fs::write(&query, b"this is not an image")?;
    let record = predict_record(&cfg, &query)?;

    let error = record["error"].as_str().expect("error string");
    assert!(error.starts_with("Image preprocessing failed:"), "got: {error}");
    Ok(())
}

#[test]
fn extractor_mismatch_with_artifacts_is_reported() -> TestResult {
    let tmp = tempdir()?;
    let artifacts = tmp.path().join("uploads");
    let cfg = test_config(&artifacts);
    train_brightness_model(tmp.path(), &cfg)?;

    // Same artifacts, differently configured extractor.
    let mut wider = test_config(&artifacts);
    wider.features.image_side = 32;

    let query = tmp.path().join("query.png");
    write_png(&query, 100)?;
    let record = predict_record(&wider, &query)?;

    let error = record["error"].as_str().expect("error string");
    assert!(error.starts_with("Artifact mismatch:"), "got: {error}");
    Ok(())
}

#[test]
fn malformed_predict_request_is_reported_as_invalid() -> TestResult {
    let tmp = tempdir()?;
    let cfg = test_config(&tmp.path().join("uploads"));

    let mut out: Vec<u8> = Vec::new();
    run_predict(&cfg, "not json at all", &mut out)?;
    let record: Value = serde_json::from_slice(&out)?;

    let error = record["error"].as_str().expect("error string");
    assert!(error.starts_with("Invalid job payload:"), "got: {error}");
    Ok(())
}

#[test]
fn corrupt_model_artifact_is_rejected_at_load() -> TestResult {
    let tmp = tempdir()?;
    let artifacts = tmp.path().join("uploads");
    let cfg = test_config(&artifacts);
    train_brightness_model(tmp.path(), &cfg)?;

    fs::write(artifacts.join("model.json"), b"{]")?;

    let query = tmp.path().join("query.png");
    write_png(&query, 100)?;
    let record = predict_record(&cfg, &query)?;

    // Parse failures are unexpected errors: prefixed and carrying a trace.
    let error = record["error"].as_str().expect("error string");
    assert!(error.starts_with("Prediction failed:"), "got: {error}");
    assert!(record.get("trace").is_some());
    Ok(())
}
