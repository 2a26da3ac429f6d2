use std::collections::BTreeSet;
use std::error::Error;

use traindag::engine::holdout_split;
use traindag::model::{ForestParams, LabelEncoder, RandomForest};

type TestResult = Result<(), Box<dyn Error>>;

fn as_rows(features: &[Vec<f32>]) -> Vec<&[f32]> {
    features.iter().map(|row| row.as_slice()).collect()
}

/// Two well-separated clusters: class 0 around 10..20, class 1 around 200..210.
fn separable() -> (Vec<Vec<f32>>, Vec<usize>) {
    let mut features = Vec::new();
    let mut labels = Vec::new();
    for i in 0..8 {
        let low = 10.0 + i as f32;
        features.push(vec![low, low + 1.0, low + 2.0, low + 3.0]);
        labels.push(0);
        let high = 200.0 + i as f32;
        features.push(vec![high, high + 1.0, high + 2.0, high + 3.0]);
        labels.push(1);
    }
    (features, labels)
}

fn small_params() -> ForestParams {
    ForestParams {
        trees: 11,
        max_depth: 16,
        min_samples_split: 2,
        seed: 42,
    }
}

#[test]
fn encoder_sorts_and_dedups_classes() {
    let encoder = LabelEncoder::fit(&["dogs", "cats", "dogs", "birds"]);

    assert_eq!(encoder.classes(), ["birds", "cats", "dogs"]);
    assert_eq!(encoder.len(), 3);
    assert_eq!(encoder.transform("cats"), Some(1));
    assert_eq!(encoder.inverse(2), Some("dogs"));
    assert_eq!(encoder.transform("fish"), None);
    assert_eq!(encoder.inverse(3), None);
}

#[test]
fn encoder_assignment_is_independent_of_input_order() {
    let a = LabelEncoder::fit(&["b", "a", "c"]);
    let b = LabelEncoder::fit(&["c", "c", "a", "b"]);
    assert_eq!(a, b);
}

#[test]
fn holdout_split_takes_ceil_of_the_fraction() -> TestResult {
    let split = holdout_split(10, 0.2, 42)?;
    assert_eq!(split.holdout.len(), 2);
    assert_eq!(split.train.len(), 8);

    // 5 * 0.25 = 1.25, rounded up to 2.
    let split = holdout_split(5, 0.25, 42)?;
    assert_eq!(split.holdout.len(), 2);
    assert_eq!(split.train.len(), 3);
    Ok(())
}

#[test]
fn holdout_split_partitions_all_rows_exactly_once() -> TestResult {
    let split = holdout_split(20, 0.2, 7)?;

    let mut seen: BTreeSet<usize> = BTreeSet::new();
    for &row in split.train.iter().chain(split.holdout.iter()) {
        assert!(row < 20);
        assert!(seen.insert(row), "row {row} appears twice");
    }
    assert_eq!(seen.len(), 20);
    Ok(())
}

#[test]
fn holdout_split_is_deterministic_per_seed() -> TestResult {
    let a = holdout_split(30, 0.2, 42)?;
    let b = holdout_split(30, 0.2, 42)?;
    assert_eq!(a, b);

    let c = holdout_split(30, 0.2, 43)?;
    assert_ne!(a, c);
    Ok(())
}

#[test]
fn splitting_too_few_rows_fails() {
    assert!(holdout_split(0, 0.2, 42).is_err());
    assert!(holdout_split(1, 0.2, 42).is_err());
    // 2 rows leave one on each side.
    assert!(holdout_split(2, 0.2, 42).is_ok());
}

#[test]
fn forest_separates_the_obvious_clusters() -> TestResult {
    let (features, labels) = separable();
    let forest = RandomForest::fit(&as_rows(&features), &labels, 2, &small_params())?;

    assert_eq!(forest.tree_count(), 11);
    assert_eq!(forest.feature_len(), 4);
    assert_eq!(forest.n_classes(), 2);

    assert_eq!(forest.predict(&[12.5, 13.5, 14.5, 15.5]), 0);
    assert_eq!(forest.predict(&[230.0, 231.0, 232.0, 233.0]), 1);

    // Training rows themselves classify correctly.
    for (row, &label) in features.iter().zip(&labels) {
        assert_eq!(forest.predict(row), label);
    }
    Ok(())
}

#[test]
fn fitting_is_deterministic_for_a_fixed_seed() -> TestResult {
    let (features, labels) = separable();
    let params = small_params();

    let a = RandomForest::fit(&as_rows(&features), &labels, 2, &params)?;
    let b = RandomForest::fit(&as_rows(&features), &labels, 2, &params)?;

    assert_eq!(a, b);
    Ok(())
}

#[test]
fn single_class_data_fits_to_constant_leaves() -> TestResult {
    let features = vec![vec![1.0, 2.0], vec![3.0, 4.0], vec![5.0, 6.0]];
    let labels = vec![0, 0, 0];

    let forest = RandomForest::fit(&as_rows(&features), &labels, 1, &small_params())?;

    assert_eq!(forest.predict(&[100.0, -3.0]), 0);
    Ok(())
}

#[test]
fn degenerate_fit_inputs_are_rejected() {
    let features = vec![vec![1.0, 2.0], vec![3.0, 4.0]];
    let rows = as_rows(&features);

    // Mismatched label count.
    assert!(RandomForest::fit(&rows, &[0], 2, &small_params()).is_err());
    // No samples.
    assert!(RandomForest::fit(&[], &[], 2, &small_params()).is_err());
    // No classes.
    assert!(RandomForest::fit(&rows, &[0, 0], 0, &small_params()).is_err());
    // Label outside n_classes.
    assert!(RandomForest::fit(&rows, &[0, 5], 2, &small_params()).is_err());

    // Ragged feature matrix.
    let ragged = vec![vec![1.0, 2.0], vec![3.0]];
    assert!(RandomForest::fit(&as_rows(&ragged), &[0, 1], 2, &small_params()).is_err());

    // Zero trees.
    let mut params = small_params();
    params.trees = 0;
    assert!(RandomForest::fit(&rows, &[0, 1], 2, &params).is_err());
}

#[test]
fn forest_survives_a_json_round_trip() -> TestResult {
    let (features, labels) = separable();
    let forest = RandomForest::fit(&as_rows(&features), &labels, 2, &small_params())?;

    let json = serde_json::to_string(&forest)?;
    let reloaded: RandomForest = serde_json::from_str(&json)?;

    assert_eq!(forest, reloaded);
    assert!(reloaded.is_well_formed());
    for row in &features {
        assert_eq!(forest.predict(row), reloaded.predict(row));
    }
    Ok(())
}

#[test]
fn corrupt_artifact_structure_is_detected() -> TestResult {
    // A split pointing at itself must fail the well-formedness check.
    let json = r#"{
        "feature_len": 2,
        "n_classes": 2,
        "trees": [{"nodes": [
            {"Split": {"feature": 0, "threshold": 1.0, "left": 0, "right": 1}},
            {"Leaf": {"class": 0}}
        ]}]
    }"#;

    let forest: RandomForest = serde_json::from_str(json)?;
    assert!(!forest.is_well_formed());
    Ok(())
}
