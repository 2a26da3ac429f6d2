// src/model/forest.rs

//! Random-forest classifier over dense `f32` feature vectors.
//!
//! An ensemble of CART decision trees. Each tree is grown on a bootstrap
//! resample of the training set and considers a random subset of roughly
//! sqrt(feature count) candidate features at every split, scored by Gini
//! impurity with midpoint thresholds. Prediction is a majority vote across
//! trees, ties broken towards the lowest class index.
//!
//! All randomness flows from the run seed (tree `i` reseeds with
//! `seed + i`), so a fixed dataset and seed reproduce the same model.

use std::cmp::Ordering;

use anyhow::{bail, Result};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

/// Training parameters for the ensemble.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForestParams {
    /// Number of trees grown.
    pub trees: usize,
    /// Hard depth cap per tree.
    pub max_depth: usize,
    /// Nodes with fewer samples than this become leaves.
    pub min_samples_split: usize,
    /// Base seed for bootstrap and feature-subset sampling.
    pub seed: u64,
}

impl Default for ForestParams {
    fn default() -> Self {
        Self {
            trees: 100,
            max_depth: 32,
            min_samples_split: 2,
            seed: 42,
        }
    }
}

/// One node of a fitted tree, arena-indexed into [`DecisionTree`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
enum TreeNode {
    Leaf {
        class: usize,
    },
    Split {
        feature: usize,
        threshold: f32,
        left: usize,
        right: usize,
    },
}

/// A single fitted CART tree. Node 0 is the root; children always sit at
/// higher indices than their parent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DecisionTree {
    nodes: Vec<TreeNode>,
}

impl DecisionTree {
    /// Class index for one sample. The sample must have the feature length
    /// the tree was fitted with.
    pub fn predict(&self, sample: &[f32]) -> usize {
        let mut index = 0;
        loop {
            match &self.nodes[index] {
                TreeNode::Leaf { class } => return *class,
                TreeNode::Split {
                    feature,
                    threshold,
                    left,
                    right,
                } => {
                    index = if sample[*feature] <= *threshold {
                        *left
                    } else {
                        *right
                    };
                }
            }
        }
    }

    fn is_well_formed(&self, feature_len: usize, n_classes: usize) -> bool {
        !self.nodes.is_empty()
            && self.nodes.iter().enumerate().all(|(index, node)| match node {
                TreeNode::Leaf { class } => *class < n_classes,
                TreeNode::Split {
                    feature,
                    left,
                    right,
                    ..
                } => {
                    // Children at higher indices guarantee the predict walk
                    // terminates.
                    *feature < feature_len
                        && *left > index
                        && *right > index
                        && *left < self.nodes.len()
                        && *right < self.nodes.len()
                }
            })
    }
}

/// Random-forest ensemble fitted over a feature matrix.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RandomForest {
    feature_len: usize,
    n_classes: usize,
    trees: Vec<DecisionTree>,
}

impl RandomForest {
    /// Fit an ensemble on `features` (one row per sample) and `labels`
    /// (encoded class indices, all below `n_classes`).
    pub fn fit(
        features: &[&[f32]],
        labels: &[usize],
        n_classes: usize,
        params: &ForestParams,
    ) -> Result<Self> {
        if features.is_empty() || features.len() != labels.len() {
            bail!(
                "classifier needs matching, non-empty features and labels (got {} rows, {} labels)",
                features.len(),
                labels.len()
            );
        }
        if n_classes == 0 {
            bail!("classifier needs at least one class");
        }
        if params.trees == 0 {
            bail!("ensemble size must be >= 1");
        }

        let feature_len = features[0].len();
        if feature_len == 0 {
            bail!("feature vectors are empty");
        }
        if let Some(row) = features.iter().position(|row| row.len() != feature_len) {
            bail!(
                "inconsistent feature vector length at row {} (expected {}, got {})",
                row,
                feature_len,
                features[row].len()
            );
        }
        if let Some(row) = labels.iter().position(|&label| label >= n_classes) {
            bail!(
                "label {} at row {} is outside the {} known classes",
                labels[row],
                row,
                n_classes
            );
        }

        let n_candidates = ((feature_len as f64).sqrt() as usize).max(1);

        let mut trees = Vec::with_capacity(params.trees);
        for tree_index in 0..params.trees {
            let mut rng = StdRng::seed_from_u64(params.seed.wrapping_add(tree_index as u64));

            // Bootstrap resample: one draw with replacement per training row.
            let sample_rows: Vec<usize> = (0..features.len())
                .map(|_| rng.gen_range(0..features.len()))
                .collect();

            let mut builder = TreeBuilder {
                features,
                labels,
                n_classes,
                n_candidates,
                max_depth: params.max_depth,
                min_samples_split: params.min_samples_split.max(2),
                nodes: Vec::new(),
            };
            builder.grow(sample_rows, 0, &mut rng);
            trees.push(DecisionTree {
                nodes: builder.nodes,
            });
        }

        Ok(Self {
            feature_len,
            n_classes,
            trees,
        })
    }

    /// Majority vote across all trees. Ties go to the lowest class index.
    pub fn predict(&self, sample: &[f32]) -> usize {
        debug_assert_eq!(sample.len(), self.feature_len);

        let mut votes = vec![0usize; self.n_classes];
        for tree in &self.trees {
            votes[tree.predict(sample)] += 1;
        }

        // Iterator::max_by_key keeps the *last* maximum, so scan by hand to
        // keep the first.
        let mut best = 0;
        for (class, &count) in votes.iter().enumerate() {
            if count > votes[best] {
                best = class;
            }
        }
        best
    }

    pub fn feature_len(&self) -> usize {
        self.feature_len
    }

    pub fn n_classes(&self) -> usize {
        self.n_classes
    }

    pub fn tree_count(&self) -> usize {
        self.trees.len()
    }

    /// Structural sanity check for deserialized artifacts: class and feature
    /// indices in range, child indices in range and strictly descending the
    /// arena.
    pub fn is_well_formed(&self) -> bool {
        self.feature_len > 0
            && self.n_classes > 0
            && !self.trees.is_empty()
            && self
                .trees
                .iter()
                .all(|tree| tree.is_well_formed(self.feature_len, self.n_classes))
    }
}

/// Per-tree growing state. Owns the node arena while recursion fills it.
struct TreeBuilder<'a> {
    features: &'a [&'a [f32]],
    labels: &'a [usize],
    n_classes: usize,
    n_candidates: usize,
    max_depth: usize,
    min_samples_split: usize,
    nodes: Vec<TreeNode>,
}

/// Candidate split of one node, scored by weighted Gini impurity.
struct SplitCandidate {
    feature: usize,
    threshold: f32,
    impurity: f64,
}

impl TreeBuilder<'_> {
    /// Grow the subtree over `rows` and return its arena index. The first
    /// call allocates index 0, which makes it the root.
    fn grow(&mut self, rows: Vec<usize>, depth: usize, rng: &mut StdRng) -> usize {
        let counts = self.class_counts(&rows);

        if depth >= self.max_depth || rows.len() < self.min_samples_split || is_pure(&counts) {
            return self.push_leaf(&counts);
        }

        let Some(split) = self.best_split(&rows, rng) else {
            return self.push_leaf(&counts);
        };

        let (left_rows, right_rows) = partition(self.features, &rows, split.feature, split.threshold);
        // Thresholds sit strictly between two observed values, so both sides
        // are non-empty; NaN features would break that, so keep the guard.
        if left_rows.is_empty() || right_rows.is_empty() {
            return self.push_leaf(&counts);
        }

        let index = self.nodes.len();
        self.nodes.push(TreeNode::Split {
            feature: split.feature,
            threshold: split.threshold,
            left: 0,
            right: 0,
        });

        let left = self.grow(left_rows, depth + 1, rng);
        let right = self.grow(right_rows, depth + 1, rng);
        self.nodes[index] = TreeNode::Split {
            feature: split.feature,
            threshold: split.threshold,
            left,
            right,
        };

        index
    }

    /// Lowest-impurity split over a random subset of candidate features, or
    /// `None` when every candidate is constant across `rows`.
    fn best_split(&self, rows: &[usize], rng: &mut StdRng) -> Option<SplitCandidate> {
        let feature_len = self.features[0].len();
        let mut best: Option<SplitCandidate> = None;

        for feature in sample_features(feature_len, self.n_candidates, rng) {
            let mut ordered: Vec<(f32, usize)> = rows
                .iter()
                .map(|&row| (self.features[row][feature], self.labels[row]))
                .collect();
            ordered.sort_by(|a, b| a.0.partial_cmp(&b.0).unwrap_or(Ordering::Equal));

            let total = ordered.len();
            let mut left_counts = vec![0usize; self.n_classes];
            let mut right_counts = vec![0usize; self.n_classes];
            for &(_, label) in &ordered {
                right_counts[label] += 1;
            }

            for boundary in 0..total - 1 {
                let (value, label) = ordered[boundary];
                left_counts[label] += 1;
                right_counts[label] -= 1;

                let next_value = ordered[boundary + 1].0;
                if next_value <= value {
                    continue;
                }

                // Midpoint, unless rounding pushes it onto the upper value;
                // falling back to the lower value keeps both sides non-empty.
                let mut threshold = (value + next_value) / 2.0;
                if threshold >= next_value {
                    threshold = value;
                }

                let impurity = weighted_gini(
                    &left_counts,
                    boundary + 1,
                    &right_counts,
                    total - boundary - 1,
                );
                if best.as_ref().map_or(true, |b| impurity < b.impurity) {
                    best = Some(SplitCandidate {
                        feature,
                        threshold,
                        impurity,
                    });
                }
            }
        }

        best
    }

    fn class_counts(&self, rows: &[usize]) -> Vec<usize> {
        let mut counts = vec![0usize; self.n_classes];
        for &row in rows {
            counts[self.labels[row]] += 1;
        }
        counts
    }

    fn push_leaf(&mut self, counts: &[usize]) -> usize {
        let class = majority_class(counts);
        let index = self.nodes.len();
        self.nodes.push(TreeNode::Leaf { class });
        index
    }
}

/// Distinct feature indices to consider for one split.
fn sample_features(feature_len: usize, n_candidates: usize, rng: &mut StdRng) -> Vec<usize> {
    if n_candidates >= feature_len {
        return (0..feature_len).collect();
    }
    rand::seq::index::sample(rng, feature_len, n_candidates).into_vec()
}

fn partition(
    features: &[&[f32]],
    rows: &[usize],
    feature: usize,
    threshold: f32,
) -> (Vec<usize>, Vec<usize>) {
    let mut left = Vec::new();
    let mut right = Vec::new();
    for &row in rows {
        if features[row][feature] <= threshold {
            left.push(row);
        } else {
            right.push(row);
        }
    }
    (left, right)
}

fn is_pure(counts: &[usize]) -> bool {
    counts.iter().filter(|&&count| count > 0).count() <= 1
}

/// Majority class, lowest index on ties. All-zero counts fall back to 0.
fn majority_class(counts: &[usize]) -> usize {
    let mut best = 0;
    for (class, &count) in counts.iter().enumerate() {
        if count > counts[best] {
            best = class;
        }
    }
    best
}

fn weighted_gini(left: &[usize], left_total: usize, right: &[usize], right_total: usize) -> f64 {
    let total = (left_total + right_total) as f64;
    (left_total as f64 / total) * gini(left, left_total)
        + (right_total as f64 / total) * gini(right, right_total)
}

fn gini(counts: &[usize], total: usize) -> f64 {
    if total == 0 {
        return 0.0;
    }
    let total = total as f64;
    1.0 - counts
        .iter()
        .map(|&count| {
            let p = count as f64 / total;
            p * p
        })
        .sum::<f64>()
}
