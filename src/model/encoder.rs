// src/model/encoder.rs

//! Label encoding: class-label strings to dense indices and back.

use serde::{Deserialize, Serialize};

/// Bidirectional mapping between class labels and indices `0..n`.
///
/// Classes are stored sorted, so the assignment of indices is independent of
/// the order labels were seen in. Persisted next to the model so inference
/// can turn predicted indices back into the original strings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LabelEncoder {
    classes: Vec<String>,
}

impl LabelEncoder {
    /// Build an encoder over the distinct labels in `labels`.
    pub fn fit<S: AsRef<str>>(labels: &[S]) -> Self {
        let mut classes: Vec<String> = labels
            .iter()
            .map(|label| label.as_ref().to_string())
            .collect();
        classes.sort();
        classes.dedup();
        Self { classes }
    }

    /// Index of a known label.
    pub fn transform(&self, label: &str) -> Option<usize> {
        self.classes
            .binary_search_by(|class| class.as_str().cmp(label))
            .ok()
    }

    /// Label at a known index.
    pub fn inverse(&self, index: usize) -> Option<&str> {
        self.classes.get(index).map(|s| s.as_str())
    }

    /// All classes in index order.
    pub fn classes(&self) -> &[String] {
        &self.classes
    }

    pub fn len(&self) -> usize {
        self.classes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.classes.is_empty()
    }
}
