// src/dataset.rs

//! Dataset discovery over a directory-per-class image tree.
//!
//! The expected layout is one subdirectory per class, each holding image
//! files:
//!
//! ```text
//! dataset/
//!   cats/   cat1.png  cat2.jpg
//!   dogs/   dog1.jpeg dog2.bmp
//! ```
//!
//! The subdirectory name *is* the class label. Loose files directly under the
//! root carry no label and are skipped, as is anything without a recognised
//! image extension. Directory entries are visited in sorted order so the
//! sample list (and everything seeded from it) is reproducible across
//! platforms.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::errors::Result;

/// Image extensions accepted by the loader, compared case-insensitively.
pub const IMAGE_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "bmp"];

/// One labelled sample: an image path and the class it belongs to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sample {
    pub path: PathBuf,
    pub label: String,
}

/// Discover all samples under `root`.
///
/// Returns an empty vector (not an error) when the tree holds no usable
/// images; the caller decides whether an empty dataset is fatal.
pub fn load_dataset(root: &Path) -> Result<Vec<Sample>> {
    let mut samples = Vec::new();

    for class_dir in sorted_entries(root)? {
        if !class_dir.is_dir() {
            continue;
        }
        let Some(label) = dir_name(&class_dir) else {
            continue;
        };

        for entry in sorted_entries(&class_dir)? {
            if entry.is_file() && has_image_extension(&entry) {
                debug!(path = ?entry, label = %label, "discovered sample");
                samples.push(Sample {
                    path: entry,
                    label: label.clone(),
                });
            }
        }
    }

    Ok(samples)
}

fn sorted_entries(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut entries = Vec::new();
    for entry in fs::read_dir(dir)? {
        entries.push(entry?.path());
    }
    entries.sort();
    Ok(entries)
}

fn dir_name(path: &Path) -> Option<String> {
    path.file_name().map(|name| name.to_string_lossy().into_owned())
}

fn has_image_extension(path: &Path) -> bool {
    path.extension()
        .map(|ext| {
            let ext = ext.to_string_lossy().to_lowercase();
            IMAGE_EXTENSIONS.iter().any(|allowed| *allowed == ext)
        })
        .unwrap_or(false)
}
