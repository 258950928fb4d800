//! Dataset helpers.
//!
//! Training operates on whole matrices with one example per column:
//!
//! - features `X`: `(num_features, num_examples)`, scaled into `[0, 1]`
//! - labels `Y`: `(num_classes, num_examples)`, one-hot
//!
//! Raw data arrives as rows of `u8` pixels (one row per example) plus integer
//! class labels; `Dataset::from_raw` performs the transpose, scaling, and one-hot
//! encoding.

use std::path::Path;

use ndarray::{Array2, Axis};
use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// One-hot encode class indices into a `(num_classes, labels.len())` matrix.
pub fn change_to_multi_class(labels: &[usize], num_classes: usize) -> Result<Array2<f64>> {
    if num_classes == 0 {
        return Err(Error::InvalidData("num_classes must be > 0".to_owned()));
    }
    if let Some((idx, &label)) = labels.iter().enumerate().find(|(_, l)| **l >= num_classes) {
        return Err(Error::InvalidData(format!(
            "label {label} at index {idx} is out of range for {num_classes} classes"
        )));
    }

    let mut y = Array2::zeros((num_classes, labels.len()));
    for (col, &label) in labels.iter().enumerate() {
        y[[label, col]] = 1.0;
    }
    Ok(y)
}

/// Scale raw 8-bit values into `[0, 1]`.
pub fn scale_pixels(raw: &Array2<u8>) -> Array2<f64> {
    raw.mapv(|v| f64::from(v) / 255.0)
}

/// One split of raw data as stored on disk.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawSplit {
    /// One row per example.
    pub pixels: Vec<Vec<u8>>,
    pub labels: Vec<usize>,
}

impl RawSplit {
    /// Pixels as a `(num_examples, num_features)` matrix.
    pub fn pixel_matrix(&self) -> Result<Array2<u8>> {
        let rows = self.pixels.len();
        let cols = self.pixels.first().map(Vec::len).unwrap_or(0);
        if let Some((i, row)) = self.pixels.iter().enumerate().find(|(_, r)| r.len() != cols) {
            return Err(Error::InvalidData(format!(
                "pixel row {i} has len {}, expected {cols}",
                row.len()
            )));
        }
        let flat: Vec<u8> = self.pixels.iter().flatten().copied().collect();
        Array2::from_shape_vec((rows, cols), flat)
            .map_err(|e| Error::InvalidData(format!("pixel matrix: {e}")))
    }
}

/// Train and test splits plus the class count.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawDatasets {
    pub num_classes: usize,
    pub train: RawSplit,
    pub test: RawSplit,
}

/// Read raw train/test splits from a JSON file.
pub fn load_datas<P: AsRef<Path>>(path: P) -> Result<RawDatasets> {
    let p = path.as_ref();
    let s = std::fs::read_to_string(p)
        .map_err(|e| Error::Persistence(format!("failed to read {}: {e}", p.display())))?;
    serde_json::from_str(&s)
        .map_err(|e| Error::InvalidData(format!("failed to parse {}: {e}", p.display())))
}

/// Features and one-hot labels for full-batch training.
#[derive(Debug, Clone)]
pub struct Dataset {
    features: Array2<f64>,
    labels: Array2<f64>,
}

impl Dataset {
    /// Validate and wrap a feature/label pair.
    ///
    /// Column counts must match, features must lie in `[0, 1]`, and every label
    /// column must be one-hot.
    pub fn new(features: Array2<f64>, labels: Array2<f64>) -> Result<Self> {
        if features.ncols() != labels.ncols() {
            return Err(Error::ShapeMismatch(format!(
                "features have {} examples, labels have {}",
                features.ncols(),
                labels.ncols()
            )));
        }
        if features.ncols() == 0 {
            return Err(Error::InvalidData("dataset must not be empty".to_owned()));
        }
        if features.nrows() == 0 || labels.nrows() == 0 {
            return Err(Error::InvalidData(
                "features and labels need at least one row".to_owned(),
            ));
        }
        if let Some(v) = features.iter().find(|v| !(0.0..=1.0).contains(*v)) {
            return Err(Error::InvalidData(format!(
                "features must be scaled into [0, 1], found {v}"
            )));
        }
        for (col, column) in labels.axis_iter(Axis(1)).enumerate() {
            let ones = column.iter().filter(|&&v| v == 1.0).count();
            let zeros = column.iter().filter(|&&v| v == 0.0).count();
            if ones != 1 || ones + zeros != column.len() {
                return Err(Error::InvalidData(format!(
                    "label column {col} is not one-hot"
                )));
            }
        }

        Ok(Self { features, labels })
    }

    /// Transpose, scale, and one-hot encode a raw split.
    pub fn from_raw(raw: &RawSplit, num_classes: usize) -> Result<Self> {
        if raw.pixels.len() != raw.labels.len() {
            return Err(Error::ShapeMismatch(format!(
                "{} pixel rows but {} labels",
                raw.pixels.len(),
                raw.labels.len()
            )));
        }
        let pixels = raw.pixel_matrix()?;
        let features = scale_pixels(&pixels).reversed_axes();
        let labels = change_to_multi_class(&raw.labels, num_classes)?;
        Self::new(features, labels)
    }

    #[inline]
    pub fn features(&self) -> &Array2<f64> {
        &self.features
    }

    #[inline]
    pub fn labels(&self) -> &Array2<f64> {
        &self.labels
    }

    #[inline]
    pub fn num_examples(&self) -> usize {
        self.features.ncols()
    }

    #[inline]
    pub fn num_features(&self) -> usize {
        self.features.nrows()
    }

    #[inline]
    pub fn num_classes(&self) -> usize {
        self.labels.nrows()
    }

    /// Class index of every example.
    pub fn class_indices(&self) -> Vec<usize> {
        self.labels
            .axis_iter(Axis(1))
            .map(|col| col.iter().position(|&v| v == 1.0).unwrap_or(0))
            .collect()
    }
}
