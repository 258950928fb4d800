//! Metrics.
//!
//! Metrics are evaluation helpers (they do not participate in backprop).

use ndarray::Array2;

use crate::{Error, OutputActivation, Parameters, Result, predict};

/// Fraction of positions where `predicted` equals `expected`.
pub fn accuracy(predicted: &[usize], expected: &[usize]) -> Result<f64> {
    if predicted.len() != expected.len() {
        return Err(Error::ShapeMismatch(format!(
            "{} predictions but {} labels",
            predicted.len(),
            expected.len()
        )));
    }
    if predicted.is_empty() {
        return Err(Error::InvalidData("accuracy needs at least one example".to_owned()));
    }
    let correct = predicted
        .iter()
        .zip(expected)
        .filter(|(p, e)| p == e)
        .count();
    Ok(correct as f64 / predicted.len() as f64)
}

/// Classification accuracy of `params` on features `x` with class indices `labels`.
pub fn evaluate_accuracy(
    x: &Array2<f64>,
    labels: &[usize],
    params: &Parameters,
    output: OutputActivation,
) -> Result<f64> {
    let preds = predict(x, params, output)?;
    accuracy(&preds, labels)
}
