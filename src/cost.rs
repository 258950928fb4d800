//! Cost functions.
//!
//! The training objective is cross-entropy plus an L2 penalty on every weight
//! matrix:
//!
//! ```text
//! J = CE(AL, Y) + (lambda / 2m) * sum_l ||W_l||_F^2
//! ```
//!
//! The cross-entropy term depends on the output activation:
//!
//! - `Sigmoid`: `-(1/m) * sum[Y log AL + (1 - Y) log(1 - AL)]` over all units
//! - `Softmax`: `-(1/m) * sum[Y log AL]`
//!
//! `AL` is clamped into `[CLAMP_EPS, 1 - CLAMP_EPS]` before any log is taken, so
//! a saturated output never yields a non-finite cost.

use ndarray::Array2;
use tracing::debug;

use crate::{Error, OutputActivation, Parameters, Result};

/// Distance kept between probabilities and the ends of `[0, 1]`.
pub const CLAMP_EPS: f64 = 1e-12;

#[inline]
pub(crate) fn clamp_probability(p: f64) -> f64 {
    p.clamp(CLAMP_EPS, 1.0 - CLAMP_EPS)
}

pub(crate) fn check_targets(al: &Array2<f64>, y: &Array2<f64>) -> Result<usize> {
    if al.dim() != y.dim() {
        return Err(Error::ShapeMismatch(format!(
            "predictions shape {:?} does not match labels shape {:?}",
            al.dim(),
            y.dim()
        )));
    }
    let m = al.ncols();
    if m == 0 {
        return Err(Error::InvalidData("cost requires at least one example".to_owned()));
    }
    Ok(m)
}

pub(crate) fn check_lambda(lambda: f64) -> Result<()> {
    if !(lambda.is_finite() && lambda >= 0.0) {
        return Err(Error::InvalidConfig(format!(
            "lambda must be finite and >= 0, got {lambda}"
        )));
    }
    Ok(())
}

/// Unregularized cross-entropy, averaged over examples.
pub fn cross_entropy(al: &Array2<f64>, y: &Array2<f64>, output: OutputActivation) -> Result<f64> {
    let m = check_targets(al, y)?;

    let saturated = al
        .iter()
        .filter(|&&p| !(CLAMP_EPS..=1.0 - CLAMP_EPS).contains(&p))
        .count();
    if saturated > 0 {
        debug!(saturated, "clamped saturated output activations");
    }

    let mut sum = 0.0_f64;
    for (&p, &t) in al.iter().zip(y.iter()) {
        let p = clamp_probability(p);
        sum += match output {
            OutputActivation::Sigmoid => t * p.ln() + (1.0 - t) * (1.0 - p).ln(),
            OutputActivation::Softmax => t * p.ln(),
        };
    }

    Ok(-sum / m as f64)
}

/// `(lambda / 2m) * sum_l ||W_l||_F^2`.
pub fn l2_penalty(params: &Parameters, lambda: f64, m: usize) -> Result<f64> {
    check_lambda(lambda)?;
    if m == 0 {
        return Err(Error::InvalidData("penalty requires at least one example".to_owned()));
    }
    if lambda == 0.0 {
        return Ok(0.0);
    }
    Ok(lambda / (2.0 * m as f64) * params.squared_weight_norm())
}

/// Cross-entropy plus the L2 weight penalty.
pub fn compute_cost_with_l2(
    al: &Array2<f64>,
    y: &Array2<f64>,
    params: &Parameters,
    lambda: f64,
    output: OutputActivation,
) -> Result<f64> {
    check_lambda(lambda)?;
    let ce = cross_entropy(al, y, output)?;
    let penalty = l2_penalty(params, lambda, al.ncols())?;
    Ok(ce + penalty)
}
