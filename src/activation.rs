//! Activation functions.
//!
//! A layer computes a pre-activation matrix `Z = W A_prev + b` and then applies an
//! activation element-wise (or column-wise, for softmax): `A = g(Z)`.
//!
//! Backward helpers take the upstream gradient `dA` together with the cached `Z`
//! and return `dZ = dA * g'(Z)`.

use ndarray::{Array2, Axis, Zip};
use serde::{Deserialize, Serialize};

/// Activation applied after a layer's linear transform.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Activation {
    Relu,
    Sigmoid,
    Softmax,
}

/// Final-layer activation.
///
/// Hidden layers are always ReLU. The output layer is either an independent
/// sigmoid per unit (multi-label reading of one-hot targets) or a softmax over
/// the units of each example (mutually exclusive classes).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutputActivation {
    #[default]
    Sigmoid,
    Softmax,
}

impl From<OutputActivation> for Activation {
    fn from(value: OutputActivation) -> Self {
        match value {
            OutputActivation::Sigmoid => Activation::Sigmoid,
            OutputActivation::Softmax => Activation::Softmax,
        }
    }
}

impl Activation {
    pub fn forward(self, z: &Array2<f64>) -> Array2<f64> {
        match self {
            Activation::Relu => relu(z),
            Activation::Sigmoid => sigmoid(z),
            Activation::Softmax => softmax(z),
        }
    }
}

#[inline]
fn sigmoid_scalar(x: f64) -> f64 {
    // Numerically stable sigmoid.
    if x >= 0.0 {
        let z = (-x).exp();
        1.0 / (1.0 + z)
    } else {
        let z = x.exp();
        z / (1.0 + z)
    }
}

pub fn sigmoid(z: &Array2<f64>) -> Array2<f64> {
    z.mapv(sigmoid_scalar)
}

pub fn relu(z: &Array2<f64>) -> Array2<f64> {
    z.mapv(|v| v.max(0.0))
}

/// Softmax over each column (one column per example).
pub fn softmax(z: &Array2<f64>) -> Array2<f64> {
    let mut out = z.clone();
    for mut col in out.axis_iter_mut(Axis(1)) {
        let max = col.fold(f64::NEG_INFINITY, |acc, &v| acc.max(v));
        col.mapv_inplace(|v| (v - max).exp());
        let sum = col.sum();
        col.mapv_inplace(|v| v / sum);
    }
    out
}

/// `dZ = dA * relu'(Z)`; the derivative at exactly zero is taken as zero.
pub fn relu_backward(d_a: &Array2<f64>, z: &Array2<f64>) -> Array2<f64> {
    let mut d_z = d_a.clone();
    Zip::from(&mut d_z).and(z).for_each(|dz, &zv| {
        if zv <= 0.0 {
            *dz = 0.0;
        }
    });
    d_z
}

/// `dZ = dA * s(Z) * (1 - s(Z))`.
pub fn sigmoid_backward(d_a: &Array2<f64>, z: &Array2<f64>) -> Array2<f64> {
    let mut d_z = d_a.clone();
    Zip::from(&mut d_z).and(z).for_each(|dz, &zv| {
        let s = sigmoid_scalar(zv);
        *dz *= s * (1.0 - s);
    });
    d_z
}
