//! Parameter updates.
//!
//! Plain gradient descent with a fixed learning rate:
//!
//! ```text
//! W_l <- W_l - lr * dW_l
//! b_l <- b_l - lr * db_l
//! ```
//!
//! Updates are functional: they read the current `Parameters` and return a new
//! value, so a forward cache built from the old parameters stays consistent
//! until it is dropped.

use crate::{Error, Gradients, LayerParams, Parameters, Result};

pub(crate) fn check_learning_rate(lr: f64) -> Result<()> {
    if !(lr.is_finite() && lr > 0.0) {
        return Err(Error::InvalidConfig(format!(
            "learning rate must be finite and > 0, got {lr}"
        )));
    }
    Ok(())
}

/// One gradient-descent step.
pub fn update_parameters(params: &Parameters, grads: &Gradients, lr: f64) -> Result<Parameters> {
    check_learning_rate(lr)?;
    if grads.num_layers() != params.num_layers() {
        return Err(Error::ShapeMismatch(format!(
            "grads has {} layers, parameters have {}",
            grads.num_layers(),
            params.num_layers()
        )));
    }

    let mut layers = Vec::with_capacity(params.num_layers());
    for (idx, (layer, grad)) in params.layers().iter().zip(grads.layers()).enumerate() {
        if grad.d_weights.dim() != layer.weights.dim() || grad.d_biases.dim() != layer.biases.dim()
        {
            return Err(Error::ShapeMismatch(format!(
                "layer {} gradient shapes {:?}/{:?} do not match parameters {:?}/{:?}",
                idx + 1,
                grad.d_weights.dim(),
                grad.d_biases.dim(),
                layer.weights.dim(),
                layer.biases.dim()
            )));
        }

        let mut weights = layer.weights.clone();
        weights.scaled_add(-lr, &grad.d_weights);
        let mut biases = layer.biases.clone();
        biases.scaled_add(-lr, &grad.d_biases);
        layers.push(LayerParams { weights, biases });
    }

    Parameters::from_layers(layers)
}

/// Fixed learning-rate gradient descent, validated once.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Sgd {
    lr: f64,
}

impl Sgd {
    pub fn new(lr: f64) -> Result<Self> {
        check_learning_rate(lr)?;
        Ok(Self { lr })
    }

    #[inline]
    pub fn lr(&self) -> f64 {
        self.lr
    }

    #[inline]
    pub fn step(&self, params: &Parameters, grads: &Gradients) -> Result<Parameters> {
        update_parameters(params, grads, self.lr)
    }
}
