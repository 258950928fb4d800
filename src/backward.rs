//! Backward propagation with L2 regularization.
//!
//! For each layer, from output to input:
//!
//! ```text
//! dW_l     = (1/m) dZ_l A_{l-1}^T + (lambda/m) W_l
//! db_l     = (1/m) sum_examples dZ_l
//! dA_{l-1} = W_l^T dZ_l
//! dZ_{l-1} = dA_{l-1} * relu'(Z_{l-1})
//! ```
//!
//! The output error depends on the final activation. With a sigmoid output,
//! `dAL = -(Y / AL) + (1 - Y) / (1 - AL)` is formed on clamped `AL` and multiplied
//! by `sigmoid'(Z_L)`. With a softmax output the Jacobian folds into the
//! categorical cross-entropy and `dZ_L = AL - Y`.

use ndarray::{Array2, Axis, Zip};

use crate::activation::{relu_backward, sigmoid_backward};
use crate::cost::{check_lambda, check_targets, clamp_probability};
use crate::forward::Cache;
use crate::{Error, OutputActivation, Parameters, Result};

#[derive(Debug, Clone, PartialEq)]
pub struct LayerGradients {
    /// Same shape as the layer weights.
    pub d_weights: Array2<f64>,
    /// Same shape as the layer biases, `(units, 1)`.
    pub d_biases: Array2<f64>,
}

/// Parameter gradients, one entry per layer in the same order as `Parameters`.
#[derive(Debug, Clone, PartialEq)]
pub struct Gradients {
    layers: Vec<LayerGradients>,
}

impl Gradients {
    pub fn from_layers(layers: Vec<LayerGradients>) -> Self {
        Self { layers }
    }

    #[inline]
    pub fn num_layers(&self) -> usize {
        self.layers.len()
    }

    #[inline]
    pub fn layers(&self) -> &[LayerGradients] {
        &self.layers
    }

    /// Weight gradient of layer `layer_idx`, counted from zero.
    #[inline]
    pub fn d_weights(&self, layer_idx: usize) -> Option<&Array2<f64>> {
        self.layers.get(layer_idx).map(|g| &g.d_weights)
    }

    #[inline]
    pub fn d_biases(&self, layer_idx: usize) -> Option<&Array2<f64>> {
        self.layers.get(layer_idx).map(|g| &g.d_biases)
    }
}

/// `dL/dZ_L` for the output layer.
fn output_error(
    al: &Array2<f64>,
    y: &Array2<f64>,
    z_last: &Array2<f64>,
    output: OutputActivation,
) -> Array2<f64> {
    match output {
        OutputActivation::Sigmoid => {
            let mut d_al = Array2::zeros(al.raw_dim());
            Zip::from(&mut d_al)
                .and(al)
                .and(y)
                .for_each(|d, &p, &t| {
                    let p = clamp_probability(p);
                    *d = -(t / p) + (1.0 - t) / (1.0 - p);
                });
            sigmoid_backward(&d_al, z_last)
        }
        OutputActivation::Softmax => al - y,
    }
}

/// Gradients of the L2-regularized cost with respect to every parameter.
///
/// `cache` must come from `model_forward` on `params`; neither is modified.
pub fn model_backward_with_l2(
    al: &Array2<f64>,
    y: &Array2<f64>,
    cache: &Cache,
    params: &Parameters,
    lambda: f64,
    output: OutputActivation,
) -> Result<Gradients> {
    check_lambda(lambda)?;
    let m = check_targets(al, y)?;
    if cache.len() != params.num_layers() {
        return Err(Error::ShapeMismatch(format!(
            "cache has {} layers, parameters have {}",
            cache.len(),
            params.num_layers()
        )));
    }
    if cache.num_examples() != m {
        return Err(Error::ShapeMismatch(format!(
            "cache was computed on {} examples, labels have {m}",
            cache.num_examples()
        )));
    }
    if al.nrows() != params.output_dim() {
        return Err(Error::ShapeMismatch(format!(
            "predictions have {} rows, output layer has {} units",
            al.nrows(),
            params.output_dim()
        )));
    }
    for (idx, (layer_cache, layer)) in cache.layers().iter().zip(params.layers()).enumerate() {
        let input_ok = layer_cache.input.dim() == (layer.in_dim(), m);
        let linear_ok = layer_cache.linear.dim() == (layer.out_dim(), m);
        if !(input_ok && linear_ok) {
            return Err(Error::ShapeMismatch(format!(
                "layer {} cache shapes {:?}/{:?} do not match weights {:?}",
                idx + 1,
                layer_cache.input.dim(),
                layer_cache.linear.dim(),
                layer.weights.dim()
            )));
        }
    }

    let inv_m = 1.0 / m as f64;
    let reg = lambda * inv_m;
    let num_layers = params.num_layers();
    let mut grads = Vec::with_capacity(num_layers);

    let last = &cache.layers()[num_layers - 1];
    let mut d_z = output_error(al, y, &last.linear, output);

    for idx in (0..num_layers).rev() {
        let layer_cache = &cache.layers()[idx];
        let layer = &params.layers()[idx];

        let mut d_weights = d_z.dot(&layer_cache.input.t()) * inv_m;
        if reg != 0.0 {
            d_weights.scaled_add(reg, &layer.weights);
        }
        let d_biases = d_z.sum_axis(Axis(1)).insert_axis(Axis(1)) * inv_m;

        if idx > 0 {
            let d_a_prev = layer.weights.t().dot(&d_z);
            d_z = relu_backward(&d_a_prev, &cache.layers()[idx - 1].linear);
        }

        grads.push(LayerGradients {
            d_weights,
            d_biases,
        });
    }

    grads.reverse();
    Ok(Gradients::from_layers(grads))
}
