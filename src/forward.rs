//! Forward propagation.
//!
//! The network is `[LINEAR -> RELU] * (L - 1) -> LINEAR -> OUTPUT`, where the
//! output activation is a per-unit sigmoid or a column-wise softmax.
//!
//! Inputs are laid out with one example per column: `X` has shape
//! `(features, examples)` and every intermediate keeps `examples` columns.

use ndarray::{Array2, Axis};

use crate::activation::Activation;
use crate::{Error, LayerParams, OutputActivation, Parameters, Result};

/// Intermediates recorded for one layer during a forward pass.
#[derive(Debug, Clone)]
pub struct LayerCache {
    /// Activation fed into the layer, `A_{l-1}`.
    pub input: Array2<f64>,
    /// Pre-activation `Z_l = W_l A_{l-1} + b_l`.
    pub linear: Array2<f64>,
    /// Post-activation `A_l = g(Z_l)`.
    pub output: Array2<f64>,
}

/// Per-layer intermediates from one forward pass, ordered input to output.
///
/// A cache is consumed by exactly one backward pass.
#[derive(Debug, Clone)]
pub struct Cache {
    layers: Vec<LayerCache>,
}

impl Cache {
    #[inline]
    pub fn len(&self) -> usize {
        self.layers.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.layers.is_empty()
    }

    #[inline]
    pub fn layers(&self) -> &[LayerCache] {
        &self.layers
    }

    /// Number of examples (columns) the cache was computed on.
    #[inline]
    pub fn num_examples(&self) -> usize {
        self.layers.first().map(|l| l.input.ncols()).unwrap_or(0)
    }
}

/// `Z = W A_prev + b`, with `b` broadcast over the example columns.
pub fn linear_forward(a_prev: &Array2<f64>, layer: &LayerParams) -> Array2<f64> {
    layer.weights.dot(a_prev) + &layer.biases
}

/// Linear step followed by `activation`.
pub fn linear_activation_forward(
    a_prev: &Array2<f64>,
    layer: &LayerParams,
    activation: Activation,
) -> LayerCache {
    let linear = linear_forward(a_prev, layer);
    let output = activation.forward(&linear);
    LayerCache {
        input: a_prev.clone(),
        linear,
        output,
    }
}

/// Run the full layer stack.
///
/// Returns the final activation `AL` with shape `(output_dim, examples)` and a
/// cache with one entry per layer.
pub fn model_forward(
    x: &Array2<f64>,
    params: &Parameters,
    output: OutputActivation,
) -> Result<(Array2<f64>, Cache)> {
    if x.nrows() != params.input_dim() {
        return Err(Error::ShapeMismatch(format!(
            "input has {} features, model input_dim is {}",
            x.nrows(),
            params.input_dim()
        )));
    }
    if x.ncols() == 0 {
        return Err(Error::InvalidData("input has no examples".to_owned()));
    }

    let last = params.num_layers() - 1;
    let mut layers = Vec::with_capacity(params.num_layers());
    for (idx, layer) in params.layers().iter().enumerate() {
        let activation = if idx == last {
            Activation::from(output)
        } else {
            Activation::Relu
        };
        let a_prev = layers.last().map_or(x, |prev: &LayerCache| &prev.output);
        let cache = linear_activation_forward(a_prev, layer, activation);
        layers.push(cache);
    }

    let al = layers[last].output.clone();
    Ok((al, Cache { layers }))
}

/// Predicted class per example: the arg-max over output units.
pub fn predict(
    x: &Array2<f64>,
    params: &Parameters,
    output: OutputActivation,
) -> Result<Vec<usize>> {
    let (al, _cache) = model_forward(x, params, output)?;
    let preds = al
        .axis_iter(Axis(1))
        .map(|col| {
            col.iter()
                .enumerate()
                .fold((0, f64::NEG_INFINITY), |best, (i, &v)| {
                    if v > best.1 { (i, v) } else { best }
                })
                .0
        })
        .collect();
    Ok(preds)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{LayerSpec, initialize_parameters_he_with_seed};
    use approx::assert_abs_diff_eq;
    use ndarray::array;

    fn hand_params() -> Parameters {
        let hidden = LayerParams {
            weights: array![[1.0, -1.0], [0.5, 0.5]],
            biases: array![[0.0], [-1.0]],
        };
        let out = LayerParams {
            weights: array![[2.0, -3.0]],
            biases: array![[0.5]],
        };
        Parameters::from_layers(vec![hidden, out]).unwrap()
    }

    #[test]
    fn matches_hand_computation() {
        let x = array![[1.0, 0.0], [0.0, 4.0]];
        let (al, cache) = model_forward(&x, &hand_params(), OutputActivation::Sigmoid).unwrap();

        // Column 0: z1 = [1, -0.5] -> a1 = [1, 0]; z2 = 2.5
        // Column 1: z1 = [-4, 1]   -> a1 = [0, 1]; z2 = -2.5
        assert_eq!(cache.layers()[0].linear, array![[1.0, -4.0], [-0.5, 1.0]]);
        assert_eq!(cache.layers()[0].output, array![[1.0, 0.0], [0.0, 1.0]]);
        assert_eq!(cache.layers()[1].linear, array![[2.5, -2.5]]);

        let s = 1.0 / (1.0 + (-2.5_f64).exp());
        assert_abs_diff_eq!(al[[0, 0]], s, epsilon = 1e-12);
        assert_abs_diff_eq!(al[[0, 1]], 1.0 - s, epsilon = 1e-12);
    }

    #[test]
    fn output_shape_and_cache_length_follow_layer_widths() {
        for widths in [vec![3, 1], vec![3, 4, 1], vec![6, 5, 4, 3, 2]] {
            let spec = LayerSpec::new(widths).unwrap();
            let params = initialize_parameters_he_with_seed(&spec, 0).unwrap();
            let x = Array2::from_elem((spec.input_dim(), 7), 0.3);
            let (al, cache) = model_forward(&x, &params, OutputActivation::Softmax).unwrap();
            assert_eq!(al.dim(), (spec.output_dim(), 7));
            assert_eq!(cache.len(), spec.num_layers());
            assert_eq!(cache.num_examples(), 7);
        }
    }

    #[test]
    fn rejects_feature_count_mismatch() {
        let x = Array2::<f64>::zeros((3, 2));
        let err = model_forward(&x, &hand_params(), OutputActivation::Sigmoid).unwrap_err();
        assert!(matches!(err, Error::ShapeMismatch(_)));
    }

    #[test]
    fn predict_takes_argmax_per_column() {
        let layer = LayerParams {
            weights: array![[1.0, 0.0], [0.0, 1.0], [-1.0, -1.0]],
            biases: Array2::zeros((3, 1)),
        };
        let params = Parameters::from_layers(vec![layer]).unwrap();
        let x = array![[2.0, 0.0, -1.0], [0.0, 2.0, -1.0]];
        let preds = predict(&x, &params, OutputActivation::Softmax).unwrap();
        assert_eq!(preds, vec![0, 1, 2]);
    }
}
