//! Network parameters.
//!
//! Layer `l` owns a weight matrix of shape `(units_l, units_{l-1})` and a bias
//! column of shape `(units_l, 1)`. `Parameters` is only built through
//! `from_layers`, so every value in circulation has chaining shapes.

use ndarray::Array2;

use crate::{Error, LayerSpec, Result};

#[derive(Debug, Clone, PartialEq)]
pub struct LayerParams {
    /// Shape `(units, fan_in)`.
    pub weights: Array2<f64>,
    /// Shape `(units, 1)`; broadcast across examples.
    pub biases: Array2<f64>,
}

impl LayerParams {
    #[inline]
    pub fn in_dim(&self) -> usize {
        self.weights.ncols()
    }

    #[inline]
    pub fn out_dim(&self) -> usize {
        self.weights.nrows()
    }
}

/// Weights and biases for every layer of a network.
///
/// Entry `i` holds layer `i + 1`. Values are never updated in place: training
/// produces a fresh `Parameters` each iteration.
#[derive(Debug, Clone, PartialEq)]
pub struct Parameters {
    layers: Vec<LayerParams>,
}

impl Parameters {
    /// Assemble parameters, checking that consecutive layers chain.
    pub fn from_layers(layers: Vec<LayerParams>) -> Result<Self> {
        if layers.is_empty() {
            return Err(Error::InvalidConfig(
                "parameters must have at least one layer".to_owned(),
            ));
        }
        for (idx, layer) in layers.iter().enumerate() {
            if layer.biases.dim() != (layer.out_dim(), 1) {
                return Err(Error::ShapeMismatch(format!(
                    "layer {} biases shape {:?} does not match ({}, 1)",
                    idx + 1,
                    layer.biases.dim(),
                    layer.out_dim()
                )));
            }
            if layer.in_dim() == 0 || layer.out_dim() == 0 {
                return Err(Error::ShapeMismatch(format!(
                    "layer {} weights shape {:?} has an empty axis",
                    idx + 1,
                    layer.weights.dim()
                )));
            }
            if idx > 0 {
                let prev_out = layers[idx - 1].out_dim();
                if layer.in_dim() != prev_out {
                    return Err(Error::ShapeMismatch(format!(
                        "layer {} in_dim {} does not match previous out_dim {}",
                        idx + 1,
                        layer.in_dim(),
                        prev_out
                    )));
                }
            }
        }
        Ok(Self { layers })
    }

    #[inline]
    pub fn num_layers(&self) -> usize {
        self.layers.len()
    }

    #[inline]
    pub fn input_dim(&self) -> usize {
        self.layers[0].in_dim()
    }

    #[inline]
    pub fn output_dim(&self) -> usize {
        self.layers[self.layers.len() - 1].out_dim()
    }

    #[inline]
    pub fn layers(&self) -> &[LayerParams] {
        &self.layers
    }

    /// Layer `idx` counted from zero.
    #[inline]
    pub fn layer(&self, idx: usize) -> Option<&LayerParams> {
        self.layers.get(idx)
    }

    /// Recover the width sequence these parameters were built for.
    pub fn widths(&self) -> Vec<usize> {
        let mut widths = Vec::with_capacity(self.layers.len() + 1);
        widths.push(self.input_dim());
        widths.extend(self.layers.iter().map(LayerParams::out_dim));
        widths
    }

    /// True if the layer shapes match `spec`.
    pub fn matches(&self, spec: &LayerSpec) -> bool {
        self.widths() == spec.widths()
    }

    /// Sum of squared entries over every weight matrix (biases excluded).
    pub fn squared_weight_norm(&self) -> f64 {
        self.layers
            .iter()
            .map(|l| l.weights.iter().map(|w| w * w).sum::<f64>())
            .sum()
    }
}
