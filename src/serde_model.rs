//! On-disk format for trained parameters.
//!
//! Files are JSON tagged with `format_version`. Each layer stores its dims and
//! flat row-major weights, never `ndarray`'s own encoding. Loading rejects an
//! unknown version, inconsistent lengths or dims, and non-finite values.

use std::path::Path;

use ndarray::Array2;
use serde::{Deserialize, Serialize};

use crate::{Error, LayerParams, OutputActivation, Parameters, Result};

pub const PARAMS_FORMAT_VERSION: u32 = 1;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SerializedParameters {
    pub format_version: u32,
    pub output_activation: OutputActivation,
    pub layers: Vec<SerializedLayer>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SerializedLayer {
    pub in_dim: usize,
    pub out_dim: usize,
    /// Row-major (out_dim, in_dim).
    pub weights: Vec<f64>,
    pub biases: Vec<f64>,
}

impl SerializedParameters {
    pub fn new(params: &Parameters, output: OutputActivation) -> Self {
        Self {
            format_version: PARAMS_FORMAT_VERSION,
            output_activation: output,
            layers: params.layers().iter().map(SerializedLayer::from).collect(),
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.format_version != PARAMS_FORMAT_VERSION {
            return Err(Error::InvalidData(format!(
                "unsupported parameters format_version {}; expected {}",
                self.format_version, PARAMS_FORMAT_VERSION
            )));
        }
        if self.layers.is_empty() {
            return Err(Error::InvalidData(
                "serialized parameters must have at least one layer".to_owned(),
            ));
        }

        for (i, layer) in self.layers.iter().enumerate() {
            layer
                .validate()
                .map_err(|e| Error::InvalidData(format!("layer {} invalid: {e}", i + 1)))?;

            if i > 0 {
                let prev_out = self.layers[i - 1].out_dim;
                if layer.in_dim != prev_out {
                    return Err(Error::InvalidData(format!(
                        "layer {} in_dim {} does not match previous out_dim {}",
                        i + 1,
                        layer.in_dim,
                        prev_out
                    )));
                }
            }
        }

        Ok(())
    }

    /// Validate and rebuild in-memory parameters.
    pub fn into_parameters(self) -> Result<(Parameters, OutputActivation)> {
        self.validate()?;
        let output = self.output_activation;

        let mut layers = Vec::with_capacity(self.layers.len());
        for layer in self.layers {
            let weights = Array2::from_shape_vec((layer.out_dim, layer.in_dim), layer.weights)
                .map_err(|e| Error::InvalidData(format!("weights: {e}")))?;
            let biases = Array2::from_shape_vec((layer.out_dim, 1), layer.biases)
                .map_err(|e| Error::InvalidData(format!("biases: {e}")))?;
            layers.push(LayerParams { weights, biases });
        }

        Ok((Parameters::from_layers(layers)?, output))
    }
}

impl SerializedLayer {
    fn validate(&self) -> Result<()> {
        if self.in_dim == 0 || self.out_dim == 0 {
            return Err(Error::InvalidData(format!(
                "empty layer: in_dim={} out_dim={}",
                self.in_dim, self.out_dim
            )));
        }

        let expected_w = self
            .in_dim
            .checked_mul(self.out_dim)
            .ok_or_else(|| Error::InvalidData("layer weight shape overflow".to_owned()))?;
        if self.weights.len() != expected_w {
            return Err(Error::InvalidData(format!(
                "{} weights for a {}x{} layer",
                self.weights.len(),
                self.out_dim,
                self.in_dim
            )));
        }
        if self.biases.len() != self.out_dim {
            return Err(Error::InvalidData(format!(
                "{} biases for {} units",
                self.biases.len(),
                self.out_dim
            )));
        }

        if let Some(v) = self.weights.iter().chain(&self.biases).find(|v| !v.is_finite()) {
            return Err(Error::InvalidData(format!("non-finite parameter value {v}")));
        }

        Ok(())
    }
}

impl From<&LayerParams> for SerializedLayer {
    fn from(layer: &LayerParams) -> Self {
        Self {
            in_dim: layer.in_dim(),
            out_dim: layer.out_dim(),
            // `iter` walks in logical row-major order regardless of memory layout.
            weights: layer.weights.iter().copied().collect(),
            biases: layer.biases.iter().copied().collect(),
        }
    }
}

/// Serialize parameters to a pretty-printed JSON string.
pub fn parameters_to_json(params: &Parameters, output: OutputActivation) -> Result<String> {
    let ser = SerializedParameters::new(params, output);
    serde_json::to_string_pretty(&ser)
        .map_err(|e| Error::Persistence(format!("failed to serialize parameters: {e}")))
}

/// Parse parameters from a JSON string.
pub fn parameters_from_json(s: &str) -> Result<(Parameters, OutputActivation)> {
    let ser: SerializedParameters = serde_json::from_str(s)
        .map_err(|e| Error::InvalidData(format!("failed to parse parameters json: {e}")))?;
    ser.into_parameters()
}

/// Save parameters to a JSON file (pretty-printed).
pub fn save_parameters<P: AsRef<Path>>(
    path: P,
    params: &Parameters,
    output: OutputActivation,
) -> Result<()> {
    let s = parameters_to_json(params, output)?;
    let p = path.as_ref();
    std::fs::write(p, s)
        .map_err(|e| Error::Persistence(format!("failed to write {}: {e}", p.display())))?;
    Ok(())
}

/// Load parameters from a JSON file.
pub fn load_parameters<P: AsRef<Path>>(path: P) -> Result<(Parameters, OutputActivation)> {
    let p = path.as_ref();
    let s = std::fs::read_to_string(p)
        .map_err(|e| Error::Persistence(format!("failed to read {}: {e}", p.display())))?;
    parameters_from_json(&s)
}
