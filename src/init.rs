//! Parameter initialization.
//!
//! Weights use He/Kaiming scaling, `N(0, 1) * sqrt(2 / fan_in)`, which keeps
//! activation variance roughly constant through ReLU layers. Biases start at
//! zero.
//!
//! Randomness is always supplied by the caller (a seed or an RNG), never taken
//! from a process-wide generator.

use ndarray::Array2;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rand_distr::{Distribution, StandardNormal};
use tracing::debug;

use crate::{LayerParams, LayerSpec, Parameters, Result};

/// Initialize using a deterministic seed.
pub fn initialize_parameters_he_with_seed(spec: &LayerSpec, seed: u64) -> Result<Parameters> {
    let mut rng = StdRng::seed_from_u64(seed);
    initialize_parameters_he(spec, &mut rng)
}

/// Initialize using the provided RNG.
pub fn initialize_parameters_he<R: Rng + ?Sized>(
    spec: &LayerSpec,
    rng: &mut R,
) -> Result<Parameters> {
    let mut layers = Vec::with_capacity(spec.num_layers());
    for (fan_in, fan_out) in spec.layer_dims() {
        let scale = (2.0 / fan_in as f64).sqrt();
        let weights = Array2::from_shape_fn((fan_out, fan_in), |_| {
            let v: f64 = StandardNormal.sample(&mut *rng);
            v * scale
        });
        let biases = Array2::zeros((fan_out, 1));
        layers.push(LayerParams { weights, biases });
    }

    debug!(widths = ?spec.widths(), "initialized parameters (he)");
    Parameters::from_layers(layers)
}
