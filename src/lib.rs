//! A deep feed-forward classifier trained by full-batch gradient descent.
//!
//! `rust-dnn` implements the classic `[LINEAR -> RELU] * (L - 1) -> LINEAR -> SIGMOID`
//! network with L2 weight regularization; the output layer can also be a softmax
//! (see [`OutputActivation`]). Gradients are derived by hand for each layer type.
//!
//! # Data layout and shapes
//!
//! - Scalars are `f64`.
//! - Matrices are [`ndarray::Array2`] with one example per column:
//!   - features `X`: `(num_features, num_examples)`
//!   - labels `Y`: `(num_classes, num_examples)`, one-hot
//! - Layer `l` has weights `(units_l, units_{l-1})` and biases `(units_l, 1)`.
//!
//! # Pipeline
//!
//! Each training iteration runs:
//!
//! - [`model_forward`] -> `AL` and a [`Cache`]
//! - [`compute_cost_with_l2`] -> scalar cost
//! - [`model_backward_with_l2`] -> [`Gradients`]
//! - [`update_parameters`] -> a new [`Parameters`] value
//!
//! [`Trainer`] and [`train`] drive the loop from a [`TrainConfig`].
//!
//! # Errors
//!
//! Shape and configuration problems are reported as [`Error`] before any
//! computation runs; nothing in the public API panics on bad input.
//!
//! # Quick start
//!
//! ```rust
//! use rust_dnn::{Dataset, OutputActivation, TrainConfig, change_to_multi_class, train};
//! use ndarray::Array2;
//!
//! # fn main() -> rust_dnn::Result<()> {
//! let x = Array2::from_shape_vec(
//!     (2, 4),
//!     vec![0.0, 0.1, 0.9, 1.0, 0.0, 0.2, 0.8, 1.0],
//! )
//! .unwrap();
//! let y = change_to_multi_class(&[0, 0, 1, 1], 2)?;
//! let data = Dataset::new(x, y)?;
//!
//! let report = train(
//!     &TrainConfig {
//!         layer_widths: vec![2, 4, 2],
//!         learning_rate: 0.1,
//!         iterations: 300,
//!         lambda: 0.1,
//!         report_every: 100,
//!         verbose: true,
//!         output_activation: OutputActivation::Sigmoid,
//!         seed: 1,
//!     },
//!     &data,
//! )?;
//! assert_eq!(report.costs.len(), 3);
//! # Ok(())
//! # }
//! ```

pub mod activation;
pub mod backward;
pub mod config;
pub mod cost;
pub mod data;
pub mod error;
pub mod forward;
pub mod init;
pub mod layer_spec;
pub mod metrics;
pub mod optim;
pub mod params;
pub mod serde_model;
pub mod train;

pub use activation::{Activation, OutputActivation};
pub use backward::{Gradients, LayerGradients, model_backward_with_l2};
pub use config::{load_config, parse_config};
pub use cost::{compute_cost_with_l2, cross_entropy, l2_penalty};
pub use data::{Dataset, RawDatasets, RawSplit, change_to_multi_class, load_datas, scale_pixels};
pub use error::{Error, Result};
pub use forward::{Cache, LayerCache, model_forward, predict};
pub use init::{initialize_parameters_he, initialize_parameters_he_with_seed};
pub use layer_spec::LayerSpec;
pub use metrics::{accuracy, evaluate_accuracy};
pub use optim::{Sgd, update_parameters};
pub use params::{LayerParams, Parameters};
pub use serde_model::{load_parameters, parameters_from_json, parameters_to_json, save_parameters};
pub use train::{CostSample, TrainConfig, TrainPhase, TrainReport, Trainer, train};
