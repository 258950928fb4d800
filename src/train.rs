//! Full-batch training loop.
//!
//! Every iteration runs forward -> cost -> backward -> update on the whole
//! dataset. There is no early stopping: the loop always runs the configured
//! number of iterations.

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::backward::model_backward_with_l2;
use crate::cost::{check_lambda, compute_cost_with_l2};
use crate::forward::model_forward;
use crate::{
    Dataset, Error, LayerSpec, OutputActivation, Parameters, Result, Sgd,
    initialize_parameters_he_with_seed,
};

fn default_report_every() -> usize {
    100
}

fn default_verbose() -> bool {
    true
}

fn default_seed() -> u64 {
    1
}

/// Hyperparameters for one training run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrainConfig {
    /// Input feature count followed by every layer width.
    pub layer_widths: Vec<usize>,
    pub learning_rate: f64,
    pub iterations: usize,
    /// L2 regularization strength.
    pub lambda: f64,
    /// Cost sampling cadence, in iterations.
    #[serde(default = "default_report_every")]
    pub report_every: usize,
    /// Record (and log) a cost sample every `report_every` iterations.
    #[serde(default = "default_verbose")]
    pub verbose: bool,
    #[serde(default)]
    pub output_activation: OutputActivation,
    /// Seed for parameter initialization.
    #[serde(default = "default_seed")]
    pub seed: u64,
}

impl Default for TrainConfig {
    fn default() -> Self {
        Self {
            layer_widths: vec![784, 20, 7, 5, 3, 10],
            learning_rate: 0.003,
            iterations: 2000,
            lambda: 0.7,
            report_every: default_report_every(),
            verbose: default_verbose(),
            output_activation: OutputActivation::Sigmoid,
            seed: default_seed(),
        }
    }
}

impl TrainConfig {
    /// Check every field; returns the validated layer spec.
    pub fn validate(&self) -> Result<LayerSpec> {
        let spec = LayerSpec::new(self.layer_widths.clone())?;
        crate::optim::check_learning_rate(self.learning_rate)?;
        if self.iterations == 0 {
            return Err(Error::InvalidConfig("iterations must be > 0".to_owned()));
        }
        check_lambda(self.lambda)?;
        if self.report_every == 0 {
            return Err(Error::InvalidConfig("report_every must be > 0".to_owned()));
        }
        Ok(spec)
    }
}

/// A recorded `(iteration, cost)` pair.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CostSample {
    pub iteration: usize,
    pub cost: f64,
}

#[derive(Debug, Clone)]
pub struct TrainReport {
    pub parameters: Parameters,
    /// Samples in iteration order, every `report_every` iterations when verbose.
    pub costs: Vec<CostSample>,
    /// Cost computed in the last iteration (before its update).
    pub final_cost: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrainPhase {
    /// Parameters initialized, no iteration run yet.
    Initializing,
    Iterating,
    Done,
}

/// Drives training one iteration at a time.
#[derive(Debug)]
pub struct Trainer<'a> {
    config: TrainConfig,
    data: &'a Dataset,
    sgd: Sgd,
    params: Parameters,
    iteration: usize,
    costs: Vec<CostSample>,
    last_cost: Option<f64>,
    phase: TrainPhase,
}

impl<'a> Trainer<'a> {
    /// Validate `config` against `data` and initialize parameters.
    pub fn new(config: TrainConfig, data: &'a Dataset) -> Result<Self> {
        let spec = config.validate()?;
        if data.num_features() != spec.input_dim() {
            return Err(Error::ShapeMismatch(format!(
                "dataset has {} features, layer widths expect {}",
                data.num_features(),
                spec.input_dim()
            )));
        }
        if data.num_classes() != spec.output_dim() {
            return Err(Error::ShapeMismatch(format!(
                "dataset has {} label rows, output layer has {} units",
                data.num_classes(),
                spec.output_dim()
            )));
        }

        let sgd = Sgd::new(config.learning_rate)?;
        let params = initialize_parameters_he_with_seed(&spec, config.seed)?;
        debug!(
            widths = ?spec.widths(),
            examples = data.num_examples(),
            seed = config.seed,
            "trainer initialized"
        );

        Ok(Self {
            config,
            data,
            sgd,
            params,
            iteration: 0,
            costs: Vec::new(),
            last_cost: None,
            phase: TrainPhase::Initializing,
        })
    }

    #[inline]
    pub fn phase(&self) -> TrainPhase {
        self.phase
    }

    /// Number of iterations completed so far.
    #[inline]
    pub fn iteration(&self) -> usize {
        self.iteration
    }

    #[inline]
    pub fn parameters(&self) -> &Parameters {
        &self.params
    }

    #[inline]
    pub fn costs(&self) -> &[CostSample] {
        &self.costs
    }

    /// Run one iteration and return its cost, or `None` once all iterations ran.
    pub fn step(&mut self) -> Result<Option<f64>> {
        if self.phase == TrainPhase::Done {
            return Ok(None);
        }

        let cfg = &self.config;
        let x = self.data.features();
        let y = self.data.labels();

        let (al, cache) = model_forward(x, &self.params, cfg.output_activation)?;
        let cost = compute_cost_with_l2(&al, y, &self.params, cfg.lambda, cfg.output_activation)?;
        let grads = model_backward_with_l2(
            &al,
            y,
            &cache,
            &self.params,
            cfg.lambda,
            cfg.output_activation,
        )?;
        self.params = self.sgd.step(&self.params, &grads)?;

        let i = self.iteration;
        if cfg.verbose && i % cfg.report_every == 0 {
            info!(iteration = i, cost, "cost after iteration");
            self.costs.push(CostSample { iteration: i, cost });
        }

        self.iteration += 1;
        self.last_cost = Some(cost);
        self.phase = if self.iteration == cfg.iterations {
            TrainPhase::Done
        } else {
            TrainPhase::Iterating
        };
        Ok(Some(cost))
    }

    /// Run the remaining iterations and return the trained parameters.
    pub fn run(mut self) -> Result<TrainReport> {
        while self.step()?.is_some() {}

        let final_cost = self.last_cost.unwrap_or(f64::NAN);
        info!(
            iterations = self.iteration,
            final_cost, "training finished"
        );
        Ok(TrainReport {
            parameters: self.params,
            costs: self.costs,
            final_cost,
        })
    }
}

/// Initialize and train in one call.
pub fn train(config: &TrainConfig, data: &Dataset) -> Result<TrainReport> {
    info!(
        widths = ?config.layer_widths,
        learning_rate = config.learning_rate,
        iterations = config.iterations,
        lambda = config.lambda,
        output = ?config.output_activation,
        "starting training"
    );
    Trainer::new(config.clone(), data)?.run()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::change_to_multi_class;
    use ndarray::Array2;

    fn tiny_data() -> Dataset {
        let x = Array2::from_shape_fn((3, 6), |(i, j)| ((i + 2 * j) % 5) as f64 / 4.0);
        let y = change_to_multi_class(&[0, 1, 0, 1, 0, 1], 2).unwrap();
        Dataset::new(x, y).unwrap()
    }

    fn tiny_config() -> TrainConfig {
        TrainConfig {
            layer_widths: vec![3, 4, 2],
            learning_rate: 0.1,
            iterations: 250,
            lambda: 0.0,
            report_every: 100,
            verbose: true,
            output_activation: OutputActivation::Sigmoid,
            seed: 1,
        }
    }

    #[test]
    fn default_config_mirrors_reference_constants() {
        let cfg = TrainConfig::default();
        assert_eq!(cfg.layer_widths, vec![784, 20, 7, 5, 3, 10]);
        assert_eq!(cfg.iterations, 2000);
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn validate_rejects_degenerate_values() {
        let base = tiny_config();
        let cases = [
            TrainConfig { layer_widths: vec![3], ..base.clone() },
            TrainConfig { layer_widths: vec![3, 0, 2], ..base.clone() },
            TrainConfig { learning_rate: 0.0, ..base.clone() },
            TrainConfig { learning_rate: -0.1, ..base.clone() },
            TrainConfig { iterations: 0, ..base.clone() },
            TrainConfig { lambda: -1.0, ..base.clone() },
            TrainConfig { report_every: 0, ..base.clone() },
        ];
        for cfg in cases {
            assert!(
                matches!(cfg.validate(), Err(Error::InvalidConfig(_))),
                "{cfg:?}"
            );
        }
    }

    #[test]
    fn trainer_rejects_mismatched_dataset() {
        let data = tiny_data();
        let cfg = TrainConfig {
            layer_widths: vec![5, 4, 2],
            ..tiny_config()
        };
        assert!(matches!(
            Trainer::new(cfg, &data),
            Err(Error::ShapeMismatch(_))
        ));
        let cfg = TrainConfig {
            layer_widths: vec![3, 4, 3],
            ..tiny_config()
        };
        assert!(matches!(
            Trainer::new(cfg, &data),
            Err(Error::ShapeMismatch(_))
        ));
    }

    #[test]
    fn phases_advance_and_loop_runs_every_iteration() {
        let data = tiny_data();
        let cfg = TrainConfig {
            iterations: 3,
            ..tiny_config()
        };
        let mut trainer = Trainer::new(cfg, &data).unwrap();
        assert_eq!(trainer.phase(), TrainPhase::Initializing);
        assert!(trainer.step().unwrap().is_some());
        assert_eq!(trainer.phase(), TrainPhase::Iterating);
        trainer.step().unwrap();
        trainer.step().unwrap();
        assert_eq!(trainer.phase(), TrainPhase::Done);
        assert_eq!(trainer.iteration(), 3);
        assert!(trainer.step().unwrap().is_none());
        assert_eq!(trainer.iteration(), 3);
    }

    #[test]
    fn costs_are_sampled_on_cadence() {
        let data = tiny_data();
        let report = train(&tiny_config(), &data).unwrap();
        let iters: Vec<_> = report.costs.iter().map(|s| s.iteration).collect();
        assert_eq!(iters, vec![0, 100, 200]);
        assert!(report.costs.iter().all(|s| s.cost.is_finite() && s.cost >= 0.0));

        let quiet = TrainConfig {
            verbose: false,
            ..tiny_config()
        };
        let report = train(&quiet, &data).unwrap();
        assert!(report.costs.is_empty());
        assert!(report.final_cost.is_finite());
    }

    #[test]
    fn same_seed_same_result() {
        let data = tiny_data();
        let a = train(&tiny_config(), &data).unwrap();
        let b = train(&tiny_config(), &data).unwrap();
        assert_eq!(a.parameters, b.parameters);
        assert_eq!(a.costs, b.costs);
    }
}
