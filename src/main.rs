//! Command-line entry point.
//!
//! ```text
//! rust-dnn train --config cfg.json --data digits.json --out params.json
//! rust-dnn evaluate --data digits.json --params params.json
//! ```

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use rust_dnn::{
    Dataset, evaluate_accuracy, load_config, load_datas, load_parameters, save_parameters, train,
};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "rust-dnn")]
#[command(about = "Train a deep feed-forward classifier with L2 regularization", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Log level (overridden by RUST_LOG)
    #[arg(short, long, default_value = "info")]
    log_level: String,
}

#[derive(Subcommand)]
enum Commands {
    /// Train on the train split and save the parameters
    Train {
        /// Training config (JSON)
        #[arg(short, long)]
        config: PathBuf,

        /// Raw dataset with train/test splits (JSON)
        #[arg(short, long)]
        data: PathBuf,

        /// Where to write the trained parameters
        #[arg(short, long, default_value = "parameters.json")]
        out: PathBuf,

        /// Optional file for the sampled cost curve
        #[arg(long)]
        costs_out: Option<PathBuf>,
    },

    /// Report accuracy of saved parameters on both splits
    Evaluate {
        /// Raw dataset with train/test splits (JSON)
        #[arg(short, long)]
        data: PathBuf,

        /// Saved parameters
        #[arg(short, long)]
        params: PathBuf,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&cli.log_level));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    match cli.command {
        Commands::Train {
            config,
            data,
            out,
            costs_out,
        } => run_train(config, data, out, costs_out),
        Commands::Evaluate { data, params } => run_evaluate(data, params),
    }
}

fn load_splits(path: &Path) -> Result<(Dataset, Dataset)> {
    let raw = load_datas(path).with_context(|| format!("loading {}", path.display()))?;
    let train = Dataset::from_raw(&raw.train, raw.num_classes).context("building train split")?;
    let test = Dataset::from_raw(&raw.test, raw.num_classes).context("building test split")?;
    info!(
        train_examples = train.num_examples(),
        test_examples = test.num_examples(),
        features = train.num_features(),
        classes = raw.num_classes,
        "loaded dataset"
    );
    Ok((train, test))
}

fn run_train(
    config: PathBuf,
    data: PathBuf,
    out: PathBuf,
    costs_out: Option<PathBuf>,
) -> Result<()> {
    let cfg = load_config(&config).with_context(|| format!("loading {}", config.display()))?;
    let (train_set, test_set) = load_splits(&data)?;

    let report = train(&cfg, &train_set).context("training")?;

    let output = cfg.output_activation;
    let train_acc = evaluate_accuracy(
        train_set.features(),
        &train_set.class_indices(),
        &report.parameters,
        output,
    )?;
    let test_acc = evaluate_accuracy(
        test_set.features(),
        &test_set.class_indices(),
        &report.parameters,
        output,
    )?;
    info!(train_acc, test_acc, "accuracy");

    save_parameters(&out, &report.parameters, output)
        .with_context(|| format!("saving {}", out.display()))?;
    info!(path = %out.display(), "saved parameters");

    if let Some(path) = costs_out {
        let json = serde_json::to_string_pretty(&report.costs)?;
        std::fs::write(&path, json).with_context(|| format!("writing {}", path.display()))?;
        info!(path = %path.display(), samples = report.costs.len(), "saved cost curve");
    }

    Ok(())
}

fn run_evaluate(data: PathBuf, params: PathBuf) -> Result<()> {
    let (parameters, output) =
        load_parameters(&params).with_context(|| format!("loading {}", params.display()))?;
    let (train_set, test_set) = load_splits(&data)?;

    for (name, split) in [("train", &train_set), ("test", &test_set)] {
        let acc = evaluate_accuracy(split.features(), &split.class_indices(), &parameters, output)
            .with_context(|| format!("evaluating {name} split"))?;
        info!(split = name, accuracy = acc, "evaluation");
    }
    Ok(())
}
