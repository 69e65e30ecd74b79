//! pathwise-train - offline trainer producing the artifact bundle
//!
//! Reads a labeled CSV, fits a random forest, reports holdout accuracy,
//! and writes the four-file bundle that pathwise-serve loads at startup.

use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::Parser;
use tracing::info;

use pathwise_common::artifacts::ArtifactBundle;
use pathwise_common::config::{models_dir, resolve_data_folder};
use pathwise_train::dataset::Dataset;
use pathwise_train::trainer::{accuracy, encode_dataset, fit, split_indices, TrainConfig};

/// Command-line arguments for pathwise-train
#[derive(Parser, Debug)]
#[command(name = "pathwise-train")]
#[command(about = "Train the career prediction model")]
#[command(version)]
struct Args {
    /// Labeled CSV of student records
    #[arg(short, long)]
    data: PathBuf,

    /// Data folder to write the model artifacts into
    /// (defaults to PATHWISE_DATA_FOLDER, then the config file, then the
    /// OS data directory)
    #[arg(long)]
    data_folder: Option<PathBuf>,

    /// Number of trees in the forest
    #[arg(long, default_value = "250")]
    trees: usize,

    /// Depth cap per tree (unlimited when omitted)
    #[arg(long)]
    max_depth: Option<usize>,

    /// Fraction of rows held out for accuracy reporting
    #[arg(long, default_value = "0.2")]
    holdout: f64,

    /// Random seed for reproducible training runs
    #[arg(long, default_value = "42")]
    seed: u64,
}

fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    info!("Starting pathwise-train v{}", env!("CARGO_PKG_VERSION"));

    let args = Args::parse();
    if !(0.0..1.0).contains(&args.holdout) {
        bail!("--holdout must be in [0, 1), got {}", args.holdout);
    }

    let dataset = Dataset::load(&args.data)
        .with_context(|| format!("Failed to load dataset {}", args.data.display()))?;
    let encoded = encode_dataset(&dataset).context("Failed to encode dataset")?;

    let config = TrainConfig {
        num_trees: args.trees,
        max_depth: args.max_depth,
        seed: args.seed,
        ..TrainConfig::default()
    };

    let (train_idx, eval_idx) = split_indices(encoded.rows.len(), args.holdout, args.seed);
    let train_rows: Vec<Vec<f64>> = train_idx.iter().map(|&i| encoded.rows[i].clone()).collect();
    let train_labels: Vec<u32> = train_idx.iter().map(|&i| encoded.labels[i]).collect();

    info!(
        "Training on {} examples ({} held out), {} trees, seed {}",
        train_rows.len(),
        eval_idx.len(),
        config.num_trees,
        config.seed
    );
    let forest = fit(
        &train_rows,
        &train_labels,
        encoded.target_encoder.len(),
        &config,
    )
    .context("Training failed")?;

    if !eval_idx.is_empty() {
        let score = accuracy(&forest, &encoded.rows, &encoded.labels, &eval_idx)
            .context("Holdout evaluation failed")?;
        info!(
            "Holdout accuracy: {:.2}% ({} examples)",
            score * 100.0,
            eval_idx.len()
        );
    }

    let data_folder = resolve_data_folder(args.data_folder.as_deref());
    let models = models_dir(&data_folder);
    let bundle_id = ArtifactBundle::save(
        &models,
        &forest,
        &encoded.interest_encoder,
        &encoded.target_encoder,
        &encoded.feature_order,
    )
    .context("Failed to write model artifacts")?;
    info!("Saved artifact bundle {} to {}", bundle_id, models.display());

    Ok(())
}
