//! Train command - Learn a value map and the navigation policy it induces

use std::{
    fs::File,
    path::{Path, PathBuf},
};

use anyhow::{Context, Result};
use clap::Parser;
use serde::Serialize;
use serde_json::to_writer_pretty;
use tracing::info;

use crate::{
    adapters::Scene,
    cli::{
        config::ExperimentConfig,
        output::{format_number, format_percent, print_batch_table, print_kv, print_section},
    },
    export::EpisodeCsvExporter,
    pipeline::{
        EpisodeLog, JsonlObserver, ProgressObserver, TrainingLoop, TrainingResult, TrainingState,
    },
    ports::FeatureSource,
    td::{SavedEstimator, TrainingMetadata, ValueEstimator},
    utils::{build_rng, derive_seed},
};

/// Seed stream for episode start positions and termination draws.
pub(crate) const EPISODE_STREAM: u64 = 3;

#[derive(Debug, Serialize)]
struct SummaryMetadata {
    seed: Option<u64>,
    features: usize,
    feature_source: String,
}

#[derive(Debug, Serialize)]
struct TrainingSummaryFile<'a> {
    training: &'a TrainingResult,
    config: &'a ExperimentConfig,
    metadata: SummaryMetadata,
}

fn sanitize_summary_path(raw: &Path) -> PathBuf {
    let mut normalized = raw.to_path_buf();
    let raw_str = raw.as_os_str().to_string_lossy();

    // Treat trailing separators or missing filename as a directory target.
    if raw_str.ends_with(std::path::MAIN_SEPARATOR) || normalized.file_name().is_none() {
        normalized.push("training_summary.json");
        return normalized;
    }

    match normalized.extension().and_then(|ext| ext.to_str()) {
        Some(ext) if ext.eq_ignore_ascii_case("json") => normalized,
        _ => {
            normalized.set_extension("json");
            normalized
        }
    }
}

fn ensure_parent(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
    }
    Ok(())
}

#[derive(Parser, Debug)]
#[command(about = "Train a value map by TD learning")]
pub struct TrainArgs {
    /// JSON experiment config; flags below override its fields
    #[arg(long, short = 'c')]
    pub config: Option<PathBuf>,

    /// Number of snapshot batches
    #[arg(long, short = 'b')]
    pub batches: Option<usize>,

    /// Episodes per batch
    #[arg(long, short = 'k')]
    pub episodes_per_batch: Option<usize>,

    /// Tick length in seconds
    #[arg(long)]
    pub dt: Option<f64>,

    /// Episode timeout in seconds
    #[arg(long)]
    pub max_t: Option<f64>,

    /// Head straight for the reward when closer than this radius
    #[arg(long)]
    pub proximity_radius: Option<f64>,

    /// Number of place cells
    #[arg(long)]
    pub cells: Option<usize>,

    /// Learning rate η
    #[arg(long)]
    pub learning_rate: Option<f64>,

    /// Discount horizon τ in seconds
    #[arg(long)]
    pub tau: Option<f64>,

    /// Eligibility trace timescale τ_e in seconds
    #[arg(long)]
    pub tau_e: Option<f64>,

    /// Random seed for reproducibility
    #[arg(long)]
    pub seed: Option<u64>,

    /// Output file for the trained estimator (MessagePack)
    #[arg(long, short = 'O')]
    pub output: Option<PathBuf>,

    /// Optional path for writing a summary JSON file
    #[arg(long)]
    pub summary: Option<PathBuf>,

    /// Optional CSV file with one row per episode
    #[arg(long)]
    pub episodes_csv: Option<PathBuf>,

    /// Optional file for JSONL observations
    #[arg(long)]
    pub observations: Option<PathBuf>,

    /// Show progress bar
    #[arg(long, default_value_t = true, action = clap::ArgAction::Set)]
    pub progress: bool,
}

impl TrainArgs {
    /// Resolve the experiment config: file or defaults, then flag overrides.
    pub fn experiment_config(&self) -> Result<ExperimentConfig> {
        let mut config = ExperimentConfig::load_or_default(self.config.as_deref())?;

        if let Some(batches) = self.batches {
            config.training.batches = batches;
        }
        if let Some(k) = self.episodes_per_batch {
            config.training.episodes_per_batch = k;
        }
        if let Some(seed) = self.seed {
            config.training.seed = Some(seed);
        }
        if let Some(dt) = self.dt {
            config.episode.dt = dt;
        }
        if let Some(max_t) = self.max_t {
            config.episode.max_t = max_t;
        }
        if let Some(radius) = self.proximity_radius {
            config.episode.proximity_radius = Some(radius);
        }
        if let Some(cells) = self.cells {
            config.scene.place_cells.n = cells;
            config.scene.place_cells.centres = None;
        }
        if let Some(eta) = self.learning_rate {
            config.estimator = config.estimator.with_learning_rate(eta);
        }
        if let Some(tau) = self.tau {
            config.estimator = config.estimator.with_discount_horizon(tau);
        }
        if let Some(tau_e) = self.tau_e {
            config.estimator = config.estimator.with_trace_timescale(tau_e);
        }
        Ok(config)
    }
}

pub fn execute(args: TrainArgs) -> Result<()> {
    let config = args.experiment_config()?;
    let seed = config.training.seed;

    let summary_spec = args.summary.as_ref().map(|raw| {
        let sanitized = sanitize_summary_path(raw);
        let normalized = sanitized != *raw;
        (sanitized, normalized)
    });

    let mut scene = Scene::build(&config.scene, seed).context("Failed to build scene")?;
    let dimension = scene.features.dimension();
    let mut estimator = ValueEstimator::new(dimension, config.estimator)?;

    let mut training = TrainingLoop::new(config.training.clone(), config.episode)?;
    if args.progress {
        training = training.with_observer(Box::new(ProgressObserver::new()));
    }
    if let Some(path) = &args.observations {
        ensure_parent(path)?;
        let observer = JsonlObserver::new(path)
            .with_context(|| format!("Failed to create observations file: {}", path.display()))?;
        training = training.with_observer(Box::new(observer));
    }

    info!(
        batches = config.training.batches,
        episodes_per_batch = config.training.episodes_per_batch,
        features = dimension,
        ?seed,
        "training started"
    );

    let mut state = TrainingState::new(config.training.initial_exploration_ratio);
    let mut log = EpisodeLog::new();
    let mut rng = build_rng(derive_seed(seed, EPISODE_STREAM));
    let result = training.run(
        &mut estimator,
        scene.collaborators(),
        &mut state,
        &mut log,
        &mut rng,
    )?;

    print_section("Training Complete");
    print_kv("Episodes", &format_number(result.total_episodes));
    print_kv(
        "Successes",
        &format!(
            "{} ({})",
            format_number(result.successes),
            format_percent(result.success_rate)
        ),
    );
    print_kv("Mean duration", &format!("{:.2} s", result.mean_duration));
    print_kv(
        "Exploration ratio",
        &format!("{:.3}", result.final_exploration_ratio),
    );
    println!();
    print_batch_table(&result.batches);

    if let Some(output_path) = &args.output {
        ensure_parent(output_path)?;
        let metadata = TrainingMetadata {
            episodes_trained: result.total_episodes,
            batches: result.batches.len(),
            successes: result.successes,
            seed,
            exploration_ratio: Some(result.final_exploration_ratio),
        };
        let saved = SavedEstimator::from_estimator(
            &estimator,
            scene.resolved_config().clone(),
            config.episode,
            metadata,
        );
        saved.save_to_file(output_path)?;
        println!("\nEstimator saved to {}", output_path.display());
    }

    if let Some(csv_path) = &args.episodes_csv {
        ensure_parent(csv_path)?;
        let rows = EpisodeCsvExporter::export(&log, csv_path)
            .with_context(|| format!("Failed to export episodes to {}", csv_path.display()))?;
        println!("Episode log ({rows} rows) written to {}", csv_path.display());
    }

    if let Some((summary_path, normalized)) = summary_spec {
        if normalized {
            println!("\nNormalizing summary path to {}", summary_path.display());
        }
        ensure_parent(&summary_path)?;

        let summary = TrainingSummaryFile {
            training: &result,
            config: &config,
            metadata: SummaryMetadata {
                seed,
                features: dimension,
                feature_source: scene.features.name().to_string(),
            },
        };

        let file = File::create(&summary_path)
            .with_context(|| format!("Failed to create file: {}", summary_path.display()))?;
        to_writer_pretty(file, &summary)?;
        println!("\nSummary written to {}", summary_path.display());
    }

    Ok(())
}
