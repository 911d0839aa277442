//! Evaluate command - Run a trained value map's policy without learning

use std::{fs::File, path::PathBuf};

use anyhow::{Context, Result};
use clap::Parser;
use serde::Serialize;
use tracing::info;

use super::train::EPISODE_STREAM;
use crate::{
    adapters::Scene,
    cli::output::{
        format_number, format_percent, print_kv, print_section, print_stats_table,
        print_subsection,
    },
    pipeline::{
        EpisodeController, EpisodeLog, EpisodeStart, MAX_EXPLORATION_RATIO, MetricsObserver,
        Observer, ProgressObserver, TrainingState,
    },
    ports::{Environment, FeatureSource},
    td::{PolicyAdvisor, SavedEstimator, ValueEstimatorSnapshot},
    utils::{build_rng, derive_seed},
};

#[derive(Parser, Debug)]
#[command(about = "Evaluate a trained value map")]
pub struct EvaluateArgs {
    /// Path to a saved estimator (MessagePack)
    pub estimator: PathBuf,

    /// Number of evaluation episodes
    #[arg(long, short = 'e', default_value_t = 20)]
    pub episodes: usize,

    /// Random seed for reproducibility
    #[arg(long)]
    pub seed: Option<u64>,

    /// Tick length in seconds (defaults to the one used in training)
    #[arg(long)]
    pub dt: Option<f64>,

    /// Episode timeout in seconds (defaults to the one used in training)
    #[arg(long)]
    pub max_t: Option<f64>,

    /// Exploration ratio (defaults to the ratio reached in training)
    #[arg(long)]
    pub exploration_ratio: Option<f64>,

    /// Head straight for the reward when closer than this radius
    #[arg(long)]
    pub proximity_radius: Option<f64>,

    /// Show progress bar
    #[arg(long, default_value_t = true, action = clap::ArgAction::Set)]
    pub progress: bool,

    /// Export results to file
    #[arg(long)]
    pub export: Option<PathBuf>,
}

#[derive(Debug, Serialize)]
struct EvaluationExport {
    estimator: String,
    episodes: usize,
    successes: usize,
    success_rate: f64,
    mean_duration: f64,
    max_reference: f64,
    exploration_ratio: f64,
    dt: f64,
    max_t: f64,
    episodes_trained: usize,
    seed: Option<u64>,
}

pub fn execute(args: EvaluateArgs) -> Result<()> {
    println!("Loading estimator from: {}", args.estimator.display());
    let saved = SavedEstimator::load_from_file(&args.estimator)?;
    let mut estimator = saved.to_estimator()?;

    let seed = args.seed.or(saved.metadata.seed);
    let mut scene = Scene::build(&saved.scene, seed).context("Failed to rebuild scene")?;
    estimator
        .check_dimension(scene.features.dimension(), scene.features.name())
        .context("Saved estimator does not match its scene")?;

    print_section("Loaded Estimator");
    print_kv("Features", &format_number(estimator.dimension()));
    print_kv(
        "Episodes trained",
        &format_number(saved.metadata.episodes_trained),
    );
    if let Some(seed) = saved.metadata.seed {
        print_kv("Training seed", &seed.to_string());
    }

    let sample = scene.environment.global_sample();
    let snapshot = ValueEstimatorSnapshot::capture(&estimator, &scene.features, &sample)?;
    let max_reference = snapshot.max_reference();
    let advisor = PolicyAdvisor::new(snapshot);

    let mut episode = saved.episode.with_training(false);
    if let Some(dt) = args.dt {
        episode.dt = dt;
    }
    if let Some(max_t) = args.max_t {
        episode.max_t = max_t;
    }
    if let Some(radius) = args.proximity_radius {
        episode = episode.with_proximity_radius(radius);
    }
    let controller = EpisodeController::new(episode, &advisor)?;

    let ratio = args
        .exploration_ratio
        .or(saved.metadata.exploration_ratio)
        .unwrap_or(MAX_EXPLORATION_RATIO);
    let mut state = TrainingState::new(ratio);
    let mut log = EpisodeLog::new();
    let mut rng = build_rng(derive_seed(seed, EPISODE_STREAM));

    let mut progress = args.progress.then(ProgressObserver::new);
    let mut metrics = MetricsObserver::new();
    if let Some(progress) = progress.as_mut() {
        progress.on_training_start(args.episodes)?;
    }

    info!(episodes = args.episodes, max_reference, "evaluation started");

    let mut collaborators = scene.collaborators();
    for index in 0..args.episodes {
        let start = EpisodeStart {
            episode: index,
            batch: 0,
            position: collaborators.environment.sample_random_position(&mut rng),
        };
        let record = controller.run(
            start,
            &mut estimator,
            &mut collaborators,
            &mut state,
            &mut log,
            &mut rng,
        )?;
        metrics.on_episode_end(record)?;
        if let Some(progress) = progress.as_mut() {
            progress.on_episode_end(record)?;
        }
    }
    if let Some(progress) = progress.as_mut() {
        progress.on_training_end()?;
    }

    let summary = metrics.summary();
    print_section("Evaluation Results");
    let episodes = format_number(summary.total_episodes);
    let successes = format_number(summary.successes);
    let success_rate = format_percent(summary.success_rate);
    let mean_duration = format!("{:.2} s", summary.avg_duration);
    print_stats_table(&[
        ("Episodes", episodes.as_str()),
        ("Successes", successes.as_str()),
        ("Success rate", success_rate.as_str()),
        ("Mean duration", mean_duration.as_str()),
    ]);
    print_subsection("Policy");
    print_kv("V_max", &format!("{max_reference:.4}"));
    print_kv("Exploration ratio", &format!("{:.3}", state.exploration_ratio()));
    print_kv("Tick length", &format!("{} s", episode.dt));
    print_kv("Timeout", &format!("{} s", episode.max_t));

    if let Some(export_path) = &args.export {
        let export = EvaluationExport {
            estimator: args.estimator.display().to_string(),
            episodes: summary.total_episodes,
            successes: summary.successes,
            success_rate: summary.success_rate,
            mean_duration: summary.avg_duration,
            max_reference,
            exploration_ratio: ratio,
            dt: episode.dt,
            max_t: episode.max_t,
            episodes_trained: saved.metadata.episodes_trained,
            seed,
        };
        let file = File::create(export_path)
            .with_context(|| format!("Failed to create file: {}", export_path.display()))?;
        serde_json::to_writer_pretty(file, &export)?;
        println!("\nResults exported to: {}", export_path.display());
    }

    Ok(())
}
