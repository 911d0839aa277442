//! Batched training loop with per-batch reference snapshots

use rand::RngCore;
use serde::{Deserialize, Serialize};
use tracing::info;

use super::episode::{
    Collaborators, EpisodeConfig, EpisodeController, EpisodeLog, EpisodeStart, MIN_EXPLORATION_RATIO,
    TrainingState,
};
use crate::{
    Error, Result,
    ports::Observer,
    td::{PolicyAdvisor, ValueEstimator, ValueEstimatorSnapshot},
    utils::mean,
};

/// Training configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrainingConfig {
    /// Number of snapshot batches
    pub batches: usize,

    /// Episodes run against each snapshot
    pub episodes_per_batch: usize,

    /// Exploration ratio before the first episode
    pub initial_exploration_ratio: f64,

    /// Random seed
    pub seed: Option<u64>,
}

impl Default for TrainingConfig {
    fn default() -> Self {
        Self {
            batches: 10,
            episodes_per_batch: 8,
            initial_exploration_ratio: MIN_EXPLORATION_RATIO,
            seed: None,
        }
    }
}

impl TrainingConfig {
    pub fn total_episodes(&self) -> usize {
        self.batches * self.episodes_per_batch
    }
}

/// Aggregate statistics of one batch
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BatchSummary {
    pub batch: usize,
    pub episodes: usize,
    pub successes: usize,
    /// Mean episode duration in seconds
    pub mean_duration: f64,
    /// Exploration ratio after the batch's last episode
    pub exploration_ratio: f64,
    /// `V_max` of the snapshot the batch acted on
    pub max_reference: f64,
}

impl BatchSummary {
    pub fn success_rate(&self) -> f64 {
        if self.episodes == 0 {
            0.0
        } else {
            self.successes as f64 / self.episodes as f64
        }
    }
}

/// Result of a training run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrainingResult {
    /// Total episodes run
    pub total_episodes: usize,

    /// Episodes that ended in success
    pub successes: usize,

    /// Episodes that timed out
    pub timeouts: usize,

    /// Success rate
    pub success_rate: f64,

    /// Mean episode duration in seconds
    pub mean_duration: f64,

    /// Exploration ratio after the last episode
    pub final_exploration_ratio: f64,

    /// Per-batch statistics
    pub batches: Vec<BatchSummary>,
}

impl TrainingResult {
    /// Create a new training result
    pub fn new(log: &EpisodeLog, batches: Vec<BatchSummary>, final_exploration_ratio: f64) -> Self {
        let total_episodes = log.len();
        let successes = log.successes();
        let success_rate = if total_episodes > 0 {
            successes as f64 / total_episodes as f64
        } else {
            0.0
        };
        let durations: Vec<f64> = log.records().iter().map(|r| r.duration()).collect();

        Self {
            total_episodes,
            successes,
            timeouts: total_episodes - successes,
            success_rate,
            mean_duration: mean(&durations).unwrap_or(0.0),
            final_exploration_ratio,
            batches,
        }
    }

    /// Save result to JSON file
    pub fn save<P: AsRef<std::path::Path>>(&self, path: P) -> Result<()> {
        let file = std::fs::File::create(path)?;
        serde_json::to_writer_pretty(file, self)?;
        Ok(())
    }

    /// Load result from JSON file
    pub fn load<P: AsRef<std::path::Path>>(path: P) -> Result<Self> {
        let file = std::fs::File::open(path)?;
        let result = serde_json::from_reader(file)?;
        Ok(result)
    }
}

/// Training loop alternating frozen snapshots and batches of episodes
pub struct TrainingLoop {
    config: TrainingConfig,
    episode: EpisodeConfig,
    observers: Vec<Box<dyn Observer>>,
}

impl TrainingLoop {
    /// Create a new training loop. Episodes always run with training on.
    pub fn new(config: TrainingConfig, episode: EpisodeConfig) -> Result<Self> {
        let episode = episode.with_training(true);
        episode.validate()?;
        if config.episodes_per_batch == 0 {
            return Err(Error::invalid_config("a batch needs at least one episode"));
        }
        Ok(Self {
            config,
            episode,
            observers: Vec::new(),
        })
    }

    /// Add an observer to the loop
    pub fn with_observer(mut self, observer: Box<dyn Observer>) -> Self {
        self.observers.push(observer);
        self
    }

    pub fn config(&self) -> &TrainingConfig {
        &self.config
    }

    /// Run every batch, appending to `log` and adapting `state`.
    ///
    /// Fails before the first episode if the feature source and the
    /// estimator disagree on the number of features.
    pub fn run(
        &mut self,
        estimator: &mut ValueEstimator,
        mut collaborators: Collaborators<'_>,
        state: &mut TrainingState,
        log: &mut EpisodeLog,
        rng: &mut dyn RngCore,
    ) -> Result<TrainingResult> {
        let features = collaborators.features;
        estimator.check_dimension(features.dimension(), features.name())?;
        let sample = collaborators.environment.global_sample();

        for observer in &mut self.observers {
            observer.on_training_start(self.config.total_episodes())?;
        }

        let mut summaries = Vec::with_capacity(self.config.batches);
        for batch in 0..self.config.batches {
            let snapshot = ValueEstimatorSnapshot::capture(estimator, features, &sample)?;
            for observer in &mut self.observers {
                observer.on_batch_start(batch, &snapshot)?;
            }
            let max_reference = snapshot.max_reference();
            let advisor = PolicyAdvisor::new(snapshot);
            let controller = EpisodeController::new(self.episode, &advisor)?;

            let first = log.len();
            for _ in 0..self.config.episodes_per_batch {
                let start = EpisodeStart {
                    episode: log.len(),
                    batch,
                    position: collaborators.environment.sample_random_position(rng),
                };
                let record =
                    controller.run(start, estimator, &mut collaborators, state, log, rng)?;
                for observer in &mut self.observers {
                    observer.on_episode_end(record)?;
                }
            }

            let records = &log.records()[first..];
            let durations: Vec<f64> = records.iter().map(|r| r.duration()).collect();
            let summary = BatchSummary {
                batch,
                episodes: records.len(),
                successes: records.iter().filter(|r| r.outcome.is_success()).count(),
                mean_duration: mean(&durations).unwrap_or(0.0),
                exploration_ratio: state.exploration_ratio(),
                max_reference,
            };
            info!(
                batch,
                successes = summary.successes,
                episodes = summary.episodes,
                mean_duration = summary.mean_duration,
                exploration_ratio = summary.exploration_ratio,
                max_reference,
                "batch finished"
            );
            for observer in &mut self.observers {
                observer.on_batch_end(&summary)?;
            }
            summaries.push(summary);
        }

        for observer in &mut self.observers {
            observer.on_training_end()?;
        }

        Ok(TrainingResult::new(log, summaries, state.exploration_ratio()))
    }
}
