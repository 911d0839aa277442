//! Training and evaluation pipeline
//!
//! This module provides:
//! - The episode controller that runs one episode tick by tick
//! - The training loop that alternates reference snapshots and batches
//! - Observers recording progress and metrics during training

pub mod episode;
pub mod observers;
pub mod training;

pub use episode::{
    Collaborators, EpisodeConfig, EpisodeController, EpisodeLog, EpisodeOutcome, EpisodeRecord,
    EpisodeStart, MAX_EXPLORATION_RATIO, MIN_EXPLORATION_RATIO, SUCCESS_RATIO_GROWTH,
    TrainingState,
};
// Re-export observer implementations (adapters)
pub use observers::{JsonlObserver, MetricsObserver, MetricsSummary, Observation, ProgressObserver};
pub use training::{BatchSummary, TrainingConfig, TrainingLoop, TrainingResult};

pub use crate::ports::Observer;
