//! Serialization support for trained value estimators.

use std::{
    fs::File,
    io::{BufReader, BufWriter, Write},
    path::Path,
};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::{
    Error,
    adapters::SceneConfig,
    pipeline::EpisodeConfig,
    td::estimator::{EstimatorState, ValueEstimator},
};

/// Metadata about the training process
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TrainingMetadata {
    /// Number of episodes trained
    pub episodes_trained: usize,
    /// Number of snapshot batches
    pub batches: usize,
    /// Episodes that ended in success
    pub successes: usize,
    /// Random seed used (if any)
    pub seed: Option<u64>,
    /// Exploration ratio at the end of training
    pub exploration_ratio: Option<f64>,
}

/// Serializable representation of a trained estimator and the scene it learned in
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SavedEstimator {
    /// Version of the save format
    pub version: u32,
    state: EstimatorState,
    /// Arena, receptive fields and reward the weights refer to
    pub scene: SceneConfig,
    /// Tick length, timeout and proximity radius used in training
    pub episode: EpisodeConfig,
    pub metadata: TrainingMetadata,
}

impl SavedEstimator {
    pub const VERSION: u32 = 2;

    pub fn from_estimator(
        estimator: &ValueEstimator,
        scene: SceneConfig,
        episode: EpisodeConfig,
        metadata: TrainingMetadata,
    ) -> Self {
        Self {
            version: Self::VERSION,
            state: estimator.export_state(),
            scene,
            episode,
            metadata,
        }
    }

    pub fn to_estimator(&self) -> Result<ValueEstimator> {
        if self.version != Self::VERSION {
            return Err(Error::UnsupportedVersion {
                found: self.version,
                expected: Self::VERSION,
            }
            .into());
        }

        ValueEstimator::from_state(self.state.clone()).context("Saved estimator state is invalid")
    }

    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let file = File::create(path.as_ref())
            .with_context(|| format!("Failed to create file: {}", path.as_ref().display()))?;
        let mut writer = BufWriter::new(file);

        rmp_serde::encode::write(&mut writer, self).context("Failed to serialize estimator")?;
        writer.flush().context("Failed to flush estimator")?;

        Ok(())
    }

    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = File::open(path.as_ref())
            .with_context(|| format!("Failed to open file: {}", path.as_ref().display()))?;
        let reader = BufReader::new(file);

        rmp_serde::decode::from_read(reader).context("Failed to deserialize estimator")
    }
}
