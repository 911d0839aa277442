//! Shared configuration types for CLI commands

use std::{fs::File, io::BufReader, path::Path};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::{
    adapters::SceneConfig,
    pipeline::{EpisodeConfig, TrainingConfig},
    td::EstimatorConfig,
};

/// Everything a training run is configured by, loadable from one JSON file.
///
/// Missing sections and fields fall back to their defaults, so a file only
/// needs to name what it changes:
///
/// ```
/// use tdnav::cli::config::ExperimentConfig;
///
/// let config: ExperimentConfig =
///     serde_json::from_str(r#"{ "training": { "batches": 3 } }"#).unwrap();
/// assert_eq!(config.training.batches, 3);
/// assert_eq!(config.training.episodes_per_batch, 8);
/// assert_eq!(config.episode.dt, 0.05);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExperimentConfig {
    pub estimator: EstimatorConfig,
    pub episode: EpisodeConfig,
    pub training: TrainingConfig,
    pub scene: SceneConfig,
}

impl ExperimentConfig {
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path)
            .with_context(|| format!("Failed to open config file: {}", path.display()))?;
        serde_json::from_reader(BufReader::new(file))
            .with_context(|| format!("Failed to parse config file: {}", path.display()))
    }

    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        let file = File::create(path)
            .with_context(|| format!("Failed to create config file: {}", path.display()))?;
        serde_json::to_writer_pretty(file, self).context("Failed to serialize config")?;
        Ok(())
    }

    /// Load `path` if given, otherwise start from the defaults.
    pub fn load_or_default(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::load(path),
            None => Ok(Self::default()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("experiment.json");

        let mut config = ExperimentConfig::default();
        config.training.batches = 2;
        config.episode.proximity_radius = Some(0.1);
        config.scene.place_cells.n = 16;
        config.save(&path).unwrap();

        let loaded = ExperimentConfig::load(&path).unwrap();
        assert_eq!(loaded, config);
    }

    #[test]
    fn test_missing_file_is_reported() {
        let err = ExperimentConfig::load("/nonexistent/experiment.json").unwrap_err();
        assert!(err.to_string().contains("Failed to open config file"));
    }
}
