//! Observer pattern for the training loop
//!
//! Observers allow composable data collection during training without coupling
//! training logic to specific output formats.

use std::{
    fs::File,
    io::{BufWriter, Write},
    path::Path,
};

use indicatif::{ProgressBar, ProgressStyle};
use serde::{Deserialize, Serialize};

use super::{episode::EpisodeRecord, training::BatchSummary};
use crate::{Result, ports::Observer, td::ValueEstimatorSnapshot};

/// Progress bar observer - Shows training progress
pub struct ProgressObserver {
    progress_bar: Option<ProgressBar>,
    successes: usize,
    timeouts: usize,
    batch: usize,
}

impl ProgressObserver {
    /// Create a new progress observer
    pub fn new() -> Self {
        Self {
            progress_bar: None,
            successes: 0,
            timeouts: 0,
            batch: 0,
        }
    }

    fn message(&self) -> String {
        format!(
            "batch {} S:{} T:{}",
            self.batch + 1,
            self.successes,
            self.timeouts
        )
    }
}

impl Default for ProgressObserver {
    fn default() -> Self {
        Self::new()
    }
}

impl Observer for ProgressObserver {
    fn on_training_start(&mut self, total_episodes: usize) -> Result<()> {
        let pb = ProgressBar::new(total_episodes as u64);
        pb.set_style(
            ProgressStyle::default_bar()
                .template("[{elapsed_precise}] {bar:40.cyan/blue} {pos}/{len} episodes ({msg})")
                .map_err(|e| crate::Error::ProgressBarTemplate {
                    message: e.to_string(),
                })?
                .progress_chars("=>-"),
        );
        self.progress_bar = Some(pb);
        Ok(())
    }

    fn on_batch_start(&mut self, batch: usize, _snapshot: &ValueEstimatorSnapshot) -> Result<()> {
        self.batch = batch;
        Ok(())
    }

    fn on_episode_end(&mut self, record: &EpisodeRecord) -> Result<()> {
        if record.outcome.is_success() {
            self.successes += 1;
        } else {
            self.timeouts += 1;
        }

        if let Some(pb) = &self.progress_bar {
            pb.set_position((record.episode + 1) as u64);
            pb.set_message(self.message());
        }
        Ok(())
    }

    fn on_training_end(&mut self) -> Result<()> {
        if let Some(pb) = &self.progress_bar {
            pb.finish_with_message(self.message());
        }
        Ok(())
    }
}

/// Metrics observer - Tracks training metrics
#[derive(Debug, Default)]
pub struct MetricsObserver {
    successes: usize,
    total_episodes: usize,
    durations: Vec<f64>,
    ticks: Vec<usize>,
    max_references: Vec<f64>,
    first_success: Option<usize>,
}

impl MetricsObserver {
    /// Create a new metrics observer
    pub fn new() -> Self {
        Self::default()
    }

    /// Get current success rate
    pub fn success_rate(&self) -> f64 {
        if self.total_episodes == 0 {
            0.0
        } else {
            self.successes as f64 / self.total_episodes as f64
        }
    }

    /// Get average episode duration
    pub fn avg_duration(&self) -> f64 {
        if self.durations.is_empty() {
            0.0
        } else {
            self.durations.iter().sum::<f64>() / self.durations.len() as f64
        }
    }

    /// Get average episode length in ticks
    pub fn avg_ticks(&self) -> f64 {
        if self.ticks.is_empty() {
            0.0
        } else {
            self.ticks.iter().sum::<usize>() as f64 / self.ticks.len() as f64
        }
    }

    /// `V_max` of every snapshot seen so far
    pub fn max_references(&self) -> &[f64] {
        &self.max_references
    }

    /// Get metrics summary
    pub fn summary(&self) -> MetricsSummary {
        MetricsSummary {
            total_episodes: self.total_episodes,
            successes: self.successes,
            success_rate: self.success_rate(),
            avg_duration: self.avg_duration(),
            avg_ticks: self.avg_ticks(),
            first_success: self.first_success,
            final_max_reference: self.max_references.last().copied(),
        }
    }
}

/// Summary of training metrics
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetricsSummary {
    pub total_episodes: usize,
    pub successes: usize,
    pub success_rate: f64,
    pub avg_duration: f64,
    pub avg_ticks: f64,
    pub first_success: Option<usize>,
    pub final_max_reference: Option<f64>,
}

impl Observer for MetricsObserver {
    fn on_batch_start(&mut self, _batch: usize, snapshot: &ValueEstimatorSnapshot) -> Result<()> {
        self.max_references.push(snapshot.max_reference());
        Ok(())
    }

    fn on_episode_end(&mut self, record: &EpisodeRecord) -> Result<()> {
        self.total_episodes += 1;
        self.durations.push(record.duration());
        self.ticks.push(record.ticks);
        if record.outcome.is_success() {
            self.successes += 1;
            self.first_success.get_or_insert(record.episode);
        }
        Ok(())
    }
}

/// One line of the JSONL export
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum Observation {
    Episode(EpisodeRecord),
    Batch(BatchSummary),
}

/// JSONL observer - Exports episodes and batch summaries to JSON Lines format
pub struct JsonlObserver {
    writer: BufWriter<File>,
}

impl JsonlObserver {
    /// Create a new JSONL observer
    pub fn new<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = File::create(path)?;
        let writer = BufWriter::new(file);
        Ok(Self { writer })
    }

    fn write(&mut self, observation: &Observation) -> Result<()> {
        // One JSON object per line
        serde_json::to_writer(&mut self.writer, observation)?;
        writeln!(&mut self.writer)?;
        Ok(())
    }
}

impl Observer for JsonlObserver {
    fn on_episode_end(&mut self, record: &EpisodeRecord) -> Result<()> {
        self.write(&Observation::Episode(record.clone()))
    }

    fn on_batch_end(&mut self, summary: &BatchSummary) -> Result<()> {
        self.write(&Observation::Batch(summary.clone()))?;
        self.writer.flush()?;
        Ok(())
    }

    fn on_training_end(&mut self) -> Result<()> {
        self.writer.flush()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{pipeline::EpisodeOutcome, types::Position};

    fn record(episode: usize, outcome: EpisodeOutcome, end_time: f64) -> EpisodeRecord {
        EpisodeRecord {
            episode,
            batch: 0,
            outcome,
            ticks: (end_time / 0.05).round() as usize,
            start_time: 0.0,
            end_time,
            start_position: Position::new(0.1, 0.1),
            end_position: Position::new(0.5, 0.5),
            exploration_ratio: 0.1,
        }
    }

    #[test]
    fn test_metrics_observer() {
        let mut observer = MetricsObserver::new();

        assert_eq!(observer.success_rate(), 0.0);

        observer
            .on_episode_end(&record(0, EpisodeOutcome::Timeout, 60.0))
            .unwrap();
        observer
            .on_episode_end(&record(1, EpisodeOutcome::Success, 10.0))
            .unwrap();
        observer
            .on_episode_end(&record(2, EpisodeOutcome::Success, 20.0))
            .unwrap();

        let summary = observer.summary();
        assert_eq!(summary.total_episodes, 3);
        assert_eq!(summary.successes, 2);
        assert_eq!(summary.first_success, Some(1));
        assert!((observer.success_rate() - 0.666).abs() < 0.01);
        assert!((observer.avg_duration() - 30.0).abs() < 1e-9);
    }

    #[test]
    fn test_jsonl_observer_writes_one_line_per_event() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("observations.jsonl");
        {
            let mut observer = JsonlObserver::new(&path).unwrap();
            observer
                .on_episode_end(&record(0, EpisodeOutcome::Success, 3.0))
                .unwrap();
            observer
                .on_batch_end(&BatchSummary {
                    batch: 0,
                    episodes: 1,
                    successes: 1,
                    mean_duration: 3.0,
                    exploration_ratio: 0.11,
                    max_reference: 0.4,
                })
                .unwrap();
            observer.on_training_end().unwrap();
        }

        let contents = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = contents.lines().collect();
        assert_eq!(lines.len(), 2);
        let first: Observation = serde_json::from_str(lines[0]).unwrap();
        assert!(matches!(first, Observation::Episode(r) if r.outcome.is_success()));
        assert!(lines[1].contains("\"event\":\"batch\""));
    }
}
