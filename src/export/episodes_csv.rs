//! CSV export of the episode log
//!
//! One row per episode, in the order episodes were run, suitable for
//! plotting learning curves.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::{
    Result,
    pipeline::{EpisodeLog, EpisodeOutcome, EpisodeRecord},
};

/// A single row in the episode CSV export
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EpisodeRow {
    pub episode: usize,
    pub batch: usize,
    pub outcome: EpisodeOutcome,
    pub ticks: usize,
    pub start_time: f64,
    pub end_time: f64,
    pub duration: f64,
    pub start_x: f64,
    pub start_y: f64,
    pub end_x: f64,
    pub end_y: f64,
    pub exploration_ratio: f64,
}

impl From<&EpisodeRecord> for EpisodeRow {
    fn from(record: &EpisodeRecord) -> Self {
        Self {
            episode: record.episode,
            batch: record.batch,
            outcome: record.outcome,
            ticks: record.ticks,
            start_time: record.start_time,
            end_time: record.end_time,
            duration: record.duration(),
            start_x: record.start_position.x,
            start_y: record.start_position.y,
            end_x: record.end_position.x,
            end_y: record.end_position.y,
            exploration_ratio: record.exploration_ratio,
        }
    }
}

/// Exporter for episode CSV files
pub struct EpisodeCsvExporter;

impl EpisodeCsvExporter {
    /// Write every record of `log` to `path`.
    ///
    /// # Returns
    /// Number of rows written
    pub fn export(log: &EpisodeLog, path: &Path) -> Result<usize> {
        let mut writer = csv::Writer::from_path(path)?;
        for record in log.records() {
            writer.serialize(EpisodeRow::from(record))?;
        }
        writer.flush()?;
        Ok(log.len())
    }

    /// Read rows back from a file written by [`export`](Self::export).
    pub fn read(path: &Path) -> Result<Vec<EpisodeRow>> {
        let mut reader = csv::Reader::from_path(path)?;
        let mut rows = Vec::new();
        for row in reader.deserialize() {
            rows.push(row?);
        }
        Ok(rows)
    }
}
