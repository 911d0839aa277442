//! Export functionality for analysis and research
//!
//! This module provides functionality to export training data in various formats.
//! Currently supports CSV export of the episode log.

mod episodes_csv;

pub use episodes_csv::{EpisodeCsvExporter, EpisodeRow};
