//! Observer port - abstraction for training observation and data collection
//!
//! This port defines the interface for observing training events,
//! allowing composable data collection without coupling the training
//! loop to specific output formats or metrics.

use crate::{
    Result,
    pipeline::{BatchSummary, EpisodeRecord},
    td::ValueEstimatorSnapshot,
};

/// Observer trait for monitoring training
///
/// Observers can be composed to collect different types of data during training.
/// Examples include:
/// - Progress bars for user feedback
/// - JSONL export for analysis
/// - Metrics tracking for evaluation
///
/// # Event Sequence
///
/// The observer methods are called in the following order:
/// 1. `on_training_start(total_episodes)` - Once at the beginning
/// 2. For each batch:
///    - `on_batch_start(batch, snapshot)` - After the frozen snapshot is taken
///    - `on_episode_end(record)` - Once per finished episode
///    - `on_batch_end(summary)`
/// 3. `on_training_end()` - Once at the end
///
/// # Examples
///
/// ```no_run
/// use tdnav::{pipeline::EpisodeRecord, ports::Observer};
///
/// struct SuccessCounter {
///     successes: usize,
/// }
///
/// impl Observer for SuccessCounter {
///     fn on_episode_end(&mut self, record: &EpisodeRecord) -> tdnav::Result<()> {
///         if record.outcome.is_success() {
///             self.successes += 1;
///         }
///         Ok(())
///     }
/// }
/// ```
pub trait Observer {
    /// Called when training starts.
    ///
    /// # Parameters
    ///
    /// * `total_episodes` - Total number of episodes that will be run
    fn on_training_start(&mut self, _total_episodes: usize) -> Result<()> {
        Ok(())
    }

    /// Called at the start of each batch, once the reference snapshot exists.
    fn on_batch_start(&mut self, _batch: usize, _snapshot: &ValueEstimatorSnapshot) -> Result<()> {
        Ok(())
    }

    /// Called after an episode has been appended to the log.
    fn on_episode_end(&mut self, _record: &EpisodeRecord) -> Result<()> {
        Ok(())
    }

    /// Called with the aggregate statistics of a finished batch.
    fn on_batch_end(&mut self, _summary: &BatchSummary) -> Result<()> {
        Ok(())
    }

    /// Called when training completes.
    ///
    /// Use this to finalize outputs, close files, or display summaries.
    fn on_training_end(&mut self) -> Result<()> {
        Ok(())
    }
}
