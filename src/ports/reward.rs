//! Reward source port

use crate::types::Position;

/// Produces a scalar reward density at any position.
pub trait RewardSource {
    /// Reward density at `position`.
    fn evaluate(&self, position: Position) -> f64;

    /// Timescale controlling how quickly a rewarded agent ends its episode.
    ///
    /// Per tick the episode succeeds with probability
    /// `dt * reward / episode_end_time_constant`.
    fn episode_end_time_constant(&self) -> f64;

    /// Location of the reward peak, if the source has one.
    ///
    /// Used by the optional proximity override in the episode controller.
    fn goal(&self) -> Option<Position> {
        None
    }
}
