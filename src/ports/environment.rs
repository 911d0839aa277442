//! Environment port

use rand::RngCore;

use crate::types::Position;

/// Arena geometry as seen by the training loop.
pub trait Environment {
    /// Uniformly random navigable position, used as an episode start.
    fn sample_random_position(&self, rng: &mut dyn RngCore) -> Position;

    /// Deterministic, arena-covering set of positions.
    ///
    /// Snapshots evaluate the value function over this sample to find the
    /// reference maximum `V_max`.
    fn global_sample(&self) -> Vec<Position>;
}
