//! Motion controller port

use crate::types::{Position, Vec2};

/// Integrates the agent's position over time.
pub trait MotionController {
    /// Advance one tick of length `dt`.
    ///
    /// `drift` is the velocity the policy would like the agent to follow, or
    /// `None` for pure exploration. `exploration_ratio` scales how strongly
    /// the drift dominates the random motion.
    fn advance(&mut self, drift: Option<Vec2>, exploration_ratio: f64, dt: f64);

    /// Current position.
    fn position(&self) -> Position;

    /// Total simulated time since construction.
    fn elapsed_time(&self) -> f64;

    /// Typical speed of the agent, used to scale drift velocities.
    fn mean_speed(&self) -> f64;

    /// Teleport the agent to `position` without advancing time.
    fn relocate(&mut self, position: Position);
}
