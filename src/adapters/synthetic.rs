//! Minimal collaborators for deterministic runs and tests

use crate::{
    ports::{FeatureSource, MotionController, RewardSource},
    types::{Position, Vec2},
};

/// Returns the same feature vector everywhere.
#[derive(Debug, Clone)]
pub struct ConstantFeatures {
    features: Vec<f64>,
}

impl ConstantFeatures {
    pub fn new(features: Vec<f64>) -> Self {
        Self { features }
    }
}

impl FeatureSource for ConstantFeatures {
    fn dimension(&self) -> usize {
        self.features.len()
    }

    fn evaluate(&self, _position: Position) -> Vec<f64> {
        self.features.clone()
    }

    fn name(&self) -> &str {
        "constant features"
    }
}

/// Uniform reward density, optionally with a nominal goal location.
#[derive(Debug, Clone, Copy)]
pub struct ConstantReward {
    pub value: f64,
    pub episode_end_time_constant: f64,
    pub goal: Option<Position>,
}

impl ConstantReward {
    pub fn new(value: f64) -> Self {
        Self {
            value,
            episode_end_time_constant: 1.0,
            goal: None,
        }
    }

    pub fn with_goal(mut self, goal: Position) -> Self {
        self.goal = Some(goal);
        self
    }

    pub fn with_episode_end_time_constant(mut self, time_constant: f64) -> Self {
        self.episode_end_time_constant = time_constant;
        self
    }
}

impl RewardSource for ConstantReward {
    fn evaluate(&self, _position: Position) -> f64 {
        self.value
    }

    fn episode_end_time_constant(&self) -> f64 {
        self.episode_end_time_constant
    }

    fn goal(&self) -> Option<Position> {
        self.goal
    }
}

/// Moves exactly along the requested drift and stands still without one.
#[derive(Debug, Clone)]
pub struct DriftOnlyMotion {
    position: Position,
    t: f64,
    mean_speed: f64,
    drifts: Vec<Option<Vec2>>,
}

impl DriftOnlyMotion {
    pub fn new(position: Position, mean_speed: f64) -> Self {
        Self {
            position,
            t: 0.0,
            mean_speed,
            drifts: Vec::new(),
        }
    }

    /// Drift passed to the most recent `advance`.
    pub fn last_drift(&self) -> Option<Vec2> {
        self.drifts.last().copied().flatten()
    }

    /// Drift passed to every `advance` so far, one entry per tick.
    pub fn drifts(&self) -> &[Option<Vec2>] {
        &self.drifts
    }

    /// Number of `advance` calls so far.
    pub fn ticks(&self) -> usize {
        self.drifts.len()
    }
}

impl MotionController for DriftOnlyMotion {
    fn advance(&mut self, drift: Option<Vec2>, _exploration_ratio: f64, dt: f64) {
        if let Some(drift) = drift {
            self.position += drift * dt;
        }
        self.drifts.push(drift);
        self.t += dt;
    }

    fn position(&self) -> Position {
        self.position
    }

    fn elapsed_time(&self) -> f64 {
        self.t
    }

    fn mean_speed(&self) -> f64 {
        self.mean_speed
    }

    fn relocate(&mut self, position: Position) {
        self.position = position;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn drift_only_motion_follows_drift() {
        let mut motion = DriftOnlyMotion::new(Position::ZERO, 0.1);
        motion.advance(Some(Vec2::new(1.0, 0.0)), 1.0, 0.5);
        motion.advance(None, 1.0, 0.5);
        assert_eq!(motion.position(), Position::new(0.5, 0.0));
        assert_eq!(motion.ticks(), 2);
        assert_eq!(motion.last_drift(), None);
        assert_eq!(motion.drifts()[0], Some(Vec2::new(1.0, 0.0)));
        assert!((motion.elapsed_time() - 1.0).abs() < 1e-12);
    }
}
