//! Gaussian reward density around a goal location

use serde::{Deserialize, Serialize};

use crate::{Error, Result, ports::RewardSource, types::Position};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RewardConfig {
    /// Goal location; the arena centre when absent
    pub position: Option<Position>,
    /// Width σ of the reward field in metres
    pub width: f64,
    /// Reward density at the goal
    pub max_rate: f64,
    /// Expected time an agent sitting on the goal needs to end the episode
    pub episode_end_time_constant: f64,
}

impl Default for RewardConfig {
    fn default() -> Self {
        Self {
            position: None,
            width: 0.1,
            max_rate: 1.0,
            episode_end_time_constant: 1.0,
        }
    }
}

/// A single place-cell-shaped reward field.
#[derive(Debug, Clone)]
pub struct RewardCell {
    goal: Position,
    width: f64,
    max_rate: f64,
    episode_end_time_constant: f64,
}

impl RewardCell {
    pub fn new(goal: Position, config: &RewardConfig) -> Result<Self> {
        if !(config.width > 0.0 && config.width.is_finite()) {
            return Err(Error::invalid_config(format!(
                "reward width must be positive, got {}",
                config.width
            )));
        }
        if config.episode_end_time_constant.is_nan() || config.episode_end_time_constant <= 0.0 {
            return Err(Error::invalid_config(format!(
                "episode end time constant must be positive, got {}",
                config.episode_end_time_constant
            )));
        }
        Ok(Self {
            goal,
            width: config.width,
            max_rate: config.max_rate,
            episode_end_time_constant: config.episode_end_time_constant,
        })
    }

    pub fn width(&self) -> f64 {
        self.width
    }
}

impl RewardSource for RewardCell {
    fn evaluate(&self, position: Position) -> f64 {
        let d = self.goal.distance(position);
        self.max_rate * (-(d * d) / (2.0 * self.width * self.width)).exp()
    }

    fn episode_end_time_constant(&self) -> f64 {
        self.episode_end_time_constant
    }

    fn goal(&self) -> Option<Position> {
        Some(self.goal)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reward_decays_away_from_goal() {
        let cell = RewardCell::new(Position::new(0.5, 0.5), &RewardConfig::default()).unwrap();
        assert!((cell.evaluate(Position::new(0.5, 0.5)) - 1.0).abs() < 1e-12);
        let one_sigma = cell.evaluate(Position::new(0.6, 0.5));
        assert!((one_sigma - (-0.5f64).exp()).abs() < 1e-9);
        assert_eq!(cell.goal(), Some(Position::new(0.5, 0.5)));
    }

    #[test]
    fn zero_time_constant_is_rejected() {
        let config = RewardConfig {
            episode_end_time_constant: 0.0,
            ..RewardConfig::default()
        };
        assert!(RewardCell::new(Position::ZERO, &config).is_err());
    }
}
