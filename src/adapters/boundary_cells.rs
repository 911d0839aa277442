//! Allocentric boundary vector cells
//!
//! Each cell responds to walls at a preferred distance and direction from
//! the agent. The response to a position sums, over 360 test directions at
//! one-degree steps, a Gaussian in the distance to the first wall hit in
//! that direction times a von Mises tuning curve in the direction itself.
//! Rates are normalised so that every cell peaks at 1 over a fine grid of
//! the arena it was built in.

use std::f64::consts::TAU;

use rand::{Rng, RngCore};
use serde::{Deserialize, Serialize};

use super::environment::BoxEnvironment;
use crate::{
    Error, Result,
    ports::FeatureSource,
    types::{Position, Vec2, Wall},
};

/// Number of test directions swept around each position.
pub const TEST_DIRECTIONS: usize = 360;

/// Grid spacing of the positions used to normalise rates.
const NORMALISATION_DX: f64 = 0.04;

/// Population configuration for [`BoundaryVectorCells`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BoundaryCellConfig {
    pub n: usize,
    /// Scale of the Rayleigh distribution preferred distances are drawn from
    pub preferred_wall_distance_mean: f64,
    /// Angular tuning width in degrees
    pub angle_spread_degrees: f64,
    /// Distance tuning width is `distance / beta + xi`
    pub xi: f64,
    pub beta: f64,
    pub min_fr: f64,
    pub max_fr: f64,
}

impl Default for BoundaryCellConfig {
    fn default() -> Self {
        Self {
            n: 10,
            preferred_wall_distance_mean: 0.15,
            angle_spread_degrees: 11.25,
            xi: 0.08,
            beta: 12.0,
            min_fr: 0.0,
            max_fr: 1.0,
        }
    }
}

/// Preferred boundary of one cell.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundaryTuning {
    /// Preferred direction in radians
    pub angle: f64,
    pub angle_spread: f64,
    /// Preferred distance in metres
    pub distance: f64,
    pub distance_spread: f64,
}

impl BoundaryTuning {
    fn response(&self, direction_angle: f64, wall_distance: f64) -> f64 {
        let d = wall_distance - self.distance;
        let gaussian = (-(d * d) / (2.0 * self.distance_spread * self.distance_spread)).exp();
        let kappa = 1.0 / (self.angle_spread * self.angle_spread);
        let von_mises = (kappa * ((direction_angle - self.angle).cos() - 1.0)).exp();
        gaussian * von_mises
    }
}

/// A population of boundary vector cells bound to one arena's walls.
#[derive(Debug, Clone)]
pub struct BoundaryVectorCells {
    walls: Vec<Wall>,
    tunings: Vec<BoundaryTuning>,
    norms: Vec<f64>,
    min_fr: f64,
    max_fr: f64,
}

impl BoundaryVectorCells {
    pub fn from_config(
        config: &BoundaryCellConfig,
        environment: &BoxEnvironment,
        rng: &mut dyn RngCore,
    ) -> Result<Self> {
        if !(config.beta > 0.0 && config.xi >= 0.0 && config.preferred_wall_distance_mean > 0.0) {
            return Err(Error::invalid_config(
                "boundary cell beta and preferred distance must be positive",
            ));
        }
        let angle_spread = config.angle_spread_degrees.to_radians();
        let tunings = (0..config.n)
            .map(|_| {
                let angle = rng.random::<f64>() * TAU;
                // inverse Rayleigh CDF
                let u: f64 = rng.random();
                let distance =
                    config.preferred_wall_distance_mean * (-2.0 * (1.0 - u).ln()).sqrt();
                BoundaryTuning {
                    angle,
                    angle_spread,
                    distance,
                    distance_spread: distance / config.beta + config.xi,
                }
            })
            .collect();
        Self::new(environment, tunings)
            .map(|cells| cells.with_rate_range(config.min_fr, config.max_fr))
    }

    pub fn new(environment: &BoxEnvironment, tunings: Vec<BoundaryTuning>) -> Result<Self> {
        if tunings.is_empty() {
            return Err(Error::invalid_config("boundary cell population is empty"));
        }
        if tunings.iter().any(|t| !(t.angle_spread > 0.0 && t.distance_spread > 0.0)) {
            return Err(Error::invalid_config(
                "boundary cell tuning widths must be positive",
            ));
        }

        let mut cells = Self {
            walls: environment.walls().to_vec(),
            norms: vec![1.0; tunings.len()],
            tunings,
            min_fr: 0.0,
            max_fr: 1.0,
        };

        let mut norms = vec![0.0f64; cells.tunings.len()];
        for position in environment.discretise(NORMALISATION_DX) {
            for (norm, rate) in norms.iter_mut().zip(cells.raw_rates(position)) {
                *norm = norm.max(rate);
            }
        }
        if let Some(idx) = norms.iter().position(|&n| n.is_nan() || n <= 0.0) {
            return Err(Error::invalid_config(format!(
                "boundary cell {idx} never fires in this arena"
            )));
        }
        cells.norms = norms;
        Ok(cells)
    }

    pub fn with_rate_range(mut self, min_fr: f64, max_fr: f64) -> Self {
        self.min_fr = min_fr;
        self.max_fr = max_fr;
        self
    }

    pub fn tunings(&self) -> &[BoundaryTuning] {
        &self.tunings
    }

    /// Distance to the closest wall ahead in each test direction.
    fn first_wall_distances(&self, position: Position) -> Vec<(f64, Option<f64>)> {
        (0..TEST_DIRECTIONS)
            .map(|i| {
                let angle = TAU * i as f64 / TEST_DIRECTIONS as f64;
                let direction = Vec2::from_angle(angle);
                let closest = self
                    .walls
                    .iter()
                    .filter_map(|wall| wall.ray_distance(position, direction))
                    .min_by(f64::total_cmp);
                (angle, closest)
            })
            .collect()
    }

    fn raw_rates(&self, position: Position) -> Vec<f64> {
        let sweep = self.first_wall_distances(position);
        self.tunings
            .iter()
            .zip(&self.norms)
            .map(|(tuning, norm)| {
                let total: f64 = sweep
                    .iter()
                    .filter_map(|&(angle, distance)| {
                        distance.map(|d| tuning.response(angle, d))
                    })
                    .sum();
                total / norm
            })
            .collect()
    }
}

impl FeatureSource for BoundaryVectorCells {
    fn dimension(&self) -> usize {
        self.tunings.len()
    }

    fn evaluate(&self, position: Position) -> Vec<f64> {
        let scale = self.max_fr - self.min_fr;
        self.raw_rates(position)
            .into_iter()
            .map(|rate| rate * scale + self.min_fr)
            .collect()
    }

    fn name(&self) -> &str {
        "boundary vector cells"
    }
}

#[cfg(test)]
mod tests {
    use rand::{SeedableRng, rngs::StdRng};

    use super::*;
    use crate::adapters::EnvironmentConfig;

    fn east_cell() -> BoundaryTuning {
        BoundaryTuning {
            angle: 0.0,
            angle_spread: 11.25f64.to_radians(),
            distance: 0.1,
            distance_spread: 0.1 / 12.0 + 0.08,
        }
    }

    fn unit_box() -> BoxEnvironment {
        BoxEnvironment::new(EnvironmentConfig::default()).unwrap()
    }

    #[test]
    fn prefers_positions_with_the_tuned_wall_ahead() {
        let cells = BoundaryVectorCells::new(&unit_box(), vec![east_cell()]).unwrap();
        let near_east = cells.evaluate(Position::new(0.9, 0.5))[0];
        let near_west = cells.evaluate(Position::new(0.1, 0.5))[0];
        assert!(near_east > 0.5, "rate {near_east}");
        assert!(near_west < 0.1 * near_east);
    }

    #[test]
    fn rates_peak_at_one_over_the_normalisation_grid() {
        let environment = unit_box();
        let cells = BoundaryVectorCells::new(&environment, vec![east_cell()]).unwrap();
        let peak = environment
            .discretise(NORMALISATION_DX)
            .into_iter()
            .map(|p| cells.evaluate(p)[0])
            .fold(0.0, f64::max);
        assert!((peak - 1.0).abs() < 1e-12);
    }

    #[test]
    fn config_builds_requested_population() {
        let config = BoundaryCellConfig {
            n: 3,
            ..BoundaryCellConfig::default()
        };
        let cells =
            BoundaryVectorCells::from_config(&config, &unit_box(), &mut StdRng::seed_from_u64(8))
                .unwrap();
        assert_eq!(cells.dimension(), 3);
        for tuning in cells.tunings() {
            assert!(tuning.distance >= 0.0);
            assert!((tuning.distance_spread - (tuning.distance / 12.0 + 0.08)).abs() < 1e-12);
        }
        assert!(cells.evaluate(Position::new(0.5, 0.5)).iter().all(|r| r.is_finite()));
    }

    #[test]
    fn empty_population_is_rejected() {
        assert!(BoundaryVectorCells::new(&unit_box(), Vec::new()).is_err());
    }
}
