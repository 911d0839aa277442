//! Rectangular arena with solid walls

use rand::{Rng, RngCore};
use serde::{Deserialize, Serialize};

use crate::{
    Error, Result,
    ports::Environment,
    types::{Position, Vec2, Wall},
};

/// Distance kept from the boundary when a position is pushed back inside.
const BOUNDARY_MARGIN: f64 = 0.01;

/// How [`BoxEnvironment::sample_positions`] scatters points.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SampleLayout {
    /// Evenly spaced grid
    Uniform,
    /// Grid with each point jittered by up to 45% of the spacing
    #[default]
    UniformJitter,
    /// Independent uniform draws
    Random,
}

/// Geometry of the arena.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EnvironmentConfig {
    /// Height of the arena in metres
    pub scale: f64,
    /// Width / height ratio
    pub aspect: f64,
    /// Grid spacing of the global sample used for `V_max`
    pub sample_dx: f64,
    /// Interior walls in addition to the boundary
    pub walls: Vec<Wall>,
}

impl Default for EnvironmentConfig {
    fn default() -> Self {
        Self {
            scale: 1.0,
            aspect: 1.0,
            sample_dx: 0.02,
            walls: Vec::new(),
        }
    }
}

/// A 2D box `[0, aspect·scale] × [0, scale]` with solid boundaries.
#[derive(Debug, Clone)]
pub struct BoxEnvironment {
    config: EnvironmentConfig,
    walls: Vec<Wall>,
}

impl BoxEnvironment {
    pub fn new(config: EnvironmentConfig) -> Result<Self> {
        if !(config.scale > 0.0 && config.aspect > 0.0) {
            return Err(Error::invalid_config(format!(
                "arena scale and aspect must be positive, got {} and {}",
                config.scale, config.aspect
            )));
        }
        if config.sample_dx.is_nan() || config.sample_dx <= 0.0 {
            return Err(Error::invalid_config(format!(
                "global sample spacing must be positive, got {}",
                config.sample_dx
            )));
        }

        let (w, h) = (config.aspect * config.scale, config.scale);
        let mut walls = vec![
            Wall::new(Vec2::new(0.0, 0.0), Vec2::new(0.0, h)),
            Wall::new(Vec2::new(0.0, h), Vec2::new(w, h)),
            Wall::new(Vec2::new(w, h), Vec2::new(w, 0.0)),
            Wall::new(Vec2::new(w, 0.0), Vec2::new(0.0, 0.0)),
        ];
        walls.extend(config.walls.iter().copied());

        Ok(Self { config, walls })
    }

    pub fn config(&self) -> &EnvironmentConfig {
        &self.config
    }

    /// `[x_min, x_max, y_min, y_max]`
    pub fn extent(&self) -> [f64; 4] {
        [0.0, self.config.aspect * self.config.scale, 0.0, self.config.scale]
    }

    pub fn centre(&self) -> Position {
        let [x0, x1, y0, y1] = self.extent();
        Position::new((x0 + x1) / 2.0, (y0 + y1) / 2.0)
    }

    /// Boundary walls followed by interior walls.
    pub fn walls(&self) -> &[Wall] {
        &self.walls
    }

    pub fn add_wall(&mut self, wall: Wall) {
        self.config.walls.push(wall);
        self.walls.push(wall);
    }

    /// Strictly inside the box; points on the edge are outside.
    pub fn contains(&self, position: Position) -> bool {
        let [x0, x1, y0, y1] = self.extent();
        position.x > x0 && position.x < x1 && position.y > y0 && position.y < y1
    }

    /// First wall crossed by the step `from -> to`, if any.
    pub fn first_collision(&self, from: Position, to: Position) -> Option<&Wall> {
        self.walls.iter().find(|wall| wall.intersects_step(from, to))
    }

    /// Pull a position that escaped the box back to just inside it.
    pub fn apply_boundary_conditions(&self, position: Position) -> Position {
        if self.contains(position) {
            return position;
        }
        let [x0, x1, y0, y1] = self.extent();
        Position::new(
            position.x.clamp(x0 + BOUNDARY_MARGIN, x1 - BOUNDARY_MARGIN),
            position.y.clamp(y0 + BOUNDARY_MARGIN, y1 - BOUNDARY_MARGIN),
        )
    }

    /// Scatter `n` positions across the arena.
    ///
    /// Grid layouts use spacing `sqrt(area / n)`; when `n` does not fill a
    /// grid exactly the remainder is placed at random.
    pub fn sample_positions(
        &self,
        n: usize,
        layout: SampleLayout,
        rng: &mut dyn RngCore,
    ) -> Vec<Position> {
        if n == 0 {
            return Vec::new();
        }
        let [x0, x1, y0, y1] = self.extent();

        if layout == SampleLayout::Random {
            return (0..n)
                .map(|_| {
                    Position::new(
                        x0 + rng.random::<f64>() * (x1 - x0),
                        y0 + rng.random::<f64>() * (y1 - y0),
                    )
                })
                .collect();
        }

        let delta = ((x1 - x0) * (y1 - y0) / n as f64).sqrt();
        let mut positions = grid(x0, x1, y0, y1, delta);
        positions.truncate(n);

        if layout == SampleLayout::UniformJitter {
            let jitter = 0.45 * delta;
            for position in &mut positions {
                position.x += rng.random_range(-jitter..jitter);
                position.y += rng.random_range(-jitter..jitter);
            }
        }

        let remaining = n - positions.len();
        if remaining > 0 {
            positions.extend(self.sample_positions(remaining, SampleLayout::Random, rng));
        }
        positions
    }

    /// Centres of a square grid of cells with side `dx`.
    pub fn discretise(&self, dx: f64) -> Vec<Position> {
        let [x0, x1, y0, y1] = self.extent();
        grid(x0, x1, y0, y1, dx)
    }
}

/// Cell centres from `lo + delta/2` up to `hi - delta/2` along both axes.
fn grid(x0: f64, x1: f64, y0: f64, y1: f64, delta: f64) -> Vec<Position> {
    let axis = |lo: f64, hi: f64| -> Vec<f64> {
        let count = (((hi - lo) / delta) + 1e-6).floor() as usize;
        (0..count)
            .map(|i| lo + delta / 2.0 + i as f64 * delta)
            .collect()
    };
    let xs = axis(x0, x1);
    let ys = axis(y0, y1);
    ys.iter()
        .flat_map(|&y| xs.iter().map(move |&x| Position::new(x, y)))
        .collect()
}

impl Environment for BoxEnvironment {
    fn sample_random_position(&self, rng: &mut dyn RngCore) -> Position {
        let [x0, x1, y0, y1] = self.extent();
        let position = Position::new(
            x0 + rng.random::<f64>() * (x1 - x0),
            y0 + rng.random::<f64>() * (y1 - y0),
        );
        self.apply_boundary_conditions(position)
    }

    fn global_sample(&self) -> Vec<Position> {
        self.discretise(self.config.sample_dx)
    }
}

#[cfg(test)]
mod tests {
    use rand::{SeedableRng, rngs::StdRng};

    use super::*;

    fn unit_box() -> BoxEnvironment {
        BoxEnvironment::new(EnvironmentConfig::default()).unwrap()
    }

    #[test]
    fn uniform_layout_fills_square_grid() {
        let env = unit_box();
        let mut rng = StdRng::seed_from_u64(1);
        let positions = env.sample_positions(16, SampleLayout::Uniform, &mut rng);
        assert_eq!(positions.len(), 16);
        assert!((positions[0].x - 0.125).abs() < 1e-12);
        assert!((positions[0].y - 0.125).abs() < 1e-12);
    }

    #[test]
    fn non_square_counts_are_topped_up_randomly() {
        let env = unit_box();
        let mut rng = StdRng::seed_from_u64(2);
        let positions = env.sample_positions(10, SampleLayout::UniformJitter, &mut rng);
        assert_eq!(positions.len(), 10);
        assert!(positions.iter().all(|&p| env.contains(p)));
    }

    #[test]
    fn random_starts_are_inside() {
        let env = unit_box();
        let mut rng = StdRng::seed_from_u64(3);
        for _ in 0..200 {
            assert!(env.contains(env.sample_random_position(&mut rng)));
        }
    }

    #[test]
    fn boundary_conditions_clamp_one_centimetre_inside() {
        let env = unit_box();
        let clamped = env.apply_boundary_conditions(Position::new(1.3, -0.2));
        assert_eq!(clamped, Position::new(0.99, 0.01));
    }

    #[test]
    fn interior_wall_blocks_steps() {
        let mut env = unit_box();
        env.add_wall(Wall::new(Vec2::new(0.5, 0.0), Vec2::new(0.5, 0.8)));
        assert!(
            env.first_collision(Position::new(0.45, 0.4), Position::new(0.55, 0.4))
                .is_some()
        );
        assert!(
            env.first_collision(Position::new(0.45, 0.9), Position::new(0.55, 0.9))
                .is_none()
        );
    }

    #[test]
    fn global_sample_covers_arena() {
        let env = unit_box();
        let sample = env.global_sample();
        assert_eq!(sample.len(), 50 * 50);
    }

    #[test]
    fn rejects_degenerate_arena() {
        let config = EnvironmentConfig {
            scale: 0.0,
            ..EnvironmentConfig::default()
        };
        assert!(BoxEnvironment::new(config).is_err());
    }
}
