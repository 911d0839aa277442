//! Random-foraging motion model
//!
//! Heading and speed follow independent Ornstein-Uhlenbeck processes: the
//! rotational velocity directly, and the speed through a Gaussian variable
//! mapped onto a Rayleigh distribution so speeds stay positive. A requested
//! drift velocity pulls the velocity towards it, walls repel the agent, and
//! steps that would cross a wall bounce off it instead.

use rand::{Rng, rngs::StdRng};
use rand_distr::StandardNormal;
use serde::{Deserialize, Serialize};
use statrs::distribution::{ContinuousCDF, Normal};

use super::environment::BoxEnvironment;
use crate::{
    Error, Result,
    ports::{Environment, MotionController},
    types::{Position, Vec2},
    utils::build_rng,
};

/// Timescale of the running average of measured speed.
const SPEED_AVERAGE_TIMESCALE: f64 = 10.0;

/// Keeps probabilities away from 0 and 1 when crossing distributions.
const PROBABILITY_EPSILON: f64 = 1e-12;

/// Parameters of the motion model. Defaults match rodent foraging data.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MotionConfig {
    /// Mean speed in m/s
    pub speed_mean: f64,
    /// Speed spread at initialisation
    pub speed_std: f64,
    /// Time over which speed decorrelates
    pub speed_coherence_time: f64,
    /// Time over which rotational velocity decorrelates
    pub rotational_velocity_coherence_time: f64,
    /// Standard deviation of rotational velocity in rad/s
    pub rotational_velocity_std: f64,
    /// Tendency to linger near walls, 0 (none) to 1 (maximal)
    pub thigmotaxis: f64,
    /// Distance below which walls start repelling
    pub wall_repel_distance: f64,
    pub walls_repel: bool,
}

impl Default for MotionConfig {
    fn default() -> Self {
        Self {
            speed_mean: 0.08,
            speed_std: 0.08,
            speed_coherence_time: 0.7,
            rotational_velocity_coherence_time: 0.08,
            rotational_velocity_std: 120.0_f64.to_radians(),
            thigmotaxis: 0.5,
            wall_repel_distance: 0.1,
            walls_repel: true,
        }
    }
}

/// Agent moving through a [`BoxEnvironment`] by random foraging plus drift.
#[derive(Debug, Clone)]
pub struct RandomMotionAgent {
    environment: BoxEnvironment,
    config: MotionConfig,
    position: Position,
    velocity: Vec2,
    rotational_velocity: f64,
    t: f64,
    distance_travelled: f64,
    measured_speed: f64,
    normal: Normal,
    rng: StdRng,
}

impl RandomMotionAgent {
    /// Place a new agent at a random position with a random heading.
    pub fn new(environment: BoxEnvironment, config: MotionConfig, seed: Option<u64>) -> Result<Self> {
        if !(config.speed_mean > 0.0 && config.speed_coherence_time > 0.0) {
            return Err(Error::invalid_config(format!(
                "speed mean and coherence time must be positive, got {} and {}",
                config.speed_mean, config.speed_coherence_time
            )));
        }
        if !(config.rotational_velocity_coherence_time > 0.0 && config.wall_repel_distance > 0.0) {
            return Err(Error::invalid_config(
                "rotational coherence time and wall repel distance must be positive",
            ));
        }
        let normal = Normal::standard();

        let mut rng = build_rng(seed);
        let position = environment.sample_random_position(&mut rng);
        let heading = rng.random_range(0.0..std::f64::consts::TAU);
        let velocity = Vec2::from_angle(heading) * config.speed_std;

        Ok(Self {
            environment,
            config,
            position,
            velocity,
            rotational_velocity: 0.0,
            t: 0.0,
            distance_travelled: 0.0,
            measured_speed: config.speed_mean.max(config.speed_std),
            normal,
            rng,
        })
    }

    pub fn config(&self) -> &MotionConfig {
        &self.config
    }

    pub fn velocity(&self) -> Vec2 {
        self.velocity
    }

    pub fn distance_travelled(&self) -> f64 {
        self.distance_travelled
    }

    /// Exponentially averaged speed of the steps actually taken.
    pub fn measured_speed(&self) -> f64 {
        self.measured_speed
    }

    fn standard_normal(&mut self) -> f64 {
        self.rng.sample(StandardNormal)
    }

    /// Increment of an Ornstein-Uhlenbeck process over one tick.
    fn ornstein_uhlenbeck(
        &mut self,
        dt: f64,
        x: f64,
        drift: f64,
        noise_scale: f64,
        coherence_time: f64,
    ) -> f64 {
        let sigma = ((2.0 * noise_scale * noise_scale) / (coherence_time * dt)).sqrt();
        let theta = 1.0 / coherence_time;
        theta * (drift - x) * dt + sigma * dt * self.standard_normal()
    }

    fn rayleigh_to_normal(&self, speed: f64) -> f64 {
        let sigma = self.config.speed_mean;
        let speed = speed.max(1e-6);
        let u = 1.0 - (-(speed * speed) / (2.0 * sigma * sigma)).exp();
        self.normal
            .inverse_cdf(u.clamp(PROBABILITY_EPSILON, 1.0 - PROBABILITY_EPSILON))
    }

    fn normal_to_rayleigh(&self, x: f64) -> f64 {
        let sigma = self.config.speed_mean;
        let u = self
            .normal
            .cdf(x)
            .clamp(PROBABILITY_EPSILON, 1.0 - PROBABILITY_EPSILON);
        sigma * (-2.0 * (1.0 - u).ln()).sqrt()
    }

    fn update_heading(&mut self, dt: f64) {
        let increment = self.ornstein_uhlenbeck(
            dt,
            self.rotational_velocity,
            0.0,
            self.config.rotational_velocity_std,
            self.config.rotational_velocity_coherence_time,
        );
        self.rotational_velocity += increment;
        self.velocity = self.velocity.rotate(self.rotational_velocity * dt);
    }

    fn update_speed(&mut self, dt: f64) {
        let speed = self.velocity.norm();
        let normal_variable = self.rayleigh_to_normal(speed);
        let increment = self.ornstein_uhlenbeck(
            dt,
            normal_variable,
            0.0,
            1.0,
            self.config.speed_coherence_time,
        );
        let new_speed = self.normal_to_rayleigh(normal_variable + increment);
        self.velocity = match self.velocity.normalized() {
            Some(direction) => direction * new_speed,
            None => {
                let heading = self.rng.random_range(0.0..std::f64::consts::TAU);
                Vec2::from_angle(heading) * new_speed
            }
        };
    }

    /// Relax the velocity towards `drift`; a larger ratio relaxes faster.
    fn apply_drift(&mut self, drift: Vec2, exploration_ratio: f64, dt: f64) {
        let coherence_time = self.config.speed_coherence_time / exploration_ratio.max(1e-6);
        self.velocity += (drift - self.velocity) * (dt / coherence_time);
    }

    /// Spring acceleration away from nearby walls plus a conveyor-belt shift
    /// of the position, split by the thigmotaxis parameter.
    fn repel_from_walls(&mut self, dt: f64) {
        let d = self.config.wall_repel_distance;
        let v = self.config.speed_mean;
        let spring_constant = v * v / (d * d);

        let mut acceleration = Vec2::ZERO;
        let mut belt_speed = Vec2::ZERO;
        for wall in self.environment.walls() {
            let away = wall.vector_to(self.position);
            let distance = away.norm();
            if distance > d {
                continue;
            }
            let Some(unit) = away.normalized() else {
                continue;
            };
            acceleration += unit * (spring_constant * (d - distance));
            let overlap = (d - distance) / d;
            belt_speed += unit * (v * (1.0 - (1.0 - overlap * overlap).max(0.0).sqrt()));
        }

        let thigmotaxis = self.config.thigmotaxis;
        self.velocity += acceleration * (3.0 * (1.0 - thigmotaxis).powi(2) * dt);
        self.position += belt_speed * (6.0 * thigmotaxis.powi(2) * dt);
    }

    fn take_step(&mut self, dt: f64) {
        let proposed = self.position + self.velocity * dt;
        match self.environment.first_collision(self.position, proposed) {
            None => self.position = proposed,
            Some(wall) => {
                let bounced = wall.bounce(self.velocity);
                self.velocity = match bounced.normalized() {
                    Some(direction) => direction * (0.5 * self.config.speed_mean),
                    None => Vec2::ZERO,
                };
                self.position += self.velocity * dt;
            }
        }
        if !self.environment.contains(self.position) {
            self.position = self.environment.apply_boundary_conditions(self.position);
        }
    }
}

impl MotionController for RandomMotionAgent {
    fn advance(&mut self, drift: Option<Vec2>, exploration_ratio: f64, dt: f64) {
        let last_position = self.position;
        self.t += dt;

        self.update_heading(dt);
        self.update_speed(dt);
        if let Some(drift) = drift {
            self.apply_drift(drift, exploration_ratio, dt);
        }
        if self.config.walls_repel {
            self.repel_from_walls(dt);
        }
        self.take_step(dt);

        let shift = self.position - last_position;
        self.distance_travelled += shift.norm();
        let k = dt / SPEED_AVERAGE_TIMESCALE;
        self.measured_speed = (1.0 - k) * self.measured_speed + k * shift.norm() / dt;
    }

    fn position(&self) -> Position {
        self.position
    }

    fn elapsed_time(&self) -> f64 {
        self.t
    }

    fn mean_speed(&self) -> f64 {
        self.config.speed_mean
    }

    fn relocate(&mut self, position: Position) {
        self.position = self.environment.apply_boundary_conditions(position);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::EnvironmentConfig;

    fn agent(seed: u64) -> RandomMotionAgent {
        let env = BoxEnvironment::new(EnvironmentConfig::default()).unwrap();
        RandomMotionAgent::new(env, MotionConfig::default(), Some(seed)).unwrap()
    }

    #[test]
    fn agent_stays_inside_arena() {
        let mut agent = agent(11);
        let env = agent.environment.clone();
        for _ in 0..5_000 {
            agent.advance(None, 1.0, 0.05);
            assert!(env.contains(agent.position()), "escaped to {}", agent.position());
        }
        assert!((agent.elapsed_time() - 250.0).abs() < 1e-6);
        assert!(agent.distance_travelled() > 0.0);
    }

    #[test]
    fn same_seed_gives_same_trajectory() {
        let mut a = agent(5);
        let mut b = agent(5);
        for _ in 0..200 {
            a.advance(Some(Vec2::new(0.1, 0.0)), 0.5, 0.05);
            b.advance(Some(Vec2::new(0.1, 0.0)), 0.5, 0.05);
        }
        assert_eq!(a.position(), b.position());
    }

    #[test]
    fn strong_drift_moves_agent_along_it() {
        let mut agent = agent(21);
        agent.relocate(Position::new(0.2, 0.5));
        for _ in 0..100 {
            agent.advance(Some(Vec2::new(0.24, 0.0)), 1.0, 0.05);
        }
        assert!(agent.position().x > 0.4, "ended at {}", agent.position());
    }

    #[test]
    fn speed_transform_roundtrips() {
        let agent = agent(1);
        let speed = 0.12;
        let back = agent.normal_to_rayleigh(agent.rayleigh_to_normal(speed));
        assert!((back - speed).abs() < 1e-6);
    }

    #[test]
    fn relocate_clamps_into_arena() {
        let mut agent = agent(2);
        agent.relocate(Position::new(-1.0, 2.0));
        assert_eq!(agent.position(), Position::new(0.01, 0.99));
    }
}
