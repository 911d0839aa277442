//! Single-episode tick loop
//!
//! An episode starts when the agent is relocated to a start position and
//! ends either stochastically, with a per-tick probability proportional to
//! the reward at the agent's position, or when its tick budget runs out.

use rand::{Rng, RngCore};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::{
    Error, Result,
    ports::{Environment, FeatureSource, MotionController, RewardSource},
    td::{DRIFT_SPEED_FACTOR, PolicyAdvisor, ValueEstimator},
    types::{Position, Vec2},
};

/// Lower bound of the exploration ratio.
pub const MIN_EXPLORATION_RATIO: f64 = 0.1;

/// Upper bound of the exploration ratio.
pub const MAX_EXPLORATION_RATIO: f64 = 1.0;

/// Factor applied to the exploration ratio after each successful episode.
pub const SUCCESS_RATIO_GROWTH: f64 = 1.1;

/// Episode configuration
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EpisodeConfig {
    /// Tick length in seconds
    pub dt: f64,
    /// Episode timeout in seconds
    pub max_t: f64,
    /// Whether the estimator learns during the episode
    pub training: bool,
    /// Head straight for the goal when closer than this radius
    pub proximity_radius: Option<f64>,
}

impl Default for EpisodeConfig {
    fn default() -> Self {
        Self {
            dt: 0.05,
            max_t: 60.0,
            training: true,
            proximity_radius: None,
        }
    }
}

impl EpisodeConfig {
    pub fn with_training(mut self, training: bool) -> Self {
        self.training = training;
        self
    }

    pub fn with_proximity_radius(mut self, radius: f64) -> Self {
        self.proximity_radius = Some(radius);
        self
    }

    pub fn validate(&self) -> Result<()> {
        if !(self.dt > 0.0 && self.dt.is_finite()) {
            return Err(Error::InvalidTimestep { dt: self.dt });
        }
        if !(self.max_t > 0.0 && self.max_t.is_finite()) {
            return Err(Error::invalid_config(format!(
                "episode timeout must be positive, got {}",
                self.max_t
            )));
        }
        if let Some(radius) = self.proximity_radius
            && (radius.is_nan() || radius < 0.0)
        {
            return Err(Error::invalid_config(format!(
                "proximity radius must be non-negative, got {radius}"
            )));
        }
        Ok(())
    }

    /// Number of ticks after which an episode times out, `round(max_t / dt)`.
    pub fn tick_budget(&self) -> usize {
        ((self.max_t / self.dt).round() as usize).max(1)
    }
}

/// How an episode ended
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EpisodeOutcome {
    Success,
    Timeout,
}

impl EpisodeOutcome {
    pub fn is_success(self) -> bool {
        self == EpisodeOutcome::Success
    }
}

/// One finished episode. Never mutated once appended to an [`EpisodeLog`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EpisodeRecord {
    /// Index of the episode across the whole run
    pub episode: usize,
    /// Batch the episode belongs to
    pub batch: usize,
    pub outcome: EpisodeOutcome,
    pub ticks: usize,
    pub start_time: f64,
    pub end_time: f64,
    pub start_position: Position,
    pub end_position: Position,
    /// Exploration ratio the episode was run with
    pub exploration_ratio: f64,
}

impl EpisodeRecord {
    pub fn duration(&self) -> f64 {
        self.end_time - self.start_time
    }
}

/// Append-only list of finished episodes.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EpisodeLog {
    records: Vec<EpisodeRecord>,
}

impl EpisodeLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, record: EpisodeRecord) -> &EpisodeRecord {
        self.records.push(record);
        &self.records[self.records.len() - 1]
    }

    pub fn records(&self) -> &[EpisodeRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn last(&self) -> Option<&EpisodeRecord> {
        self.records.last()
    }

    pub fn successes(&self) -> usize {
        self.records.iter().filter(|r| r.outcome.is_success()).count()
    }

    /// Records of a single batch, in order.
    pub fn batch(&self, batch: usize) -> impl Iterator<Item = &EpisodeRecord> {
        self.records.iter().filter(move |r| r.batch == batch)
    }
}

/// Exploration schedule shared by consecutive episodes.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TrainingState {
    exploration_ratio: f64,
}

impl TrainingState {
    /// Start from `exploration_ratio`, clamped into the valid range.
    pub fn new(exploration_ratio: f64) -> Self {
        Self {
            exploration_ratio: clamp_ratio(exploration_ratio),
        }
    }

    pub fn exploration_ratio(&self) -> f64 {
        self.exploration_ratio
    }

    /// Grow the ratio after a success, then clamp regardless of outcome.
    pub fn record_outcome(&mut self, outcome: EpisodeOutcome) {
        let mut ratio = self.exploration_ratio;
        if outcome.is_success() {
            ratio *= SUCCESS_RATIO_GROWTH;
        }
        self.exploration_ratio = clamp_ratio(ratio);
    }
}

impl Default for TrainingState {
    fn default() -> Self {
        Self::new(MIN_EXPLORATION_RATIO)
    }
}

fn clamp_ratio(ratio: f64) -> f64 {
    if ratio.is_nan() {
        return MIN_EXPLORATION_RATIO;
    }
    ratio.clamp(MIN_EXPLORATION_RATIO, MAX_EXPLORATION_RATIO)
}

/// The collaborators an episode talks to.
pub struct Collaborators<'a> {
    pub environment: &'a dyn Environment,
    pub features: &'a dyn FeatureSource,
    pub reward: &'a dyn RewardSource,
    pub motion: &'a mut dyn MotionController,
}

/// Where and under which indices an episode starts.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EpisodeStart {
    pub episode: usize,
    pub batch: usize,
    pub position: Position,
}

/// Runs episodes against a frozen policy advisor.
#[derive(Debug, Clone)]
pub struct EpisodeController<'a> {
    config: EpisodeConfig,
    advisor: &'a PolicyAdvisor,
}

impl<'a> EpisodeController<'a> {
    pub fn new(config: EpisodeConfig, advisor: &'a PolicyAdvisor) -> Result<Self> {
        config.validate()?;
        Ok(Self { config, advisor })
    }

    pub fn config(&self) -> &EpisodeConfig {
        &self.config
    }

    /// Run one episode to completion and append its record to `log`.
    ///
    /// The exploration ratio in `state` is read once at entry and updated
    /// after the episode has ended.
    pub fn run<'l>(
        &self,
        start: EpisodeStart,
        estimator: &mut ValueEstimator,
        collaborators: &mut Collaborators<'_>,
        state: &mut TrainingState,
        log: &'l mut EpisodeLog,
        rng: &mut dyn RngCore,
    ) -> Result<&'l EpisodeRecord> {
        let features = collaborators.features;
        let reward = collaborators.reward;
        let motion = &mut *collaborators.motion;
        estimator.check_dimension(features.dimension(), features.name())?;

        let dt = self.config.dt;
        let budget = self.config.tick_budget();
        let end_rate = dt / reward.episode_end_time_constant();
        let exploration_ratio = state.exploration_ratio();

        motion.relocate(start.position);
        let start_time = motion.elapsed_time();
        let start_position = motion.position();
        estimator.reset_trace();
        estimator.prime(&features.evaluate(start_position));

        let mut ticks = 0;
        let outcome = loop {
            let position = motion.position();
            let drift = self.drift(position, features, reward, motion.mean_speed());
            motion.advance(drift, exploration_ratio, dt);
            ticks += 1;

            let position = motion.position();
            let phi = features.evaluate(position);
            let r = reward.evaluate(position);
            estimator.step(&phi, dt);
            if self.config.training {
                estimator.train(r, dt);
            }

            if rng.random::<f64>() < end_rate * r {
                break EpisodeOutcome::Success;
            }
            if ticks >= budget {
                break EpisodeOutcome::Timeout;
            }
        };

        let record = EpisodeRecord {
            episode: start.episode,
            batch: start.batch,
            outcome,
            ticks,
            start_time,
            end_time: motion.elapsed_time(),
            start_position,
            end_position: motion.position(),
            exploration_ratio,
        };
        debug!(
            episode = record.episode,
            batch = record.batch,
            outcome = ?record.outcome,
            ticks,
            duration = record.duration(),
            "episode finished"
        );

        state.record_outcome(outcome);
        Ok(log.push(record))
    }

    /// Drift for the next tick: the advisor's suggestion, replaced by a
    /// straight line to the goal inside the proximity radius.
    fn drift(
        &self,
        position: Position,
        features: &dyn FeatureSource,
        reward: &dyn RewardSource,
        mean_speed: f64,
    ) -> Option<Vec2> {
        let advised = self.advisor.advise(position, features, mean_speed);
        let (Some(radius), Some(goal)) = (self.config.proximity_radius, reward.goal()) else {
            return advised;
        };
        if position.distance(goal) >= radius {
            return advised;
        }
        (goal - position)
            .normalized()
            .map(|direction| direction * (DRIFT_SPEED_FACTOR * mean_speed))
            .or(advised)
    }
}
