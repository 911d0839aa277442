//! Linear value estimator trained by continuous-time TD(λ)
//!
//! The value of a position is a linear read-out of its feature vector,
//! `V = w · φ`. Learning follows the continuous-time TD rule
//!
//! ```text
//! δ  = r + τ dV/dt − V
//! e ← (dt/τ_e) φ + (1 − dt/τ_e) e
//! w ← w + dt η δ e − λ w
//! ```
//!
//! where `e` is an eligibility trace of recent feature activity and `λ` an
//! L2 shrinkage applied on every update.

use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// Default L2 shrinkage applied to the weights on every training tick.
pub const DEFAULT_L2_PENALTY: f64 = 1e-4;

/// Hyperparameters of the value estimator.
///
/// # Examples
///
/// ```
/// use tdnav::td::EstimatorConfig;
///
/// let config = EstimatorConfig::default().with_discount_horizon(5.0);
/// assert_eq!(config.tau, 5.0);
/// assert_eq!(config.l2, 1e-4);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EstimatorConfig {
    /// Discount horizon τ in seconds
    pub tau: f64,
    /// Eligibility trace timescale τ_e in seconds
    pub tau_e: f64,
    /// Learning rate η
    pub eta: f64,
    /// L2 penalty λ
    pub l2: f64,
}

impl Default for EstimatorConfig {
    fn default() -> Self {
        Self {
            tau: 10.0,
            tau_e: 5.0,
            eta: 1e-4,
            l2: DEFAULT_L2_PENALTY,
        }
    }
}

impl EstimatorConfig {
    pub fn with_discount_horizon(mut self, tau: f64) -> Self {
        self.tau = tau;
        self
    }

    pub fn with_trace_timescale(mut self, tau_e: f64) -> Self {
        self.tau_e = tau_e;
        self
    }

    pub fn with_learning_rate(mut self, eta: f64) -> Self {
        self.eta = eta;
        self
    }

    pub fn validate(&self) -> Result<()> {
        if !(self.tau > 0.0 && self.tau.is_finite()) {
            return Err(Error::invalid_config(format!(
                "discount horizon tau must be positive, got {}",
                self.tau
            )));
        }
        if !(self.tau_e > 0.0 && self.tau_e.is_finite()) {
            return Err(Error::invalid_config(format!(
                "trace timescale tau_e must be positive, got {}",
                self.tau_e
            )));
        }
        if !(self.eta >= 0.0 && self.eta.is_finite()) {
            return Err(Error::invalid_config(format!(
                "learning rate eta must be non-negative, got {}",
                self.eta
            )));
        }
        if !(self.l2 >= 0.0 && self.l2.is_finite()) {
            return Err(Error::invalid_config(format!(
                "L2 penalty must be non-negative, got {}",
                self.l2
            )));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub(crate) struct EstimatorState {
    pub config: EstimatorConfig,
    pub weights: Vec<f64>,
}

/// Linear value estimator with an eligibility trace.
///
/// The number of features N is fixed at construction: the weight vector
/// and the trace always have length N.
#[derive(Debug, Clone)]
pub struct ValueEstimator {
    config: EstimatorConfig,
    weights: Vec<f64>,
    trace: Vec<f64>,
    /// Value computed by the most recent `step` (V_prev for the next one)
    value: f64,
    /// dV/dt computed by the most recent `step`
    derivative: f64,
}

impl ValueEstimator {
    /// Create an estimator over `dimension` features with zero weights.
    pub fn new(dimension: usize, config: EstimatorConfig) -> Result<Self> {
        Self::with_weights(vec![0.0; dimension], config)
    }

    /// Create an estimator with explicit initial weights.
    pub fn with_weights(weights: Vec<f64>, config: EstimatorConfig) -> Result<Self> {
        config.validate()?;
        if weights.is_empty() {
            return Err(Error::invalid_config(
                "value estimator needs at least one feature",
            ));
        }
        let dimension = weights.len();
        Ok(Self {
            config,
            weights,
            trace: vec![0.0; dimension],
            value: 0.0,
            derivative: 0.0,
        })
    }

    /// Number of input features N.
    pub fn dimension(&self) -> usize {
        self.weights.len()
    }

    pub fn config(&self) -> &EstimatorConfig {
        &self.config
    }

    pub fn weights(&self) -> &[f64] {
        &self.weights
    }

    pub fn trace(&self) -> &[f64] {
        &self.trace
    }

    /// Value computed by the most recent [`step`](Self::step).
    pub fn value(&self) -> f64 {
        self.value
    }

    /// Time derivative of the value computed by the most recent step.
    pub fn derivative(&self) -> f64 {
        self.derivative
    }

    /// Fail with [`Error::DimensionMismatch`] unless `got` equals N.
    pub fn check_dimension(&self, got: usize, context: &str) -> Result<()> {
        if got != self.dimension() {
            return Err(Error::DimensionMismatch {
                expected: self.dimension(),
                got,
                context: context.to_string(),
            });
        }
        Ok(())
    }

    /// Value of an arbitrary feature vector under the current weights.
    pub fn value_of(&self, features: &[f64]) -> f64 {
        dot(&self.weights, features)
    }

    /// Advance value, derivative and trace by one tick. Weights are untouched.
    ///
    /// Must be called exactly once per tick. The length of `features` is
    /// validated once by the caller, not here.
    pub fn step(&mut self, features: &[f64], dt: f64) {
        debug_assert_eq!(features.len(), self.weights.len());
        let value = self.value_of(features);
        self.derivative = (value - self.value) / dt;
        self.value = value;

        let k = dt / self.config.tau_e;
        for (e, &f) in self.trace.iter_mut().zip(features) {
            *e = k * f + (1.0 - k) * *e;
        }
    }

    /// Apply the TD weight update using the values of the last `step`.
    ///
    /// Returns the TD error δ.
    pub fn train(&mut self, reward: f64, dt: f64) -> f64 {
        let td_error = reward + self.config.tau * self.derivative - self.value;
        let gain = dt * self.config.eta * td_error;
        let l2 = self.config.l2;
        for (w, &e) in self.weights.iter_mut().zip(&self.trace) {
            *w += gain * e - l2 * *w;
        }
        td_error
    }

    /// Zero the eligibility trace. Called once at the start of each episode.
    pub fn reset_trace(&mut self) {
        self.trace.iter_mut().for_each(|e| *e = 0.0);
    }

    /// Set the previous value to that of `features` without learning.
    ///
    /// The episode controller calls this after relocating the agent so the
    /// first derivative of an episode is not taken across a teleport.
    pub fn prime(&mut self, features: &[f64]) {
        debug_assert_eq!(features.len(), self.weights.len());
        self.value = self.value_of(features);
        self.derivative = 0.0;
    }

    pub(crate) fn export_state(&self) -> EstimatorState {
        EstimatorState {
            config: self.config,
            weights: self.weights.clone(),
        }
    }

    pub(crate) fn from_state(state: EstimatorState) -> Result<Self> {
        Self::with_weights(state.weights, state.config)
    }
}

pub(crate) fn dot(a: &[f64], b: &[f64]) -> f64 {
    a.iter().zip(b).map(|(x, y)| x * y).sum()
}
