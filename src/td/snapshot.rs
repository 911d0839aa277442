//! Frozen copies of the value estimator used for acting

use tracing::warn;

use super::estimator::{ValueEstimator, dot};
use crate::{Error, Result, ports::FeatureSource, types::Position};

/// Immutable copy of the estimator weights plus the reference maximum value.
///
/// Taken at the start of each training batch. The live estimator keeps
/// learning during the batch while every policy decision reads from this
/// copy, so the acting policy trails the learned one by one batch.
#[derive(Debug, Clone, PartialEq)]
pub struct ValueEstimatorSnapshot {
    weights: Box<[f64]>,
    max_reference: f64,
}

impl ValueEstimatorSnapshot {
    /// Copy the estimator's weights and scan `sample` for the maximum value.
    ///
    /// # Errors
    ///
    /// Returns [`Error::EmptyGlobalSample`] if `sample` is empty and
    /// [`Error::DimensionMismatch`] if the feature source does not match the
    /// estimator.
    pub fn capture(
        estimator: &ValueEstimator,
        features: &dyn FeatureSource,
        sample: &[Position],
    ) -> Result<Self> {
        estimator.check_dimension(features.dimension(), features.name())?;
        if sample.is_empty() {
            return Err(Error::EmptyGlobalSample);
        }

        let weights: Box<[f64]> = estimator.weights().into();
        let max_reference = sample
            .iter()
            .map(|&position| dot(&weights, &features.evaluate(position)))
            .fold(f64::NEG_INFINITY, f64::max);

        if max_reference <= 0.0 {
            warn!(
                max_reference,
                "value map has no positive peak yet; policy will explore"
            );
        }

        Ok(Self {
            weights,
            max_reference,
        })
    }

    /// Build a snapshot from explicit parts.
    pub fn from_parts(weights: Vec<f64>, max_reference: f64) -> Self {
        Self {
            weights: weights.into_boxed_slice(),
            max_reference,
        }
    }

    pub fn weights(&self) -> &[f64] {
        &self.weights
    }

    pub fn dimension(&self) -> usize {
        self.weights.len()
    }

    /// Maximum value observed over the global sample when captured.
    pub fn max_reference(&self) -> f64 {
        self.max_reference
    }

    pub fn value_of(&self, features: &[f64]) -> f64 {
        dot(&self.weights, features)
    }

    /// Value at `position` under the frozen weights.
    pub fn value_at(&self, features: &dyn FeatureSource, position: Position) -> f64 {
        self.value_of(&features.evaluate(position))
    }
}
