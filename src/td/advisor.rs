//! Steepest-ascent policy on a frozen value map

use super::snapshot::ValueEstimatorSnapshot;
use crate::{
    ports::FeatureSource,
    types::{Position, Vec2},
};

/// Below this fraction of `V_max` the value estimate is too weak to follow.
pub const RELIABILITY_FRACTION: f64 = 0.05;

/// Finite-difference step along each axis, in metres.
pub const GRADIENT_STEP: f64 = 1e-3;

/// Drift speed as a multiple of the agent's mean speed.
pub const DRIFT_SPEED_FACTOR: f64 = 3.0;

/// Turns a frozen value map into drift velocities by local gradient ascent.
#[derive(Debug, Clone)]
pub struct PolicyAdvisor {
    snapshot: ValueEstimatorSnapshot,
}

impl PolicyAdvisor {
    pub fn new(snapshot: ValueEstimatorSnapshot) -> Self {
        Self { snapshot }
    }

    pub fn snapshot(&self) -> &ValueEstimatorSnapshot {
        &self.snapshot
    }

    /// Drift velocity at `position`, or `None` when there is no usable signal.
    ///
    /// No signal is returned when the snapshot has no positive peak, when
    /// the value at `position` is below [`RELIABILITY_FRACTION`] of the
    /// peak, or when the estimated gradient vanishes.
    pub fn advise(
        &self,
        position: Position,
        features: &dyn FeatureSource,
        mean_speed: f64,
    ) -> Option<Vec2> {
        let v_max = self.snapshot.max_reference();
        if v_max.is_nan() || v_max <= 0.0 {
            return None;
        }

        let value = self.snapshot.value_at(features, position);
        if value < RELIABILITY_FRACTION * v_max {
            return None;
        }

        let direction = self.gradient(position, value, features).normalized()?;
        Some(direction * (DRIFT_SPEED_FACTOR * mean_speed))
    }

    /// Forward-difference gradient of the frozen value map at `position`.
    fn gradient(&self, position: Position, value: f64, features: &dyn FeatureSource) -> Vec2 {
        let dx = self
            .snapshot
            .value_at(features, position + Vec2::new(GRADIENT_STEP, 0.0));
        let dy = self
            .snapshot
            .value_at(features, position + Vec2::new(0.0, GRADIENT_STEP));
        Vec2::new(dx - value, dy - value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Single feature whose activity rises linearly along x.
    struct Ramp;

    impl FeatureSource for Ramp {
        fn dimension(&self) -> usize {
            1
        }

        fn evaluate(&self, position: Position) -> Vec<f64> {
            vec![position.x]
        }
    }

    #[test]
    fn zero_weights_give_no_signal() {
        let advisor = PolicyAdvisor::new(ValueEstimatorSnapshot::from_parts(vec![0.0], 0.0));
        assert!(advisor.advise(Position::new(0.5, 0.5), &Ramp, 0.08).is_none());
    }

    #[test]
    fn weak_value_gives_no_signal() {
        let advisor = PolicyAdvisor::new(ValueEstimatorSnapshot::from_parts(vec![1.0], 1.0));
        // V = 0.04 < 0.05 * V_max
        assert!(advisor.advise(Position::new(0.04, 0.5), &Ramp, 0.08).is_none());
    }

    #[test]
    fn drift_points_uphill_at_three_times_mean_speed() {
        let advisor = PolicyAdvisor::new(ValueEstimatorSnapshot::from_parts(vec![1.0], 1.0));
        let drift = advisor
            .advise(Position::new(0.5, 0.5), &Ramp, 0.1)
            .expect("ramp has a gradient");
        assert!((drift.x - 0.3).abs() < 1e-9);
        assert!(drift.y.abs() < 1e-9);
    }

    #[test]
    fn flat_map_gives_no_signal() {
        struct Flat;
        impl FeatureSource for Flat {
            fn dimension(&self) -> usize {
                1
            }
            fn evaluate(&self, _position: Position) -> Vec<f64> {
                vec![1.0]
            }
        }

        let advisor = PolicyAdvisor::new(ValueEstimatorSnapshot::from_parts(vec![2.0], 2.0));
        assert!(advisor.advise(Position::new(0.5, 0.5), &Flat, 0.08).is_none());
    }
}
