//! Continuous-time temporal difference learning of a value map
//!
//! This module implements the learning core: a linear value estimator
//! trained online by a TD rule with an eligibility trace, frozen snapshots
//! of that estimator, and a policy advisor that climbs the snapshot's value
//! gradient.
//!
//! ## Pieces
//!
//! | Type | Role |
//! |------|------|
//! | [`ValueEstimator`] | Live weights and trace, updated every tick |
//! | [`ValueEstimatorSnapshot`] | Frozen weights plus `V_max`, one per batch |
//! | [`PolicyAdvisor`] | Drift direction from the snapshot's gradient |
//! | [`SavedEstimator`] | Versioned on-disk form of a trained estimator |
//!
//! ## Usage Example
//!
//! ```
//! use tdnav::td::{EstimatorConfig, ValueEstimator};
//!
//! let mut estimator = ValueEstimator::new(3, EstimatorConfig::default())?;
//! estimator.step(&[1.0, 1.0, 1.0], 0.05);
//! let td_error = estimator.train(0.5, 0.05);
//! assert!(td_error > 0.0);
//! # Ok::<(), tdnav::Error>(())
//! ```

pub mod advisor;
pub mod estimator;
pub mod serialization;
pub mod snapshot;

// Public re-exports
pub use advisor::{DRIFT_SPEED_FACTOR, GRADIENT_STEP, PolicyAdvisor, RELIABILITY_FRACTION};
pub use estimator::{DEFAULT_L2_PENALTY, EstimatorConfig, ValueEstimator};
pub use serialization::{SavedEstimator, TrainingMetadata};
pub use snapshot::ValueEstimatorSnapshot;
