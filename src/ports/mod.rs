//! Ports (trait boundaries) for the collaborators of the learning core.
//!
//! The value estimator, policy advisor and episode controller only ever see
//! these capability traits. Concrete receptive fields, reward maps, motion
//! models and arenas live in [`crate::adapters`], and tests substitute
//! synthetic doubles.

pub mod environment;
pub mod features;
pub mod motion;
pub mod observer;
pub mod reward;

pub use environment::Environment;
pub use features::FeatureSource;
pub use motion::MotionController;
pub use observer::Observer;
pub use reward::RewardSource;
