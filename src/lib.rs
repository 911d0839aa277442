//! Continuous-time TD learning of spatial value maps
//!
//! This crate provides:
//! - A linear value estimator trained online by a TD rule with an
//!   eligibility trace
//! - A policy advisor steering an agent up the gradient of a frozen value map
//! - An episode controller with stochastic success and timeout termination
//! - A batched training loop with per-batch snapshots and an adaptive
//!   exploration ratio
//! - Place-cell, reward-cell, arena and random-foraging adapters so the loop
//!   runs end to end

pub mod adapters;
pub mod cli;
pub mod error;
pub mod export;
pub mod pipeline;
pub mod ports;
pub mod td;
pub mod types;
pub mod utils;

pub use error::{Error, Result};
pub use pipeline::{
    EpisodeController, EpisodeOutcome, EpisodeRecord, TrainingLoop, TrainingState,
};
pub use td::{PolicyAdvisor, ValueEstimator, ValueEstimatorSnapshot};
pub use types::{Position, Vec2};
