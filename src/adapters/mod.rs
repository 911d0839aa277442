//! Adapters implementing domain ports.
//!
//! This module contains infrastructure implementations of the traits defined
//! in the ports module. Following hexagonal architecture, adapters depend on
//! domain ports, not the other way around.

pub mod agent;
pub mod boundary_cells;
pub mod environment;
pub mod grid_cells;
pub mod place_cells;
pub mod reward_cell;
pub mod scene;
pub mod synthetic;

pub use agent::{MotionConfig, RandomMotionAgent};
pub use boundary_cells::{BoundaryCellConfig, BoundaryTuning, BoundaryVectorCells};
pub use environment::{BoxEnvironment, EnvironmentConfig, SampleLayout};
pub use grid_cells::{GridCellConfig, GridCells, GridLattice};
pub use place_cells::{PlaceCellConfig, PlaceCells, ReceptiveField};
pub use reward_cell::{RewardCell, RewardConfig};
pub use scene::{Scene, SceneConfig};
pub use synthetic::{ConstantFeatures, ConstantReward, DriftOnlyMotion};
