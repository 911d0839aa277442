//! Grid cells: rectified sums of three cosine gratings

use std::f64::consts::{PI, TAU};

use rand::{Rng, RngCore};
use serde::{Deserialize, Serialize};

use crate::{
    Error, Result,
    ports::FeatureSource,
    types::{Position, Vec2},
};

/// Population configuration for [`GridCells`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GridCellConfig {
    pub n: usize,
    /// Nominal grid period in metres
    pub gridscale: f64,
    /// Draw each cell's orientation uniformly instead of aligning to x
    pub random_orientations: bool,
    /// Draw each cell's period from `[2/3, 3/2] · gridscale`
    pub random_gridscales: bool,
    pub min_fr: f64,
    pub max_fr: f64,
}

impl Default for GridCellConfig {
    fn default() -> Self {
        Self {
            n: 10,
            gridscale: 0.45,
            random_orientations: true,
            random_gridscales: true,
            min_fr: 0.0,
            max_fr: 1.0,
        }
    }
}

/// One grid cell's lattice.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GridLattice {
    /// Position of a firing peak
    pub phase_offset: Position,
    /// Angle of the first grating in radians
    pub orientation: f64,
    /// Grid period in metres
    pub gridscale: f64,
}

impl GridLattice {
    /// Rate before rescaling: `max(0, ½ Σ cos φ_k)`, peaking at 1.5.
    fn rate(&self, position: Position) -> f64 {
        let offset = position - self.phase_offset;
        let k = TAU / self.gridscale;
        let sum: f64 = (0..3)
            .map(|i| {
                let grating = Vec2::from_angle(self.orientation + i as f64 * PI / 3.0);
                (k * offset.dot(grating)).cos()
            })
            .sum();
        (0.5 * sum).max(0.0)
    }
}

/// A population of grid cells.
#[derive(Debug, Clone)]
pub struct GridCells {
    lattices: Vec<GridLattice>,
    min_fr: f64,
    max_fr: f64,
}

impl GridCells {
    pub fn from_config(config: &GridCellConfig, rng: &mut dyn RngCore) -> Result<Self> {
        if !(config.gridscale > 0.0 && config.gridscale.is_finite()) {
            return Err(Error::invalid_config(format!(
                "grid scale must be positive, got {}",
                config.gridscale
            )));
        }
        let lattices = (0..config.n)
            .map(|_| {
                let phase_offset = Position::new(
                    rng.random::<f64>() * config.gridscale,
                    rng.random::<f64>() * config.gridscale,
                );
                let orientation = if config.random_orientations {
                    rng.random::<f64>() * TAU
                } else {
                    0.0
                };
                let gridscale = if config.random_gridscales {
                    rng.random_range(2.0 * config.gridscale / 3.0..1.5 * config.gridscale)
                } else {
                    config.gridscale
                };
                GridLattice {
                    phase_offset,
                    orientation,
                    gridscale,
                }
            })
            .collect();
        Self::new(lattices).map(|cells| cells.with_rate_range(config.min_fr, config.max_fr))
    }

    pub fn new(lattices: Vec<GridLattice>) -> Result<Self> {
        if lattices.is_empty() {
            return Err(Error::invalid_config("grid cell population is empty"));
        }
        if let Some(bad) = lattices
            .iter()
            .find(|l| !(l.gridscale > 0.0 && l.gridscale.is_finite()))
        {
            return Err(Error::invalid_config(format!(
                "grid scale must be positive, got {}",
                bad.gridscale
            )));
        }
        Ok(Self {
            lattices,
            min_fr: 0.0,
            max_fr: 1.0,
        })
    }

    pub fn with_rate_range(mut self, min_fr: f64, max_fr: f64) -> Self {
        self.min_fr = min_fr;
        self.max_fr = max_fr;
        self
    }

    pub fn lattices(&self) -> &[GridLattice] {
        &self.lattices
    }
}

impl FeatureSource for GridCells {
    fn dimension(&self) -> usize {
        self.lattices.len()
    }

    fn evaluate(&self, position: Position) -> Vec<f64> {
        let scale = self.max_fr - self.min_fr;
        self.lattices
            .iter()
            .map(|lattice| lattice.rate(position) * scale + self.min_fr)
            .collect()
    }

    fn name(&self) -> &str {
        "grid cells"
    }
}
