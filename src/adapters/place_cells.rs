//! Place-cell receptive fields as a feature source

use rand::RngCore;
use serde::{Deserialize, Serialize};

use super::environment::{BoxEnvironment, SampleLayout};
use crate::{Error, Result, ports::FeatureSource, types::Position};

/// Shape of each cell's firing-rate profile as a function of distance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReceptiveField {
    /// `exp(-d² / 2σ²)`
    #[default]
    Gaussian,
    /// Gaussian shifted down so it reaches zero at `d = σ`
    GaussianThreshold,
    /// Difference of a σ and a 1.5σ Gaussian, normalised to peak at 1
    DiffOfGaussians,
    /// 1 inside radius σ, 0 outside
    TopHat,
    /// 1 for the closest cell only
    OneHot,
}

/// Population configuration for [`PlaceCells`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlaceCellConfig {
    /// Number of cells (ignored when `centres` is given)
    pub n: usize,
    /// Receptive field width σ in metres
    pub width: f64,
    pub field: ReceptiveField,
    pub min_fr: f64,
    pub max_fr: f64,
    /// Explicit centres; scattered with jitter across the arena when absent
    pub centres: Option<Vec<Position>>,
}

impl Default for PlaceCellConfig {
    fn default() -> Self {
        Self {
            n: 100,
            width: 0.2,
            field: ReceptiveField::Gaussian,
            min_fr: 0.0,
            max_fr: 1.0,
            centres: None,
        }
    }
}

/// A population of place cells tiling the arena.
#[derive(Debug, Clone)]
pub struct PlaceCells {
    centres: Vec<Position>,
    width: f64,
    field: ReceptiveField,
    min_fr: f64,
    max_fr: f64,
}

impl PlaceCells {
    /// Build the population, scattering centres across `environment` when
    /// the config does not fix them.
    pub fn from_config(
        config: &PlaceCellConfig,
        environment: &BoxEnvironment,
        rng: &mut dyn RngCore,
    ) -> Result<Self> {
        let centres = match &config.centres {
            Some(centres) => centres.clone(),
            None => environment.sample_positions(config.n, SampleLayout::UniformJitter, rng),
        };
        Self::new(centres, config.width, config.field).map(|cells| {
            cells.with_rate_range(config.min_fr, config.max_fr)
        })
    }

    pub fn new(centres: Vec<Position>, width: f64, field: ReceptiveField) -> Result<Self> {
        if centres.is_empty() {
            return Err(Error::invalid_config("place cell population is empty"));
        }
        if !(width > 0.0 && width.is_finite()) {
            return Err(Error::invalid_config(format!(
                "place cell width must be positive, got {width}"
            )));
        }
        Ok(Self {
            centres,
            width,
            field,
            min_fr: 0.0,
            max_fr: 1.0,
        })
    }

    /// Rescale firing rates from `[0, 1]` to `[min_fr, max_fr]`.
    pub fn with_rate_range(mut self, min_fr: f64, max_fr: f64) -> Self {
        self.min_fr = min_fr;
        self.max_fr = max_fr;
        self
    }

    pub fn centres(&self) -> &[Position] {
        &self.centres
    }

    pub fn width(&self) -> f64 {
        self.width
    }

    fn profile(&self, distance: f64) -> f64 {
        let sigma = self.width;
        let gaussian = |s: f64| (-(distance * distance) / (2.0 * s * s)).exp();
        match self.field {
            ReceptiveField::Gaussian => gaussian(sigma),
            ReceptiveField::GaussianThreshold => {
                let floor = (-0.5f64).exp();
                ((gaussian(sigma) - floor).max(0.0)) / (1.0 - floor)
            }
            ReceptiveField::DiffOfGaussians => {
                let ratio: f64 = 1.5;
                let r2 = ratio * ratio;
                (gaussian(sigma) - gaussian(ratio * sigma) / r2) * r2 / (r2 - 1.0)
            }
            ReceptiveField::TopHat => {
                if distance < sigma {
                    1.0
                } else {
                    0.0
                }
            }
            // handled in `evaluate`
            ReceptiveField::OneHot => 0.0,
        }
    }
}

impl FeatureSource for PlaceCells {
    fn dimension(&self) -> usize {
        self.centres.len()
    }

    fn evaluate(&self, position: Position) -> Vec<f64> {
        let scale = self.max_fr - self.min_fr;
        if self.field == ReceptiveField::OneHot {
            let closest = self
                .centres
                .iter()
                .enumerate()
                .min_by(|(_, a), (_, b)| a.distance(position).total_cmp(&b.distance(position)))
                .map(|(idx, _)| idx);
            return (0..self.centres.len())
                .map(|idx| {
                    let active = if Some(idx) == closest { 1.0 } else { 0.0 };
                    active * scale + self.min_fr
                })
                .collect();
        }

        self.centres
            .iter()
            .map(|centre| self.profile(centre.distance(position)) * scale + self.min_fr)
            .collect()
    }

    fn name(&self) -> &str {
        "place cells"
    }
}
