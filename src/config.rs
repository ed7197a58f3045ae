use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::geometry::{Orientation, SQRT_3};
use crate::plates::neighbors::NeighborLookup;

pub const MIN_PLATES: u32 = 2;
pub const MAX_PLATES: u32 = 15;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConfigError {
    #[error("image size must be positive, got {0}x{1}")]
    ImageSize(f64, f64),
    #[error("hexagon size must be a positive number, got {0}")]
    HexSize(f64),
    #[error("plate count must be within 2..=15, got {0}")]
    PlateCount(u32),
    #[error("time step must be non-zero")]
    TimeStep,
    #[error("pitch trim {0} leaves no room for a cell")]
    PitchTrim(f64),
    #[error("minimum seed separation must be a non-negative number, got {0}")]
    SeedSeparation(f64),
    #[error("seed attempt budget must be non-zero")]
    SeedAttempts,
}

/// All tunable parameters for one map session.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct Params {
    // Image
    pub image_width: f64,
    pub image_height: f64,
    pub hex_size: f64,
    pub orientation: Orientation,
    /// State bits every cell starts with.
    pub hex_props: u8,
    /// Pixels shaved off the across-flats pitch when packing cells.
    pub pitch_trim: f64,

    // Plates
    pub plate_count: u32,
    pub min_seed_separation: f64,
    pub max_seed_attempts: u32,
    pub max_growth_steps: u32,
    pub neighbor_lookup: NeighborLookup,

    // Clock (years)
    pub time_step: u64,
    pub max_time: u64,

    pub seed: u64,
}

impl Default for Params {
    fn default() -> Self {
        Self {
            image_width: 1024.0,
            image_height: 768.0,
            hex_size: 18.0,
            orientation: Orientation::Vertical,
            hex_props: 0,
            pitch_trim: 1.0,
            plate_count: 6,
            min_seed_separation: 0.0,
            max_seed_attempts: 10_000,
            max_growth_steps: 10_000,
            neighbor_lookup: NeighborLookup::Indexed,
            time_step: 100_000,
            max_time: 4_500_000_000,
            seed: 42,
        }
    }
}

impl Params {
    pub fn validate(&self) -> Result<(), ConfigError> {
        let (w, h) = (self.image_width, self.image_height);
        if !(w.is_finite() && h.is_finite() && w > 0.0 && h > 0.0) {
            return Err(ConfigError::ImageSize(w, h));
        }
        if !(self.hex_size.is_finite() && self.hex_size > 0.0) {
            return Err(ConfigError::HexSize(self.hex_size));
        }
        if !(MIN_PLATES..=MAX_PLATES).contains(&self.plate_count) {
            return Err(ConfigError::PlateCount(self.plate_count));
        }
        if self.time_step == 0 {
            return Err(ConfigError::TimeStep);
        }
        let trim = self.pitch_trim;
        if !(trim.is_finite() && trim >= 0.0 && self.hex_size * SQRT_3 - trim > 0.0) {
            return Err(ConfigError::PitchTrim(trim));
        }
        let sep = self.min_seed_separation;
        if !(sep.is_finite() && sep >= 0.0) {
            return Err(ConfigError::SeedSeparation(sep));
        }
        if self.max_seed_attempts == 0 {
            return Err(ConfigError::SeedAttempts);
        }
        Ok(())
    }
}
