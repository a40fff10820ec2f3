//! Rasterizes fractal noise into a heightmap.

use glam::DVec2;
use serde::{Deserialize, Serialize};

use crate::noise::{Fractal, FractalNoiseConfig, NoiseError, NoiseKind};
use super::heightmap::Heightmap;

/// Noise-space distance between adjacent cells.
pub const DEFAULT_NOISE_SCALE: f64 = 0.02;

/// How a noise field is laid over the grid.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SamplingConfig {
    /// Noise algorithm.
    pub kind: NoiseKind,
    /// Octave layering and seed.
    pub fractal: FractalNoiseConfig,
    /// Noise-space distance between adjacent cells.
    pub scale: f64,
    /// Noise-space position of cell `(0, 0)`.
    pub origin: DVec2,
}

impl Default for SamplingConfig {
    fn default() -> Self {
        Self {
            kind: NoiseKind::Perlin,
            fractal: FractalNoiseConfig::default(),
            scale: DEFAULT_NOISE_SCALE,
            origin: DVec2::ZERO,
        }
    }
}

impl SamplingConfig {
    /// Perlin terrain preset.
    pub fn terrain_perlin() -> Self {
        Self {
            kind: NoiseKind::Perlin,
            fractal: FractalNoiseConfig::terrain_perlin(),
            ..Default::default()
        }
    }

    /// Simplex terrain preset.
    pub fn terrain_simplex() -> Self {
        Self {
            kind: NoiseKind::Simplex,
            fractal: FractalNoiseConfig::terrain_simplex(),
            ..Default::default()
        }
    }

    /// Noise-space position of a cell.
    pub fn cell_position(&self, x: u32, y: u32) -> DVec2 {
        self.origin + DVec2::new(f64::from(x), f64::from(y)) * self.scale
    }
}

/// Fills a `resolution * resolution` heightmap with fBm values.
///
/// One engine is built for the whole grid. Values are in `[0, 1]` and are not
/// renormalized.
///
/// # Arguments
/// * `resolution` - Side length of the grid in cells
/// * `config` - Noise kind, fractal parameters and placement
pub fn sample_heightmap(resolution: u32, config: &SamplingConfig) -> Result<Heightmap, NoiseError> {
    if resolution == 0 {
        return Err(NoiseError::InvalidResolution(resolution));
    }
    if !config.scale.is_finite() {
        return Err(NoiseError::NonFiniteParameter {
            name: "scale",
            value: config.scale,
        });
    }

    let fractal = Fractal::new(config.kind.build(config.fractal.seed), config.fractal)?;
    tracing::debug!(
        resolution,
        kind = config.kind.name(),
        octaves = config.fractal.octaves,
        "sampling noise heightmap"
    );

    let mut heightmap = Heightmap::new(resolution);
    for y in 0..resolution {
        for x in 0..resolution {
            let pos = config.cell_position(x, y);
            heightmap.set_height(x, y, fractal.sample(pos.x, pos.y) as f32);
        }
    }

    Ok(heightmap)
}
