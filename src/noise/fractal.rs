//! Multi-octave fractal Brownian motion (fBm) over a gradient noise engine.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::perlin::Perlin;
use super::simplex::Simplex;
use super::source::NoiseSource;

/// Errors raised by invalid noise configuration.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum NoiseError {
    #[error("Invalid octave count: {0} (must be at least 1)")]
    InvalidOctaves(u32),
    #[error("Parameter '{name}' must be finite, got {value}")]
    NonFiniteParameter { name: &'static str, value: f64 },
    #[error("Persistence must be non-negative, got {0}")]
    NegativePersistence(f64),
    #[error("Parameter '{name}' = {value} overflows after {octaves} octaves")]
    OctaveOverflow {
        name: &'static str,
        value: f64,
        octaves: u32,
    },
    #[error("Invalid resolution: {0} (must be at least 1)")]
    InvalidResolution(u32),
}

/// Configuration for multi-octave fractal noise.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FractalNoiseConfig {
    /// Number of noise octaves (4-8 typical).
    pub octaves: u32,
    /// Amplitude decay per octave (typically 0.5).
    pub persistence: f64,
    /// Frequency multiplier per octave (typically 2.0).
    pub lacunarity: f64,
    /// Seed for the permutation table.
    pub seed: u32,
}

impl Default for FractalNoiseConfig {
    fn default() -> Self {
        Self {
            octaves: 4,
            persistence: 0.5,
            lacunarity: 2.0,
            seed: 0,
        }
    }
}

impl FractalNoiseConfig {
    /// Creates a default configuration with the given seed.
    pub fn with_seed(seed: u32) -> Self {
        Self {
            seed,
            ..Default::default()
        }
    }

    /// Six-octave Perlin terrain preset.
    pub fn terrain_perlin() -> Self {
        Self {
            octaves: 6,
            persistence: 0.5,
            lacunarity: 2.0,
            seed: 12345,
        }
    }

    /// Five-octave simplex terrain preset.
    pub fn terrain_simplex() -> Self {
        Self {
            octaves: 5,
            persistence: 0.5,
            lacunarity: 2.0,
            seed: 54321,
        }
    }

    /// Checks that the octave sum is well defined.
    ///
    /// Zero octaves or a negative persistence would let the amplitude sum
    /// reach zero, so both are rejected up front. The last octave's frequency
    /// and amplitude must also stay finite.
    pub fn validate(&self) -> Result<(), NoiseError> {
        if self.octaves == 0 {
            return Err(NoiseError::InvalidOctaves(self.octaves));
        }
        if !self.persistence.is_finite() {
            return Err(NoiseError::NonFiniteParameter {
                name: "persistence",
                value: self.persistence,
            });
        }
        if !self.lacunarity.is_finite() {
            return Err(NoiseError::NonFiniteParameter {
                name: "lacunarity",
                value: self.lacunarity,
            });
        }
        if self.persistence < 0.0 {
            return Err(NoiseError::NegativePersistence(self.persistence));
        }

        let last_octave = f64::from(self.octaves - 1);
        for (name, value) in [("lacunarity", self.lacunarity), ("persistence", self.persistence)] {
            if !value.abs().powf(last_octave).is_finite() {
                return Err(NoiseError::OctaveOverflow {
                    name,
                    value,
                    octaves: self.octaves,
                });
            }
        }
        Ok(())
    }
}

/// A noise engine paired with a validated fractal configuration.
#[derive(Debug, Clone)]
pub struct Fractal<N> {
    source: N,
    config: FractalNoiseConfig,
}

impl<N: NoiseSource> Fractal<N> {
    /// Binds `source` to `config` after validating it.
    ///
    /// `config.seed` is not applied to `source`; the engine keeps whatever
    /// seed it was built with.
    pub fn new(source: N, config: FractalNoiseConfig) -> Result<Self, NoiseError> {
        config.validate()?;
        Ok(Self { source, config })
    }

    /// Returns the configuration.
    pub fn config(&self) -> &FractalNoiseConfig {
        &self.config
    }

    /// Returns the underlying engine.
    pub fn source(&self) -> &N {
        &self.source
    }

    /// Sums all octaves at `(x, y)`, normalized by the total amplitude.
    ///
    /// With per-octave values in `[0, 1]` and non-negative persistence the
    /// result also lies in `[0, 1]`.
    pub fn sample(&self, x: f64, y: f64) -> f64 {
        let mut total = 0.0;
        let mut amplitude = 1.0;
        let mut frequency = 1.0;
        let mut max_amplitude = 0.0;

        for _ in 0..self.config.octaves {
            total += self.source.sample_2d(x * frequency, y * frequency) * amplitude;
            max_amplitude += amplitude;
            amplitude *= self.config.persistence;
            frequency *= self.config.lacunarity;
        }

        total / max_amplitude
    }
}

impl<N: NoiseSource> NoiseSource for Fractal<N> {
    fn sample_2d(&self, x: f64, y: f64) -> f64 {
        self.sample(x, y)
    }
}

/// Multi-octave Perlin noise at `(x, y)`.
///
/// Builds a fresh [`Perlin`] engine from `config.seed` on every call.
pub fn perlin_fbm(x: f64, y: f64, config: &FractalNoiseConfig) -> Result<f64, NoiseError> {
    Ok(Fractal::new(Perlin::new(config.seed), *config)?.sample(x, y))
}

/// Multi-octave simplex noise at `(x, y)`.
///
/// Builds a fresh [`Simplex`] engine from `config.seed` on every call.
pub fn simplex_fbm(x: f64, y: f64, config: &FractalNoiseConfig) -> Result<f64, NoiseError> {
    Ok(Fractal::new(Simplex::new(config.seed), *config)?.sample(x, y))
}
