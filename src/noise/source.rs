//! Common sampling interface over the two gradient noise engines.

use serde::{Deserialize, Serialize};

use super::perlin::Perlin;
use super::simplex::Simplex;

/// A 2D scalar field with values in `[0, 1]`.
pub trait NoiseSource {
    /// Samples the field at `(x, y)`.
    fn sample_2d(&self, x: f64, y: f64) -> f64;
}

/// Which gradient noise algorithm to use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum NoiseKind {
    /// Improved Perlin noise (z = 0 slice).
    #[default]
    Perlin,
    /// 2D simplex noise.
    Simplex,
}

impl NoiseKind {
    /// Returns the name of the algorithm.
    pub fn name(&self) -> &'static str {
        match self {
            NoiseKind::Perlin => "perlin",
            NoiseKind::Simplex => "simplex",
        }
    }

    /// Builds an engine of this kind from `seed`.
    pub fn build(self, seed: u32) -> NoiseEngine {
        match self {
            NoiseKind::Perlin => NoiseEngine::Perlin(Perlin::new(seed)),
            NoiseKind::Simplex => NoiseEngine::Simplex(Simplex::new(seed)),
        }
    }
}

/// An engine of either kind, selected at runtime.
#[derive(Debug, Clone)]
pub enum NoiseEngine {
    Perlin(Perlin),
    Simplex(Simplex),
}

impl NoiseEngine {
    /// Returns which algorithm this engine runs.
    pub fn kind(&self) -> NoiseKind {
        match self {
            NoiseEngine::Perlin(_) => NoiseKind::Perlin,
            NoiseEngine::Simplex(_) => NoiseKind::Simplex,
        }
    }
}

impl NoiseSource for NoiseEngine {
    fn sample_2d(&self, x: f64, y: f64) -> f64 {
        match self {
            NoiseEngine::Perlin(perlin) => perlin.sample_2d(x, y),
            NoiseEngine::Simplex(simplex) => simplex.sample_2d(x, y),
        }
    }
}
