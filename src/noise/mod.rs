//! Noise generation module for terrain synthesis.
//!
//! Seeded Perlin and simplex gradient noise, plus fBm layering of either.
//! Engines are immutable once built and can be queried from many threads.

mod fractal;
mod perlin;
mod permutation;
mod simplex;
mod source;

pub use fractal::{perlin_fbm, simplex_fbm, Fractal, FractalNoiseConfig, NoiseError};
pub use perlin::{perlin_noise, Perlin};
pub use permutation::{PermutationTable, TABLE_SIZE};
pub use simplex::{simplex_noise, Simplex};
pub use source::{NoiseEngine, NoiseKind, NoiseSource};
