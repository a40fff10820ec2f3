//! Procedural noise and heightmap generation.
//!
//! This crate provides seeded Perlin and simplex gradient noise, fractal
//! Brownian motion over either, and a diamond-square heightmap generator.
//! Everything is deterministic for a given seed and runs on the CPU.

pub mod export;
pub mod noise;
pub mod terrain;

pub use noise::{
    perlin_fbm, perlin_noise, simplex_fbm, simplex_noise, FractalNoiseConfig, NoiseError, NoiseKind,
    Perlin, Simplex,
};
pub use terrain::{diamond_square, DiamondSquareConfig, Heightmap, HeightmapError, SamplingConfig};
