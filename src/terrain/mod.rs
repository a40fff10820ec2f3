//! Terrain generation module.
//!
//! Provides the square [`Heightmap`] grid, the diamond-square generator and
//! rasterization of fractal noise into heightmaps.

mod diamond_square;
mod heightmap;
mod sampling;

pub use diamond_square::{
    diamond_square, is_valid_size, DiamondSquare, DiamondSquareConfig, HeightmapError,
};
pub use heightmap::{Heightmap, FLAT_EPSILON};
pub use sampling::{sample_heightmap, SamplingConfig, DEFAULT_NOISE_SCALE};
