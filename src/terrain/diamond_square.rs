//! Diamond-square midpoint displacement.

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::heightmap::Heightmap;

/// Errors raised by invalid diamond-square configuration.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum HeightmapError {
    #[error("Invalid heightmap size {size}: must be 2^n + 1 with n >= 1 (e.g. 3, 5, 129, 257)")]
    InvalidSize { size: u32 },
    #[error("Roughness must be finite, got {0}")]
    NonFiniteRoughness(f32),
    #[error("Roughness must be non-negative, got {0}")]
    NegativeRoughness(f32),
}

/// Returns true if `size` has the form `2^n + 1` with `n >= 1`.
pub fn is_valid_size(size: u32) -> bool {
    size >= 3 && (size - 1).is_power_of_two()
}

/// Rejects roughness values that would let the displacement range grow.
fn check_roughness(roughness: f32) -> Result<(), HeightmapError> {
    if !roughness.is_finite() {
        return Err(HeightmapError::NonFiniteRoughness(roughness));
    }
    if roughness < 0.0 {
        return Err(HeightmapError::NegativeRoughness(roughness));
    }
    Ok(())
}

/// Parameters for a diamond-square run.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DiamondSquareConfig {
    /// Side length; must be `2^n + 1`.
    pub size: u32,
    /// Exponent of the per-round range decay, `range *= 2^-roughness`.
    ///
    /// Larger values damp fine detail faster and give smoother terrain.
    pub roughness: f32,
    /// Seed for the displacement generator.
    pub seed: u32,
    /// Wrap square-step neighbours toroidally.
    pub wrap: bool,
}

impl Default for DiamondSquareConfig {
    fn default() -> Self {
        Self {
            size: 129,
            roughness: 0.5,
            seed: 0,
            wrap: false,
        }
    }
}

impl DiamondSquareConfig {
    /// Creates a default configuration for the given size and seed.
    pub fn new(size: u32, seed: u32) -> Self {
        Self {
            size,
            seed,
            ..Default::default()
        }
    }

    /// Checks the size and roughness.
    pub fn validate(&self) -> Result<(), HeightmapError> {
        if !is_valid_size(self.size) {
            return Err(HeightmapError::InvalidSize { size: self.size });
        }
        check_roughness(self.roughness)
    }
}

/// Centres of the squares for one round at `step`.
fn diamond_points(size: i64, step: i64) -> impl Iterator<Item = (i64, i64)> {
    let half = step / 2;
    (half..size)
        .step_by(step as usize)
        .flat_map(move |y| (half..size).step_by(step as usize).map(move |x| (x, y)))
}

/// Centres of the diamonds for one round at `step`.
fn square_points(size: i64, step: i64) -> impl Iterator<Item = (i64, i64)> {
    let half = step / 2;
    (0..size).step_by(half as usize).flat_map(move |y| {
        ((y + half) % step..size)
            .step_by(step as usize)
            .map(move |x| (x, y))
    })
}

/// Single-use diamond-square generator.
///
/// Owns the grid and one seeded random stream for the whole run.
/// [`DiamondSquare::generate`] consumes the generator, so a grid can never be
/// displaced twice from stale interior values.
#[derive(Debug, Clone)]
pub struct DiamondSquare {
    size: i64,
    rng: ChaCha8Rng,
    heightmap: Heightmap,
}

impl DiamondSquare {
    /// Allocates a zeroed `size * size` grid and seeds the generator.
    pub fn new(size: u32, seed: u32) -> Result<Self, HeightmapError> {
        if !is_valid_size(size) {
            return Err(HeightmapError::InvalidSize { size });
        }
        Ok(Self {
            size: i64::from(size),
            rng: ChaCha8Rng::seed_from_u64(u64::from(seed)),
            heightmap: Heightmap::new(size),
        })
    }

    /// Side length of the grid.
    pub fn size(&self) -> u32 {
        self.heightmap.resolution
    }

    /// Uniform draw in `[-1, 1]`.
    fn draw(&mut self) -> f32 {
        self.rng.random_range(-1.0..=1.0)
    }

    fn set(&mut self, x: i64, y: i64, value: f32) {
        self.heightmap.set_height(x as u32, y as u32, value);
    }

    /// Averages the four diagonal corners (0 outside the grid) and displaces.
    fn diamond_step(&mut self, x: i64, y: i64, half: i64, range: f32) {
        let corner = |dx: i64, dy: i64| self.heightmap.try_height(x + dx, y + dy).unwrap_or(0.0);
        let avg = (corner(-half, -half)
            + corner(half, -half)
            + corner(-half, half)
            + corner(half, half))
            / 4.0;
        let offset = self.draw() * range;
        self.set(x, y, avg + offset);
    }

    /// Sums the axis-aligned neighbours at distance `half`.
    ///
    /// Without wrapping, neighbours outside the grid are skipped. With
    /// wrapping every neighbour maps back into the grid, so the count is 4.
    fn square_neighbors(&self, x: i64, y: i64, half: i64, wrap: bool) -> (f32, u32) {
        let mut sum = 0.0;
        let mut count = 0;
        for (dx, dy) in [(0, -half), (half, 0), (0, half), (-half, 0)] {
            let (mut nx, mut ny) = (x + dx, y + dy);
            if wrap {
                nx = nx.rem_euclid(self.size);
                ny = ny.rem_euclid(self.size);
            }
            if let Some(h) = self.heightmap.try_height(nx, ny) {
                sum += h;
                count += 1;
            }
        }
        (sum, count)
    }

    fn square_step(&mut self, x: i64, y: i64, half: i64, range: f32, wrap: bool) {
        let (sum, count) = self.square_neighbors(x, y, half, wrap);
        let avg = sum / count as f32;
        let offset = self.draw() * range;
        self.set(x, y, avg + offset);
    }

    /// Runs all rounds and returns the grid normalized to `[0, 1]`.
    ///
    /// A grid whose spread stays within the flat epsilon is returned
    /// unnormalized.
    pub fn generate(mut self, roughness: f32, wrap: bool) -> Result<Heightmap, HeightmapError> {
        check_roughness(roughness)?;

        let last = self.size - 1;
        for (x, y) in [(0, 0), (last, 0), (0, last), (last, last)] {
            let value = self.draw();
            self.set(x, y, value);
        }

        self.displace(1.0, 2.0_f32.powf(-roughness), wrap);
        Ok(self.finish())
    }

    /// Fills every non-corner cell, shrinking `range` by `decay` per round.
    fn displace(&mut self, mut range: f32, decay: f32, wrap: bool) {
        let mut step = self.size - 1;
        while step > 1 {
            let half = step / 2;
            tracing::debug!(step, range, "diamond-square round");

            for (x, y) in diamond_points(self.size, step) {
                self.diamond_step(x, y, half, range);
            }
            for (x, y) in square_points(self.size, step) {
                self.square_step(x, y, half, range, wrap);
            }

            range *= decay;
            step /= 2;
        }
    }

    fn finish(mut self) -> Heightmap {
        if !self.heightmap.normalize() {
            tracing::warn!(size = self.size, "heightmap is flat, skipping normalization");
        }
        self.heightmap
    }
}

/// Generates a diamond-square heightmap from `config`.
pub fn diamond_square(config: &DiamondSquareConfig) -> Result<Heightmap, HeightmapError> {
    config.validate()?;
    DiamondSquare::new(config.size, config.seed)?.generate(config.roughness, config.wrap)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::terrain::FLAT_EPSILON;

    fn mean_neighbor_delta(map: &Heightmap) -> f32 {
        let res = map.resolution;
        let mut total = 0.0;
        let mut n = 0;
        for y in 0..res {
            for x in 1..res {
                total += (map.get_height(x, y) - map.get_height(x - 1, y)).abs();
                n += 1;
            }
        }
        total / n as f32
    }

    #[test]
    fn test_valid_sizes() {
        for size in [3, 5, 9, 17, 33, 65, 129, 257, 513, 1025] {
            assert!(is_valid_size(size), "{} should be valid", size);
        }
        for size in [0, 1, 2, 4, 10, 128, 256, 1024] {
            assert!(!is_valid_size(size), "{} should be invalid", size);
        }
    }

    #[test]
    fn test_invalid_size_rejected() {
        let config = DiamondSquareConfig::new(10, 1);
        assert_eq!(diamond_square(&config), Err(HeightmapError::InvalidSize { size: 10 }));
        assert!(DiamondSquare::new(10, 1).is_err());
        assert!(DiamondSquare::new(1, 1).is_err());
    }

    #[test]
    fn test_non_finite_roughness_rejected() {
        let config = DiamondSquareConfig {
            roughness: f32::NAN,
            ..DiamondSquareConfig::new(5, 1)
        };
        assert!(matches!(
            diamond_square(&config),
            Err(HeightmapError::NonFiniteRoughness(_))
        ));
    }

    #[test]
    fn test_negative_roughness_rejected() {
        let config = DiamondSquareConfig {
            roughness: -200.0,
            ..DiamondSquareConfig::new(9, 1)
        };
        assert_eq!(config.validate(), Err(HeightmapError::NegativeRoughness(-200.0)));
        assert_eq!(diamond_square(&config), Err(HeightmapError::NegativeRoughness(-200.0)));

        let generator = DiamondSquare::new(9, 1).unwrap();
        assert_eq!(generator.generate(-0.5, false), Err(HeightmapError::NegativeRoughness(-0.5)));
    }

    #[test]
    fn test_extreme_roughness_stays_finite() {
        let map = diamond_square(&DiamondSquareConfig {
            roughness: 200.0,
            ..DiamondSquareConfig::new(9, 1)
        })
        .unwrap();
        assert!(map.heights.iter().all(|h| h.is_finite()));
        assert_eq!(map.height_range(), (0.0, 1.0));
    }

    #[test]
    fn test_flat_grid_is_left_unnormalized() {
        let mut generator = DiamondSquare::new(9, 4).unwrap();
        generator.heightmap.heights.iter_mut().for_each(|h| *h = 0.25);
        generator.displace(1e-6, 0.5, false);
        let map = generator.finish();

        let (min, max) = map.height_range();
        assert!(max - min <= FLAT_EPSILON);
        assert!(
            map.heights.iter().all(|h| (h - 0.25).abs() <= FLAT_EPSILON),
            "values must keep their level"
        );
        assert!(max < 1.0, "flat grid must not be stretched to [0, 1]");

        let mut generator = DiamondSquare::new(5, 4).unwrap();
        generator.heightmap.heights.iter_mut().for_each(|h| *h = -0.75);
        generator.displace(0.0, 0.0, true);
        let map = generator.finish();
        assert!(map.heights.iter().all(|&h| h == -0.75));
    }

    #[test]
    fn test_round_points_cover_grid() {
        // Every cell except the four corners is visited exactly once.
        for size in [3_i64, 5, 9, 17] {
            let mut visits = vec![0u32; (size * size) as usize];
            let mut step = size - 1;
            while step > 1 {
                for (x, y) in diamond_points(size, step).chain(square_points(size, step)) {
                    visits[(y * size + x) as usize] += 1;
                }
                step /= 2;
            }
            let last = size - 1;
            for y in 0..size {
                for x in 0..size {
                    let is_corner = (x == 0 || x == last) && (y == 0 || y == last);
                    let expected = if is_corner { 0 } else { 1 };
                    assert_eq!(visits[(y * size + x) as usize], expected, "cell ({}, {})", x, y);
                }
            }
        }
    }

    #[test]
    fn test_generation_reproducibility() {
        let config = DiamondSquareConfig::new(5, 42);
        let a = diamond_square(&config).unwrap();
        let b = diamond_square(&config).unwrap();
        assert_eq!(a, b, "Same seed should reproduce the grid exactly");
        assert_eq!(a.resolution, 5);
        assert_eq!(a.cell_count(), 25);
    }

    #[test]
    fn test_different_seeds_produce_different_grids() {
        let a = diamond_square(&DiamondSquareConfig::new(17, 1)).unwrap();
        let b = diamond_square(&DiamondSquareConfig::new(17, 2)).unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn test_output_is_normalized() {
        for wrap in [false, true] {
            for seed in [0, 7, 12345] {
                let config = DiamondSquareConfig {
                    wrap,
                    ..DiamondSquareConfig::new(33, seed)
                };
                let map = diamond_square(&config).unwrap();
                let (min, max) = map.height_range();
                assert_eq!(min, 0.0);
                assert_eq!(max, 1.0);
                assert!(map.heights.iter().all(|h| (0.0..=1.0).contains(h)));
            }
        }
    }

    #[test]
    fn test_wrap_always_uses_four_neighbors() {
        let mut generator = DiamondSquare::new(5, 3).unwrap();
        generator.heightmap.heights.iter_mut().for_each(|h| *h = 1.0);
        let size = generator.size;
        let mut step = size - 1;
        while step > 1 {
            let half = step / 2;
            for (x, y) in square_points(size, step) {
                let (sum, count) = generator.square_neighbors(x, y, half, true);
                assert_eq!(count, 4, "square point ({}, {}) at step {}", x, y, step);
                assert_eq!(sum, 4.0);
            }
            step /= 2;
        }
    }

    #[test]
    fn test_edges_use_three_neighbors_without_wrap() {
        let generator = DiamondSquare::new(5, 3).unwrap();
        assert_eq!(generator.square_neighbors(2, 0, 2, false).1, 3);
        assert_eq!(generator.square_neighbors(0, 2, 2, false).1, 3);
        assert_eq!(generator.square_neighbors(2, 4, 2, false).1, 3);
        assert_eq!(generator.square_neighbors(1, 2, 1, false).1, 4);
    }

    #[test]
    fn test_wrap_changes_edges() {
        let plain = diamond_square(&DiamondSquareConfig::new(9, 5)).unwrap();
        let wrapped = diamond_square(&DiamondSquareConfig {
            wrap: true,
            ..DiamondSquareConfig::new(9, 5)
        })
        .unwrap();
        assert_ne!(plain, wrapped);
    }

    #[test]
    fn test_faster_decay_gives_smoother_terrain() {
        let rough = diamond_square(&DiamondSquareConfig {
            roughness: 0.0,
            ..DiamondSquareConfig::new(129, 7)
        })
        .unwrap();
        let smooth = diamond_square(&DiamondSquareConfig {
            roughness: 2.0,
            ..DiamondSquareConfig::new(129, 7)
        })
        .unwrap();
        assert!(mean_neighbor_delta(&smooth) < mean_neighbor_delta(&rough));
    }

    #[test]
    fn test_smallest_grid() {
        let map = diamond_square(&DiamondSquareConfig::new(3, 99)).unwrap();
        assert_eq!(map.resolution, 3);
        let (min, max) = map.height_range();
        assert_eq!((min, max), (0.0, 1.0));
    }
}
