//! Square heightmap grid.

use serde::{Deserialize, Serialize};

/// Height spread below which a grid counts as flat and is left unnormalized.
pub const FLAT_EPSILON: f32 = 1e-4;

/// A square grid of heights.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Heightmap {
    /// Side length in cells.
    pub resolution: u32,
    /// Height values stored in row-major order.
    pub heights: Vec<f32>,
}

impl Heightmap {
    /// Creates a grid of `resolution * resolution` zeros.
    pub fn new(resolution: u32) -> Self {
        let size = (resolution as usize) * (resolution as usize);
        Self {
            resolution,
            heights: vec![0.0; size],
        }
    }

    #[inline]
    fn index(&self, x: u32, y: u32) -> usize {
        (y as usize) * (self.resolution as usize) + x as usize
    }

    /// Returns the height at the given cell.
    ///
    /// # Panics
    /// Panics if x or y is out of bounds.
    pub fn get_height(&self, x: u32, y: u32) -> f32 {
        debug_assert!(x < self.resolution && y < self.resolution);
        self.heights[self.index(x, y)]
    }

    /// Sets the height at the given cell.
    ///
    /// # Panics
    /// Panics if x or y is out of bounds.
    pub fn set_height(&mut self, x: u32, y: u32, height: f32) {
        debug_assert!(x < self.resolution && y < self.resolution);
        let i = self.index(x, y);
        self.heights[i] = height;
    }

    /// Returns the height at a signed cell, or `None` outside the grid.
    pub fn try_height(&self, x: i64, y: i64) -> Option<f32> {
        let res = i64::from(self.resolution);
        if x < 0 || y < 0 || x >= res || y >= res {
            return None;
        }
        Some(self.heights[self.index(x as u32, y as u32)])
    }

    /// Returns the total number of cells.
    pub fn cell_count(&self) -> usize {
        self.heights.len()
    }

    /// Computes the min and max height values.
    pub fn height_range(&self) -> (f32, f32) {
        let mut min = f32::MAX;
        let mut max = f32::MIN;
        for &height in &self.heights {
            min = min.min(height);
            max = max.max(height);
        }
        (min, max)
    }

    /// Linearly rescales all heights to `[0, 1]`.
    ///
    /// # Returns
    /// `false` if the spread is at most [`FLAT_EPSILON`], in which case the
    /// heights are left as they were.
    pub fn normalize(&mut self) -> bool {
        let (min, max) = self.height_range();
        let range = max - min;
        if range.is_nan() || range <= FLAT_EPSILON {
            return false;
        }
        for height in &mut self.heights {
            *height = (*height - min) / range;
        }
        true
    }

    /// Iterates over rows from `y = 0` upward.
    pub fn rows(&self) -> impl Iterator<Item = &[f32]> + '_ {
        self.heights.chunks_exact(self.resolution.max(1) as usize)
    }
}
