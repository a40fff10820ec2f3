//! Two-dimensional simplex noise.

use super::permutation::PermutationTable;
use super::source::NoiseSource;

/// Gradient directions; only the first two components are used in 2D.
const GRAD3: [[f64; 3]; 12] = [
    [1.0, 1.0, 0.0],
    [-1.0, 1.0, 0.0],
    [1.0, -1.0, 0.0],
    [-1.0, -1.0, 0.0],
    [1.0, 0.0, 1.0],
    [-1.0, 0.0, 1.0],
    [1.0, 0.0, -1.0],
    [-1.0, 0.0, -1.0],
    [0.0, 1.0, 1.0],
    [0.0, -1.0, 1.0],
    [0.0, 1.0, -1.0],
    [0.0, -1.0, -1.0],
];

/// Output scale that brings the summed corner contributions to roughly `[-1, 1]`.
const OUTPUT_SCALE: f64 = 70.0;

/// Skew factor `(sqrt(3) - 1) / 2`.
fn skew_factor() -> f64 {
    0.5 * (3.0_f64.sqrt() - 1.0)
}

/// Unskew factor `(3 - sqrt(3)) / 6`.
fn unskew_factor() -> f64 {
    (3.0 - 3.0_f64.sqrt()) / 6.0
}

/// Contribution of one simplex corner with radial falloff `(0.5 - r^2)^4`.
#[inline]
fn corner(gi: usize, x: f64, y: f64) -> f64 {
    let t = 0.5 - x * x - y * y;
    if t < 0.0 {
        0.0
    } else {
        let t2 = t * t;
        let g = &GRAD3[gi];
        t2 * t2 * (g[0] * x + g[1] * y)
    }
}

/// Simplex noise engine for 2D queries.
#[derive(Debug, Clone)]
pub struct Simplex {
    seed: u32,
    perm: [u8; 512],
    f2: f64,
    g2: f64,
}

impl Simplex {
    /// Creates an engine whose table is shuffled from `seed`.
    pub fn new(seed: u32) -> Self {
        Self {
            seed,
            perm: PermutationTable::new(seed).doubled(),
            f2: skew_factor(),
            g2: unskew_factor(),
        }
    }

    /// The seed this engine was built from.
    pub fn seed(&self) -> u32 {
        self.seed
    }

    /// Samples noise at `(xin, yin)`.
    ///
    /// # Returns
    /// A value in `[0, 1]`.
    pub fn noise_2d(&self, xin: f64, yin: f64) -> f64 {
        let perm = &self.perm;
        let g2 = self.g2;

        // Skew into simplex space to find the containing cell
        let s = (xin + yin) * self.f2;
        let i = (xin + s).floor();
        let j = (yin + s).floor();

        // Unskew the cell origin back to input space
        let t = (i + j) * g2;
        let x0 = xin - (i - t);
        let y0 = yin - (j - t);

        // Lower triangle visits (1,0) second, upper triangle (0,1)
        let (i1, j1) = if x0 > y0 { (1, 0) } else { (0, 1) };

        let x1 = x0 - i1 as f64 + g2;
        let y1 = y0 - j1 as f64 + g2;
        let x2 = x0 - 1.0 + 2.0 * g2;
        let y2 = y0 - 1.0 + 2.0 * g2;

        let ii = (i as i64 & 255) as usize;
        let jj = (j as i64 & 255) as usize;
        let gi0 = perm[ii + perm[jj] as usize] as usize % 12;
        let gi1 = perm[ii + i1 + perm[jj + j1] as usize] as usize % 12;
        let gi2 = perm[ii + 1 + perm[jj + 1] as usize] as usize % 12;

        let n = corner(gi0, x0, y0) + corner(gi1, x1, y1) + corner(gi2, x2, y2);

        ((OUTPUT_SCALE * n + 1.0) / 2.0).clamp(0.0, 1.0)
    }
}

impl NoiseSource for Simplex {
    fn sample_2d(&self, x: f64, y: f64) -> f64 {
        self.noise_2d(x, y)
    }
}

/// Samples simplex noise with a freshly built engine.
///
/// Each call shuffles a new table from `seed`; build a [`Simplex`] once when
/// issuing many queries.
pub fn simplex_noise(x: f64, y: f64, seed: u32) -> f64 {
    Simplex::new(seed).noise_2d(x, y)
}
