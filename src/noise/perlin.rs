//! Improved gradient (Perlin) noise in three dimensions.

use super::permutation::PermutationTable;
use super::source::NoiseSource;

/// Quintic ease curve `6t^5 - 15t^4 + 10t^3`.
///
/// Gives C2 continuity across lattice cell boundaries.
#[inline]
fn fade(t: f64) -> f64 {
    t * t * t * (t * (t * 6.0 - 15.0) + 10.0)
}

#[inline]
fn lerp(t: f64, a: f64, b: f64) -> f64 {
    a + t * (b - a)
}

/// Dot product of the offset with one of 12 gradient directions picked by the
/// low four bits of `hash` (hashes 12..16 repeat four of the twelve).
#[inline]
fn grad(hash: u8, x: f64, y: f64, z: f64) -> f64 {
    let h = hash & 15;
    let u = if h < 8 { x } else { y };
    let v = if h < 4 {
        y
    } else if h == 12 || h == 14 {
        x
    } else {
        z
    };
    (if h & 1 == 0 { u } else { -u }) + (if h & 2 == 0 { v } else { -v })
}

/// Lattice cell index of a coordinate, wrapped into `0..256`.
#[inline]
fn cell(coord: f64) -> usize {
    (coord.floor() as i64 & 255) as usize
}

/// Perlin noise engine holding a doubled permutation table.
///
/// Immutable after construction, so one engine can be shared between threads
/// for concurrent queries.
#[derive(Debug, Clone)]
pub struct Perlin {
    seed: u32,
    p: [u8; 512],
}

impl Perlin {
    /// Creates an engine whose table is shuffled from `seed`.
    pub fn new(seed: u32) -> Self {
        Self {
            seed,
            p: PermutationTable::new(seed).doubled(),
        }
    }

    /// The seed this engine was built from.
    pub fn seed(&self) -> u32 {
        self.seed
    }

    /// Samples 3D noise at `(x, y, z)`.
    ///
    /// # Returns
    /// A value in `[0, 1]`.
    pub fn noise(&self, x: f64, y: f64, z: f64) -> f64 {
        let p = &self.p;

        let xi = cell(x);
        let yi = cell(y);
        let zi = cell(z);

        let x = x - x.floor();
        let y = y - y.floor();
        let z = z - z.floor();

        let u = fade(x);
        let v = fade(y);
        let w = fade(z);

        // Hash the eight cube corners
        let a = p[xi] as usize + yi;
        let aa = p[a] as usize + zi;
        let ab = p[a + 1] as usize + zi;
        let b = p[xi + 1] as usize + yi;
        let ba = p[b] as usize + zi;
        let bb = p[b + 1] as usize + zi;

        let res = lerp(
            w,
            lerp(
                v,
                lerp(u, grad(p[aa], x, y, z), grad(p[ba], x - 1.0, y, z)),
                lerp(u, grad(p[ab], x, y - 1.0, z), grad(p[bb], x - 1.0, y - 1.0, z)),
            ),
            lerp(
                v,
                lerp(
                    u,
                    grad(p[aa + 1], x, y, z - 1.0),
                    grad(p[ba + 1], x - 1.0, y, z - 1.0),
                ),
                lerp(
                    u,
                    grad(p[ab + 1], x, y - 1.0, z - 1.0),
                    grad(p[bb + 1], x - 1.0, y - 1.0, z - 1.0),
                ),
            ),
        );

        ((res + 1.0) / 2.0).clamp(0.0, 1.0)
    }

    /// Samples the `z = 0` slice.
    pub fn noise_2d(&self, x: f64, y: f64) -> f64 {
        self.noise(x, y, 0.0)
    }
}

impl NoiseSource for Perlin {
    fn sample_2d(&self, x: f64, y: f64) -> f64 {
        self.noise_2d(x, y)
    }
}

/// Samples Perlin noise with a freshly built engine.
///
/// Each call shuffles a new table from `seed`; build a [`Perlin`] once when
/// issuing many queries.
pub fn perlin_noise(x: f64, y: f64, z: f64, seed: u32) -> f64 {
    Perlin::new(seed).noise(x, y, z)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{Rng, SeedableRng};
    use rand_chacha::ChaCha8Rng;

    #[test]
    fn test_fade_endpoints() {
        assert_eq!(fade(0.0), 0.0);
        assert_eq!(fade(1.0), 1.0);
        assert_eq!(fade(0.5), 0.5);
    }

    #[test]
    fn test_lerp() {
        assert_eq!(lerp(0.0, 2.0, 4.0), 2.0);
        assert_eq!(lerp(1.0, 2.0, 4.0), 4.0);
        assert_eq!(lerp(0.5, 2.0, 4.0), 3.0);
    }

    #[test]
    fn test_grad_directions() {
        // h = 0: (x + y)
        assert_eq!(grad(0, 1.0, 2.0, 3.0), 3.0);
        // h = 3: (-x - y)
        assert_eq!(grad(3, 1.0, 2.0, 3.0), -3.0);
        // h = 4: (x + z)
        assert_eq!(grad(4, 1.0, 2.0, 3.0), 4.0);
        // h = 12: (y + x)
        assert_eq!(grad(12, 1.0, 2.0, 3.0), 3.0);
        // high bits are ignored
        assert_eq!(grad(16, 1.0, 2.0, 3.0), grad(0, 1.0, 2.0, 3.0));
    }

    #[test]
    fn test_lattice_points_are_midpoint() {
        // All corner offsets vanish on integer coordinates.
        let perlin = Perlin::new(42);
        for (x, y, z) in [(0.0, 0.0, 0.0), (3.0, -7.0, 1.0), (255.0, 256.0, 12.0)] {
            assert_eq!(perlin.noise(x, y, z), 0.5);
        }
    }

    #[test]
    fn test_noise_reproducibility() {
        let a = Perlin::new(12345);
        let b = Perlin::new(12345);
        for (x, y, z) in [(0.3, 0.7, 0.0), (-12.25, 4.5, 9.75), (1000.1, 0.01, -3.3)] {
            let v = a.noise(x, y, z);
            assert_eq!(v.to_bits(), a.noise(x, y, z).to_bits());
            assert_eq!(v.to_bits(), b.noise(x, y, z).to_bits());
            assert_eq!(v.to_bits(), perlin_noise(x, y, z, 12345).to_bits());
        }
    }

    #[test]
    fn test_noise_range() {
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        for seed in [0, 1, 777] {
            let perlin = Perlin::new(seed);
            for _ in 0..10_000 {
                let x = rng.random_range(-500.0..500.0);
                let y = rng.random_range(-500.0..500.0);
                let z = rng.random_range(-500.0..500.0);
                let v = perlin.noise(x, y, z);
                assert!((0.0..=1.0).contains(&v), "Noise value {} out of range", v);
                let v2 = perlin.noise_2d(x, y);
                assert!((0.0..=1.0).contains(&v2), "Noise value {} out of range", v2);
            }
        }
    }

    #[test]
    fn test_continuity_across_cell_boundary() {
        let perlin = Perlin::new(9);
        for (y, z) in [(0.3, 0.0), (5.6, 2.2), (-1.4, 0.9)] {
            let left = perlin.noise(0.999, y, z);
            let right = perlin.noise(1.001, y, z);
            assert!(
                (left - right).abs() < 0.02,
                "Discontinuity at x=1: {} vs {}",
                left,
                right
            );
        }
    }

    #[test]
    fn test_negative_coordinates_wrap() {
        let perlin = Perlin::new(3);
        // Period of the lattice hash is 256 cells.
        let a = perlin.noise(-0.4, 0.3, 0.0);
        let b = perlin.noise(255.6, 0.3, 0.0);
        assert!((a - b).abs() < 1e-12);
    }

    #[test]
    fn test_noise_varies() {
        let perlin = Perlin::new(11);
        let a = perlin.noise_2d(0.5, 0.5);
        let b = perlin.noise_2d(10.5, 3.5);
        let c = perlin.noise_2d(-4.2, 7.9);
        assert!(a != b || b != c, "Noise should vary over space");
    }

    #[test]
    fn test_different_seeds_produce_different_results() {
        let mut differ = false;
        for i in 0..16 {
            let x = 0.37 + i as f64 * 1.13;
            if perlin_noise(x, 0.61, 0.0, 1) != perlin_noise(x, 0.61, 0.0, 2) {
                differ = true;
            }
        }
        assert!(differ, "Different seeds should produce different fields");
    }

    #[test]
    fn test_engine_is_shareable() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<Perlin>();
    }
}
