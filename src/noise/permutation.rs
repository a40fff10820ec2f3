//! Seeded permutation tables shared by the gradient noise engines.

use rand::seq::SliceRandom;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

/// Number of distinct entries in a permutation table.
pub const TABLE_SIZE: usize = 256;

/// A seeded permutation of the integers `0..=255`.
///
/// The table is built once and never mutated afterwards. The same seed always
/// produces the same table, which is what makes noise fields reproducible.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PermutationTable {
    values: [u8; TABLE_SIZE],
}

impl PermutationTable {
    /// Builds a permutation by Fisher-Yates shuffling `0..=255` with a
    /// ChaCha8 generator seeded from `seed`.
    pub fn new(seed: u32) -> Self {
        let mut values: [u8; TABLE_SIZE] = std::array::from_fn(|i| i as u8);
        let mut rng = ChaCha8Rng::seed_from_u64(u64::from(seed));
        values.shuffle(&mut rng);
        Self { values }
    }

    /// Returns the underlying 256 entries.
    pub fn values(&self) -> &[u8; TABLE_SIZE] {
        &self.values
    }

    /// Looks up an entry, wrapping the index into `0..256`.
    pub fn get(&self, index: usize) -> u8 {
        self.values[index & (TABLE_SIZE - 1)]
    }

    /// Expands the table to 512 entries with `perm[i] = base[i & 255]`.
    ///
    /// Equivalent to the table concatenated with itself, so lookups of the
    /// form `p[p[x] + y]` with `x, y < 256` never need a modulo.
    pub fn doubled(&self) -> [u8; TABLE_SIZE * 2] {
        std::array::from_fn(|i| self.get(i))
    }
}
