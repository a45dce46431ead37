//! Input data generation for the benchmark driver.

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

/// Largest key the random generator produces.
pub const KEY_MAX: i32 = 1_000_000_000;

/// Fill a rank's block with reproducible pseudo-random keys in
/// `[0, KEY_MAX]`. The seed `42 + rank * 12345` makes runs deterministic
/// while keeping the streams distinct per rank.
pub fn generate_random_keys(nkeys: usize, rank: usize) -> Vec<i32> {
    let mut rng = ChaCha8Rng::seed_from_u64(42 + rank as u64 * 12345);
    (0..nkeys).map(|_| rng.gen_range(0..=KEY_MAX)).collect()
}

/// Produce the globally sorted ramp `rank * nkeys .. (rank + 1) * nkeys`.
///
/// With the same `nkeys` on every rank the distributed array is already
/// sorted, which makes this the input of choice for idempotence and balance
/// checks.
pub fn generate_uniform_keys(nkeys: usize, rank: usize) -> Vec<i32> {
    let base = (rank * nkeys) as i32;
    (0..nkeys as i32).map(|i| base + i).collect()
}
