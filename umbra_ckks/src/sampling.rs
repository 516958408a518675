//! Randomness for key generation and encryption.
//!
//! Secrets and ephemeral masks are ternary; errors follow a rounded
//! Gaussian with σ ≈ 3.2; the `a` components are uniform per prime. All
//! samplers take the caller's RNG so deterministic test seeds work.

use rand::{CryptoRng, Rng, RngCore};
use rand_distr::{Distribution, Normal};

/// Standard deviation of the RLWE error distribution.
pub const ERROR_STD_DEV: f64 = 3.2;

/// Sample `n` ternary coefficients, each of {-1, 0, 1} with equal weight.
pub fn sample_ternary<R: RngCore + CryptoRng>(rng: &mut R, n: usize) -> Vec<i64> {
    (0..n).map(|_| rng.gen_range(-1i64..=1)).collect()
}

/// Sample `n` rounded-Gaussian error coefficients as signed integers, so
/// the same draw can be reduced consistently into every RNS limb.
pub fn sample_gaussian<R: RngCore + CryptoRng>(rng: &mut R, n: usize) -> Vec<i64> {
    let normal = Normal::new(0.0, ERROR_STD_DEV).expect("valid sigma");
    (0..n).map(|_| normal.sample(rng).round() as i64).collect()
}

/// Sample `n` coefficients uniform in `[0, q)`.
pub fn sample_uniform<R: RngCore + CryptoRng>(rng: &mut R, n: usize, q: u64) -> Vec<u64> {
    (0..n).map(|_| rng.gen_range(0..q)).collect()
}
