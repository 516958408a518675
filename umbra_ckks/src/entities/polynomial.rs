//! RNS polynomials: one residue vector per active prime.

use serde::{Deserialize, Serialize};

use crate::math::{mod_add, mod_from_i64, mod_mul, mod_neg, mod_sub};
use crate::params::Modulus;

/// A polynomial in `Z_Q[X]/(X^N + 1)` stored limb-wise: `limbs[l][i]` is
/// coefficient `i` reduced modulo the `l`-th prime. Whether the limbs hold
/// coefficients or NTT evaluations is decided by the owning entity; both
/// representations share this storage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RnsPoly {
    /// Residue vectors, one per prime.
    pub limbs: Vec<Vec<u64>>,
    /// Ring degree N.
    pub degree: usize,
}

impl RnsPoly {
    /// The all-zero polynomial with `limb_count` limbs of `degree`
    /// coefficients.
    pub fn zero(degree: usize, limb_count: usize) -> Self {
        Self {
            limbs: vec![vec![0u64; degree]; limb_count],
            degree,
        }
    }

    /// Build from signed integer coefficients, reducing into every prime of
    /// `moduli`.
    pub fn from_signed_coeffs(coeffs: &[i64], moduli: &[Modulus]) -> Self {
        let mut poly = Self::zero(coeffs.len(), moduli.len());
        for (limb, m) in poly.limbs.iter_mut().zip(moduli.iter()) {
            for (slot, &c) in limb.iter_mut().zip(coeffs.iter()) {
                *slot = mod_from_i64(c, m.value);
            }
        }
        poly
    }

    /// Number of limbs currently held.
    pub fn limb_count(&self) -> usize {
        self.limbs.len()
    }

    /// Element-wise sum.
    pub fn add(&self, other: &Self, moduli: &[Modulus]) -> Self {
        debug_assert_eq!(self.degree, other.degree);
        self.zip_with(other, moduli, mod_add)
    }

    /// Element-wise difference.
    pub fn sub(&self, other: &Self, moduli: &[Modulus]) -> Self {
        debug_assert_eq!(self.degree, other.degree);
        self.zip_with(other, moduli, mod_sub)
    }

    /// Hadamard product; this is the polynomial product when both operands
    /// are in the NTT domain.
    pub fn mul(&self, other: &Self, moduli: &[Modulus]) -> Self {
        debug_assert_eq!(self.degree, other.degree);
        self.zip_with(other, moduli, mod_mul)
    }

    /// Coefficient-wise negation.
    pub fn neg(&self, moduli: &[Modulus]) -> Self {
        let mut out = self.clone();
        for (limb, m) in out.limbs.iter_mut().zip(moduli.iter()) {
            for c in limb.iter_mut() {
                *c = mod_neg(*c, m.value);
            }
        }
        out
    }

    /// Accumulate `other ⊙ factor` into `self`, limb by limb.
    pub fn add_mul_assign(&mut self, other: &Self, factor: &Self, moduli: &[Modulus]) {
        for ((dst, (a, b)), m) in self
            .limbs
            .iter_mut()
            .zip(other.limbs.iter().zip(factor.limbs.iter()))
            .zip(moduli.iter())
        {
            let q = m.value;
            for ((d, &x), &y) in dst.iter_mut().zip(a.iter()).zip(b.iter()) {
                *d = mod_add(*d, mod_mul(x, y, q), q);
            }
        }
    }

    /// Drop trailing limbs, keeping the first `limb_count`. In RNS this is
    /// exactly reduction modulo the smaller prime product.
    pub fn truncate_limbs(&mut self, limb_count: usize) {
        debug_assert!(limb_count <= self.limbs.len());
        self.limbs.truncate(limb_count);
    }

    fn zip_with(
        &self,
        other: &Self,
        moduli: &[Modulus],
        f: impl Fn(u64, u64, u64) -> u64,
    ) -> Self {
        debug_assert_eq!(self.limb_count(), other.limb_count());
        let mut out = Self::zero(self.degree, self.limb_count());
        for (l, m) in moduli.iter().enumerate().take(self.limb_count()) {
            let q = m.value;
            for i in 0..self.degree {
                out.limbs[l][i] = f(self.limbs[l][i], other.limbs[l][i], q);
            }
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn moduli() -> Vec<Modulus> {
        vec![
            Modulus { value: 97, bits: 7 },
            Modulus { value: 113, bits: 7 },
        ]
    }

    #[test]
    fn signed_coefficients_reduce_per_limb() {
        let poly = RnsPoly::from_signed_coeffs(&[-1, 0, 5, 200], &moduli());
        assert_eq!(poly.limbs[0], vec![96, 0, 5, 6]);
        assert_eq!(poly.limbs[1], vec![112, 0, 5, 87]);
    }

    #[test]
    fn arithmetic_is_limb_wise() {
        let m = moduli();
        let a = RnsPoly::from_signed_coeffs(&[1, 2, 3, 4], &m);
        let b = RnsPoly::from_signed_coeffs(&[5, 6, 7, 8], &m);
        assert_eq!(a.add(&b, &m).limbs[0], vec![6, 8, 10, 12]);
        assert_eq!(b.sub(&a, &m).limbs[1], vec![4, 4, 4, 4]);
        assert_eq!(a.mul(&b, &m).limbs[0], vec![5, 12, 21, 32]);
        assert_eq!(a.neg(&m).limbs[0], vec![96, 95, 94, 93]);
    }

    #[test]
    fn accumulate_matches_manual_product() {
        let m = moduli();
        let mut acc = RnsPoly::zero(4, 2);
        let a = RnsPoly::from_signed_coeffs(&[1, 2, 3, 4], &m);
        let b = RnsPoly::from_signed_coeffs(&[2, 2, 2, 2], &m);
        acc.add_mul_assign(&a, &b, &m);
        acc.add_mul_assign(&a, &b, &m);
        assert_eq!(acc.limbs[0], vec![4, 8, 12, 16]);
    }
}
