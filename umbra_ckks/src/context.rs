//! Shared evaluation context: the parameter set plus every table derived
//! from it.
//!
//! Construction happens once at process start; afterwards the context is
//! read-only and safe to share across threads (typically behind an `Arc`).

use crate::error::{Error, Result};
use crate::math::fft::EmbeddingTables;
use crate::math::ntt::NttTables;
use crate::params::{Modulus, Params};

/// Immutable per-parameter-set state: NTT tables for each chain prime and
/// the special prime, and the canonical-embedding tables for the encoder.
#[derive(Debug)]
pub struct Context {
    params: Params,
    ntt: Vec<NttTables>,
    ntt_special: NttTables,
    embedding: EmbeddingTables,
}

impl Context {
    /// Derive all tables for `params`.
    pub fn new(params: Params) -> Result<Self> {
        let n = params.degree();
        let two_n = (2 * n) as u64;
        for m in params.moduli.iter().chain([&params.special_modulus]) {
            if m.value % two_n != 1 {
                return Err(Error::InvalidParameters(format!(
                    "prime {} is not NTT-friendly for ring degree {n}",
                    m.value
                )));
            }
        }

        let ntt = params
            .moduli
            .iter()
            .map(|m| NttTables::new(n, m.value))
            .collect();
        let ntt_special = NttTables::new(n, params.special_modulus.value);
        let embedding = EmbeddingTables::new(n);

        Ok(Self {
            params,
            ntt,
            ntt_special,
            embedding,
        })
    }

    /// The parameter set this context serves.
    pub fn params(&self) -> &Params {
        &self.params
    }

    /// NTT tables for chain prime `l`.
    pub fn ntt(&self, l: usize) -> &NttTables {
        &self.ntt[l]
    }

    /// NTT tables for the special prime.
    pub fn ntt_special(&self) -> &NttTables {
        &self.ntt_special
    }

    /// Canonical-embedding tables.
    pub fn embedding(&self) -> &EmbeddingTables {
        &self.embedding
    }

    /// The chain moduli active at `level` (level + 1 limbs).
    pub fn active_moduli(&self, level: usize) -> &[Modulus] {
        &self.params.moduli[..=level]
    }

    /// Transform every chain limb of a polynomial to the NTT domain.
    pub fn ntt_forward_all(&self, poly: &mut crate::entities::RnsPoly) {
        for (l, limb) in poly.limbs.iter_mut().enumerate() {
            self.ntt[l].forward(limb);
        }
    }

    /// Transform every chain limb of a polynomial back to coefficients.
    pub fn ntt_inverse_all(&self, poly: &mut crate::entities::RnsPoly) {
        for (l, limb) in poly.limbs.iter_mut().enumerate() {
            self.ntt[l].inverse(limb);
        }
    }
}
