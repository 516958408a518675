//! CKKS parameter sets.
//!
//! A parameter set fixes the polynomial ring `Z_q[X]/(X^N + 1)`, the RNS
//! modulus chain `q_0, …, q_{L-1}`, one auxiliary "special" prime used only
//! during key switching, and the default fixed-point scale Δ. All primes are
//! NTT-friendly (`q ≡ 1 mod 2N`) so polynomial products stay in the NTT
//! domain.
//!
//! Parameters are immutable once constructed and shared read-only by every
//! other component.

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Smallest supported ring-degree exponent.
pub const MIN_LOG_DEGREE: u32 = 10;

/// Largest supported ring-degree exponent.
pub const MAX_LOG_DEGREE: u32 = 16;

/// A single RNS prime together with its advertised bit width.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Modulus {
    /// The prime value `q`.
    pub value: u64,
    /// Bit width `q` was requested at.
    pub bits: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
/// The set of parameters for leveled CKKS evaluation.
///
/// # Remarks
/// The ciphertext modulus at level `l` is the product `q_0·…·q_l`; each
/// rescale divides out the last active prime and drops the level by one.
/// The special prime never carries ciphertext data — it only pads the
/// modulus during key switching so the switching noise can be divided
/// back out.
pub struct Params {
    /// log₂ of the polynomial ring degree N.
    pub log_degree: u32,
    /// The RNS modulus chain `q_0, …, q_{L-1}`.
    pub moduli: Vec<Modulus>,
    /// The auxiliary prime used during key switching.
    pub special_modulus: Modulus,
    /// Default fixed-point scale Δ applied by the encoder.
    pub scale: f64,
}

impl Params {
    /// Construct a parameter set, searching an NTT-friendly prime for each
    /// requested bit width.
    ///
    /// Fails with [`Error::InvalidParameters`] if the chain is empty, the
    /// ring degree is outside the supported range, or the slot count would
    /// be zero.
    pub fn new(
        log_degree: u32,
        moduli_bits: &[u32],
        special_bits: u32,
        scale: f64,
    ) -> Result<Self> {
        if moduli_bits.is_empty() {
            return Err(Error::InvalidParameters("empty modulus chain".into()));
        }
        if !(MIN_LOG_DEGREE..=MAX_LOG_DEGREE).contains(&log_degree) {
            return Err(Error::InvalidParameters(format!(
                "log_degree {log_degree} outside supported range [{MIN_LOG_DEGREE}, {MAX_LOG_DEGREE}]"
            )));
        }
        if !(scale.is_finite() && scale > 1.0) {
            return Err(Error::InvalidParameters(format!("unusable scale {scale}")));
        }

        let two_n = 1u64 << (log_degree + 1);
        let mut used = Vec::with_capacity(moduli_bits.len() + 1);
        let mut moduli = Vec::with_capacity(moduli_bits.len());
        for &bits in moduli_bits {
            let value = find_ntt_prime(bits, two_n, &used)?;
            used.push(value);
            moduli.push(Modulus { value, bits });
        }
        let special_value = find_ntt_prime(special_bits, two_n, &used)?;
        let special_modulus = Modulus {
            value: special_value,
            bits: special_bits,
        };

        let params = Self {
            log_degree,
            moduli,
            special_modulus,
            scale,
        };
        debug_assert!(params.slots() > 0);
        Ok(params)
    }

    /// The polynomial ring degree N.
    pub fn degree(&self) -> usize {
        1 << self.log_degree
    }

    /// Number of packed slots, N/2.
    pub fn slots(&self) -> usize {
        self.degree() / 2
    }

    /// The highest level a fresh ciphertext starts at.
    pub fn max_level(&self) -> usize {
        self.moduli.len() - 1
    }

    /// Number of primes in the chain.
    pub fn chain_len(&self) -> usize {
        self.moduli.len()
    }

    /// The power-of-two rotation offsets the similarity fold requires:
    /// `1, 2, 4, …` up to `slots − 1`, doubling each step. This is the
    /// minimal set that folds a full slot vector in ⌈log₂ slots⌉ steps.
    pub fn rotation_offsets(&self) -> Vec<usize> {
        let mut offsets = Vec::new();
        let mut offset = 1;
        while offset < self.slots() {
            offsets.push(offset);
            offset <<= 1;
        }
        offsets
    }
}

/// The canonical production parameter set: N = 2^13, chain bits
/// [60, 40, 40], one 60-bit special prime, Δ = 2^40.
///
/// # Remarks
/// Supports one ciphertext-ciphertext multiply followed by a rescale with a
/// level to spare, which is exactly the depth the dot-product circuit
/// consumes. Variants of this system have shipped with other chain lengths;
/// ciphertexts from those are rejected rather than reinterpreted.
pub fn pn13_qp200() -> Result<Params> {
    Params::new(13, &[60, 40, 40], 60, (1u64 << 40) as f64)
}

/// Search downward for a prime of `bits` width with `q ≡ 1 (mod two_n)`,
/// skipping values already taken by the chain.
fn find_ntt_prime(bits: u32, two_n: u64, used: &[u64]) -> Result<u64> {
    if !(20..=61).contains(&bits) {
        return Err(Error::InvalidParameters(format!(
            "modulus width {bits} outside supported range [20, 61]"
        )));
    }
    let upper = (1u64 << bits) - 1;
    let lower = 1u64 << (bits - 1);

    let mut candidate = upper - (upper % two_n) + 1;
    if candidate > upper {
        candidate -= two_n;
    }
    while candidate >= lower {
        if is_prime(candidate) && !used.contains(&candidate) {
            return Ok(candidate);
        }
        candidate -= two_n;
    }
    Err(Error::InvalidParameters(format!(
        "no {bits}-bit NTT-friendly prime for 2N = {two_n}"
    )))
}

/// Trial-division primality, sufficient for ≤ 61-bit candidates at setup
/// time.
fn is_prime(n: u64) -> bool {
    if n < 2 {
        return false;
    }
    if n == 2 || n == 3 {
        return true;
    }
    if n % 2 == 0 || n % 3 == 0 {
        return false;
    }
    let mut i = 5u64;
    while i.saturating_mul(i) <= n {
        if n % i == 0 || n % (i + 2) == 0 {
            return false;
        }
        i += 6;
    }
    true
}
