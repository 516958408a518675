//! Key material.
//!
//! All keys live over the extended basis `q_0, …, q_{L-1}, p` (the chain
//! plus the special prime) in the NTT domain, except the public key which
//! never leaves the chain basis. Keys are generated once at setup and are
//! immutable afterwards; the runtime shares them behind `Arc`.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::entities::RnsPoly;

/// The secret key: a ternary ring element, stored residue-wise over the
/// extended basis (chain limbs first, special-prime limb last).
///
/// # Security
/// Never leaves the process that generated it; the codec deliberately has
/// no serializer for it.
#[derive(Debug, Clone)]
pub struct SecretKey {
    /// `s` in NTT form, `chain_len + 1` limbs.
    pub s: RnsPoly,
}

/// The public encryption key `(b, a) = (−a·s + e, a)` over the chain basis.
///
/// # Remarks
/// Public keys are a few hundred kB under the production parameter set;
/// serialize them with a compact binary protocol, not JSON.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PublicKey {
    /// `−a·s + e` (NTT domain, one limb per chain prime).
    pub b: RnsPoly,
    /// The uniform component `a` (NTT domain).
    pub a: RnsPoly,
}

/// One key-switching key: per chain prime `l`, an encryption of
/// `p · T_l · s'` under `s`, where `T_l` is the CRT interpolation factor of
/// prime `l` and `s'` is the key being switched away from.
#[derive(Debug, Clone)]
pub struct KeySwitchKey {
    /// Digit keys `(b_l, a_l)`, each over the extended basis.
    pub digits: Vec<(RnsPoly, RnsPoly)>,
}

/// Folds a degree-2 ciphertext back to degree 1: a key-switching key from
/// `s²` to `s`. One per parameter set.
#[derive(Debug, Clone)]
pub struct RelinearizationKey {
    /// The underlying switching key.
    pub ksk: KeySwitchKey,
}

/// Rotation keys, one per supported offset: a key-switching key from
/// `φ_{5^offset}(s)` to `s`.
#[derive(Debug, Clone)]
pub struct GaloisKeys {
    /// Offset → switching key.
    pub keys: BTreeMap<usize, KeySwitchKey>,
}

impl GaloisKeys {
    /// The switching key for `offset`, if one was generated.
    pub fn get(&self, offset: usize) -> Option<&KeySwitchKey> {
        self.keys.get(&offset)
    }

    /// Offsets this key set supports, ascending.
    pub fn offsets(&self) -> impl Iterator<Item = usize> + '_ {
        self.keys.keys().copied()
    }
}
