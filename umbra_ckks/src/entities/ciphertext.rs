//! RLWE ciphertexts.

use serde::{Deserialize, Serialize};

use crate::entities::RnsPoly;

/// A leveled CKKS ciphertext.
///
/// # Remarks
/// `parts` holds the ring elements `c_0, …, c_d` (NTT domain); a freshly
/// encrypted ciphertext has degree 1 (two parts), and a multiplication
/// transiently produces degree 2 until relinearization folds it back.
/// Every evaluator operation consumes its operands and returns a new value;
/// ciphertexts are never mutated through a shared handle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Ciphertext {
    /// Ring elements, `degree + 1` of them.
    pub parts: Vec<RnsPoly>,
    /// Remaining rescale budget; the number of active limbs is `level + 1`.
    pub level: usize,
    /// Current fixed-point scale.
    pub scale: f64,
}

impl Ciphertext {
    /// The ciphertext degree: 1 after encryption, 2 after an unrelinearized
    /// multiplication.
    pub fn degree(&self) -> usize {
        self.parts.len() - 1
    }

    /// Ring degree of the underlying polynomials.
    pub fn ring_degree(&self) -> usize {
        self.parts[0].degree
    }
}
