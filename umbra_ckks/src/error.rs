#[derive(Debug, Clone, PartialEq, thiserror::Error)]
/// Errors produced while constructing parameters or evaluating on ciphertexts.
pub enum Error {
    /// The requested parameter set is not constructible.
    #[error("invalid parameters: {0}")]
    InvalidParameters(String),

    /// The operands of a homomorphic operation are incompatible (different
    /// ring degree, limb count, or level).
    #[error("evaluation error: {0}")]
    EvaluationError(String),

    /// The modulus chain has no prime left to drop; the circuit is deeper
    /// than the parameter set supports.
    #[error("modulus chain exhausted at level {level}")]
    LevelExhausted {
        /// Level of the ciphertext the operation was attempted on.
        level: usize,
    },

    /// No rotation key was generated for the requested offset.
    #[error("no rotation key for offset {offset}")]
    MissingRotationKey {
        /// The offset the caller asked for.
        offset: usize,
    },

    /// Operand scales differ by more than the reconciliation tolerance.
    #[error("scale mismatch: {a} vs {b}")]
    ScaleMismatch {
        /// Scale of the first operand.
        a: f64,
        /// Scale of the second operand.
        b: f64,
    },

    /// A ciphertext had the wrong degree for the operation (e.g.
    /// relinearizing a ciphertext that is not degree 2).
    #[error("ciphertext degree {got} where {expected} was required")]
    DegreeMismatch {
        /// Degree the operation requires.
        expected: usize,
        /// Degree the ciphertext actually has.
        got: usize,
    },

    /// The input vector does not fit the slot count of the parameter set.
    #[error("vector of length {len} exceeds the {slots} available slots")]
    InvalidVectorLength {
        /// Length of the offending input.
        len: usize,
        /// Slot count of the parameter set.
        slots: usize,
    },
}

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, Error>;
