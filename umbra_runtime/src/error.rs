use crate::registry::StoreError;

#[derive(Debug, thiserror::Error)]
/// Runtime-layer errors.
pub enum Error {
    /// A scheme-level failure bubbled up from the evaluator.
    #[error("{0}")]
    Ckks(#[from] umbra_ckks::Error),

    /// Bytes that do not decode into a well-formed ciphertext or key.
    #[error("malformed ciphertext: {0}")]
    MalformedCiphertext(String),

    /// Bytes that decode structurally but were produced under a different
    /// parameter set (wrong ring degree, chain length, or level).
    #[error("parameter mismatch: {0}")]
    ParameterMismatch(String),

    /// The caller-supplied query ciphertext is unusable. Terminal for the
    /// whole request, unlike per-entry failures which are skipped.
    #[error("query rejected: {0}")]
    QueryRejected(String),

    /// Blob retrieval failed.
    #[error("{0}")]
    Store(#[from] StoreError),

    /// The registry manifest could not be loaded.
    #[error("manifest error: {0}")]
    Manifest(String),
}

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, Error>;
