//! Encoded-but-unencrypted messages.

use crate::entities::RnsPoly;

/// A message polynomial produced by the encoder, pinned to the level and
/// scale it was encoded at. The limbs are kept in the NTT domain so the
/// encryptor and plaintext operations can consume them directly.
#[derive(Debug, Clone)]
pub struct Plaintext {
    /// The encoded polynomial (NTT domain).
    pub poly: RnsPoly,
    /// Level the message was encoded at (limb count − 1).
    pub level: usize,
    /// Fixed-point scale Δ of the encoding.
    pub scale: f64,
}
