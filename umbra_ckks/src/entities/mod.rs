//! Data entities: polynomials, plaintexts, ciphertexts, and key material.

mod ciphertext;
mod keys;
mod plaintext;
mod polynomial;

pub use ciphertext::Ciphertext;
pub use keys::{GaloisKeys, KeySwitchKey, PublicKey, RelinearizationKey, SecretKey};
pub use plaintext::Plaintext;
pub use polynomial::RnsPoly;
