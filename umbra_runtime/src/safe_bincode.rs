//! A safe wrapper around [`bincode`] deserialization that limits input
//! sizes and validates the result against the active parameter set, so
//! malicious or truncated wire data cannot cause huge allocations or smuggle
//! out-of-range residues into the evaluator.

use bincode::{DefaultOptions, Options};
use serde::Deserialize;
use umbra_ckks::Params;

use crate::error::Result;

/// Size bound and validity check for a type deserialized from untrusted
/// bytes.
pub trait GetSize {
    /// The largest serialized size this type can have under `params`.
    fn get_size(params: &Params) -> usize;

    /// Check the deserialized object is well-formed under `params`.
    fn check_is_valid(&self, params: &Params) -> Result<()>;
}

/// Deserialize `data` with a size limit derived from `params`, then
/// validate.
pub fn deserialize<'a, T: GetSize + Deserialize<'a>>(data: &'a [u8], params: &Params) -> Result<T> {
    let options = DefaultOptions::new()
        .with_limit(T::get_size(params) as u64)
        .with_fixint_encoding()
        .allow_trailing_bytes();

    let mut deserializer = bincode::Deserializer::from_slice(data, options);
    let result = T::deserialize(&mut deserializer)
        .map_err(|e| crate::error::Error::MalformedCiphertext(e.to_string()))?;
    result.check_is_valid(params)?;

    Ok(result)
}
