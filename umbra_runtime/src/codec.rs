//! Wire codec for ciphertexts and public keys.
//!
//! The binary layout is plain fixint bincode over the entity structs, so a
//! serialize/deserialize cycle reproduces level, scale, and every limb bit
//! for bit. No compatibility is promised across parameter sets: bytes
//! produced under a different ring degree or chain are rejected during
//! validation, never reinterpreted.

use umbra_ckks::{Ciphertext, Params, PublicKey, RnsPoly};

use crate::error::{Error, Result};
use crate::safe_bincode::{self, GetSize};

/// Serialize a ciphertext for transport.
pub fn serialize_ciphertext(ct: &Ciphertext) -> Result<Vec<u8>> {
    bincode::serialize(ct).map_err(|e| Error::MalformedCiphertext(e.to_string()))
}

/// Deserialize and validate a ciphertext received over the wire.
pub fn deserialize_ciphertext(bytes: &[u8], params: &Params) -> Result<Ciphertext> {
    safe_bincode::deserialize(bytes, params)
}

/// Serialize the public key for transport.
pub fn serialize_public_key(pk: &PublicKey) -> Result<Vec<u8>> {
    bincode::serialize(pk).map_err(|e| Error::MalformedCiphertext(e.to_string()))
}

/// Deserialize and validate a public key received over the wire.
pub fn deserialize_public_key(bytes: &[u8], params: &Params) -> Result<PublicKey> {
    safe_bincode::deserialize(bytes, params)
}

/// Fixint-encoded size of one limb vector: length prefix plus the
/// coefficients.
fn limb_size(params: &Params) -> usize {
    8 + params.degree() * 8
}

/// Size of an [`RnsPoly`] with every chain limb present.
fn poly_size(params: &Params) -> usize {
    // Limb vec length + limbs + the degree field.
    8 + params.chain_len() * limb_size(params) + 8
}

fn check_poly(poly: &RnsPoly, params: &Params, limbs: usize, what: &str) -> Result<()> {
    if poly.degree != params.degree() {
        return Err(Error::ParameterMismatch(format!(
            "{what} has ring degree {} under a degree-{} parameter set",
            poly.degree,
            params.degree()
        )));
    }
    if poly.limb_count() != limbs {
        return Err(Error::ParameterMismatch(format!(
            "{what} carries {} limbs where {limbs} were expected",
            poly.limb_count()
        )));
    }
    for (l, limb) in poly.limbs.iter().enumerate() {
        if limb.len() != params.degree() {
            return Err(Error::MalformedCiphertext(format!(
                "{what} limb {l} holds {} coefficients",
                limb.len()
            )));
        }
        let q = params.moduli[l].value;
        if limb.iter().any(|&c| c >= q) {
            return Err(Error::MalformedCiphertext(format!(
                "{what} limb {l} has a residue outside [0, {q})"
            )));
        }
    }
    Ok(())
}

impl GetSize for Ciphertext {
    fn get_size(params: &Params) -> usize {
        // Up to three parts (a transient degree-2 ciphertext), the parts
        // vec length, level, and scale.
        8 + 3 * poly_size(params) + 8 + 8
    }

    fn check_is_valid(&self, params: &Params) -> Result<()> {
        if !(2..=3).contains(&self.parts.len()) {
            return Err(Error::MalformedCiphertext(format!(
                "ciphertext with {} parts",
                self.parts.len()
            )));
        }
        if self.level > params.max_level() {
            return Err(Error::ParameterMismatch(format!(
                "level {} under a chain of {} primes",
                self.level,
                params.chain_len()
            )));
        }
        if !(self.scale.is_finite() && self.scale > 0.0) {
            return Err(Error::MalformedCiphertext(format!(
                "unusable scale {}",
                self.scale
            )));
        }
        for part in &self.parts {
            check_poly(part, params, self.level + 1, "ciphertext part")?;
        }
        Ok(())
    }
}

impl GetSize for PublicKey {
    fn get_size(params: &Params) -> usize {
        2 * poly_size(params) + 8
    }

    fn check_is_valid(&self, params: &Params) -> Result<()> {
        check_poly(&self.b, params, params.chain_len(), "public key b")?;
        check_poly(&self.a, params, params.chain_len(), "public key a")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;
    use umbra_ckks::ops::{encoding, encryption};
    use umbra_ckks::{Context, KeySet};

    fn setup() -> (Context, KeySet, StdRng) {
        let params = Params::new(10, &[60, 40, 40], 60, (1u64 << 40) as f64).unwrap();
        let ctx = Context::new(params).unwrap();
        let mut rng = StdRng::seed_from_u64(21);
        let keys = KeySet::generate(&ctx, &mut rng);
        (ctx, keys, rng)
    }

    fn sample_ciphertext(ctx: &Context, keys: &KeySet, rng: &mut StdRng) -> Ciphertext {
        let pt = encoding::encode(
            ctx,
            &[1.0, -2.5, 3.25],
            ctx.params().max_level(),
            ctx.params().scale,
        )
        .unwrap();
        encryption::encrypt(ctx, &pt, &keys.public, rng)
    }

    #[test]
    fn ciphertext_roundtrip_is_bit_exact() {
        let (ctx, keys, mut rng) = setup();
        let ct = sample_ciphertext(&ctx, &keys, &mut rng);

        let bytes = serialize_ciphertext(&ct).unwrap();
        let back = deserialize_ciphertext(&bytes, ctx.params()).unwrap();

        assert_eq!(back.level, ct.level);
        assert_eq!(back.scale.to_bits(), ct.scale.to_bits());
        assert_eq!(back.parts, ct.parts);
    }

    #[test]
    fn public_key_roundtrip_is_bit_exact() {
        let (ctx, keys, _) = setup();
        let bytes = serialize_public_key(&keys.public).unwrap();
        let back = deserialize_public_key(&bytes, ctx.params()).unwrap();
        assert_eq!(back, keys.public);
    }

    #[test]
    fn rejects_garbage_and_truncation() {
        let (ctx, keys, mut rng) = setup();
        assert!(deserialize_ciphertext(&[0xFF; 16], ctx.params()).is_err());

        let mut bytes = serialize_ciphertext(&sample_ciphertext(&ctx, &keys, &mut rng)).unwrap();
        bytes.truncate(bytes.len() / 2);
        assert!(deserialize_ciphertext(&bytes, ctx.params()).is_err());
    }

    #[test]
    fn rejects_out_of_range_residue() {
        let (ctx, keys, mut rng) = setup();
        let mut ct = sample_ciphertext(&ctx, &keys, &mut rng);
        ct.parts[0].limbs[0][0] = ctx.params().moduli[0].value;
        let bytes = serialize_ciphertext(&ct).unwrap();
        let err = deserialize_ciphertext(&bytes, ctx.params()).unwrap_err();
        assert!(matches!(err, Error::MalformedCiphertext(_)), "{err}");
    }

    proptest::proptest! {
        // Round-trip stability must hold for any well-formed ciphertext,
        // not just freshly encrypted ones: arbitrary level, scale, and
        // residues below their moduli.
        #[test]
        fn roundtrip_any_wellformed_ciphertext(
            seed in proptest::prelude::any::<u64>(),
            level in 0usize..3,
            degree2 in proptest::prelude::any::<bool>(),
            scale_log in 10u32..60,
        ) {
            use rand::Rng;

            let params = Params::new(10, &[60, 40, 40], 60, (1u64 << 40) as f64).unwrap();
            let mut rng = StdRng::seed_from_u64(seed);
            let n = params.degree();

            let random_poly = |rng: &mut StdRng| {
                let mut poly = RnsPoly::zero(n, level + 1);
                for (l, limb) in poly.limbs.iter_mut().enumerate() {
                    let q = params.moduli[l].value;
                    for c in limb.iter_mut() {
                        *c = rng.gen_range(0..q);
                    }
                }
                poly
            };

            let parts = (0..if degree2 { 3 } else { 2 })
                .map(|_| random_poly(&mut rng))
                .collect();
            let ct = Ciphertext {
                parts,
                level,
                scale: (1u64 << scale_log) as f64,
            };

            let bytes = serialize_ciphertext(&ct).unwrap();
            let back = deserialize_ciphertext(&bytes, &params).unwrap();
            proptest::prop_assert_eq!(back, ct);
        }
    }

    #[test]
    fn rejects_foreign_parameter_set() {
        let (ctx, keys, mut rng) = setup();
        let bytes = serialize_ciphertext(&sample_ciphertext(&ctx, &keys, &mut rng)).unwrap();

        // Same chain shape, different ring degree.
        let other = Params::new(11, &[60, 40, 40], 60, (1u64 << 40) as f64).unwrap();
        let err = deserialize_ciphertext(&bytes, &other).unwrap_err();
        assert!(
            matches!(
                err,
                Error::ParameterMismatch(_) | Error::MalformedCiphertext(_)
            ),
            "{err}"
        );

        // Shorter chain: the level no longer fits.
        let shorter = Params::new(10, &[60, 40], 60, (1u64 << 40) as f64).unwrap();
        let err = deserialize_ciphertext(&bytes, &shorter).unwrap_err();
        assert!(
            matches!(
                err,
                Error::ParameterMismatch(_) | Error::MalformedCiphertext(_)
            ),
            "{err}"
        );
    }
}
