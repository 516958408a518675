//! One-time key generation.
//!
//! Consumes a cryptographically secure random source; generation is a setup
//! cost, never on the request path. The produced material is immutable for
//! the process lifetime.

use rand::{CryptoRng, RngCore};

use crate::context::Context;
use crate::entities::{GaloisKeys, PublicKey, RelinearizationKey, RnsPoly, SecretKey};
use crate::math::mod_from_i64;
use crate::ops::keyswitch::{
    apply_automorphism, generate_key_switch_key, ntt_forward_ext, ntt_inverse_ext,
};
use crate::sampling::{sample_gaussian, sample_ternary};

/// Everything `generate` derives from one secret.
#[derive(Debug)]
pub struct KeySet {
    /// The ternary secret; stays inside the generating process.
    pub secret: SecretKey,
    /// Encryption key, safe to hand out.
    pub public: PublicKey,
    /// Folds degree-2 ciphertexts after multiplication.
    pub relinearization: RelinearizationKey,
    /// Rotation keys for every power-of-two offset below the slot count.
    pub galois: GaloisKeys,
}

impl KeySet {
    /// Generate the full key set for `ctx`.
    pub fn generate<R: RngCore + CryptoRng>(ctx: &Context, rng: &mut R) -> Self {
        let secret = generate_secret_key(ctx, rng);
        let public = generate_public_key(ctx, &secret, rng);
        let relinearization = generate_relinearization_key(ctx, &secret, rng);
        let galois = generate_galois_keys(ctx, &secret, &ctx.params().rotation_offsets(), rng);
        Self {
            secret,
            public,
            relinearization,
            galois,
        }
    }
}

/// Sample a ternary secret and store it residue-wise over the extended
/// basis.
pub fn generate_secret_key<R: RngCore + CryptoRng>(ctx: &Context, rng: &mut R) -> SecretKey {
    let params = ctx.params();
    let n = params.degree();
    let coeffs = sample_ternary(rng, n);

    let mut s = RnsPoly::zero(n, params.chain_len() + 1);
    for (j, limb) in s.limbs.iter_mut().enumerate() {
        let q = if j < params.chain_len() {
            params.moduli[j].value
        } else {
            params.special_modulus.value
        };
        for (slot, &c) in limb.iter_mut().zip(coeffs.iter()) {
            *slot = mod_from_i64(c, q);
        }
    }
    ntt_forward_ext(ctx, &mut s);
    SecretKey { s }
}

/// Derive the public key `(b, a) = (−a·s + e, a)` over the chain basis.
pub fn generate_public_key<R: RngCore + CryptoRng>(
    ctx: &Context,
    sk: &SecretKey,
    rng: &mut R,
) -> PublicKey {
    let params = ctx.params();
    let n = params.degree();
    let chain_len = params.chain_len();
    let moduli = &params.moduli;

    let mut a = RnsPoly::zero(n, chain_len);
    for (j, limb) in a.limbs.iter_mut().enumerate() {
        *limb = crate::sampling::sample_uniform(rng, n, moduli[j].value);
    }

    let e_coeffs = sample_gaussian(rng, n);
    let mut b = RnsPoly::from_signed_coeffs(&e_coeffs, moduli);
    ctx.ntt_forward_all(&mut b);

    let s_chain = chain_limbs(&sk.s, chain_len);
    let a_s = a.mul(&s_chain, moduli);
    let b = b.sub(&a_s, moduli);

    PublicKey { b, a }
}

/// Generate the relinearization key: a switching key from `s²` to `s`.
pub fn generate_relinearization_key<R: RngCore + CryptoRng>(
    ctx: &Context,
    sk: &SecretKey,
    rng: &mut R,
) -> RelinearizationKey {
    // s is stored in NTT form, so squaring is limb-wise.
    let mut s_sq = sk.s.clone();
    for (j, limb) in s_sq.limbs.iter_mut().enumerate() {
        let q = ext_prime(ctx, j);
        for c in limb.iter_mut() {
            *c = crate::math::mod_mul(*c, *c, q);
        }
    }
    RelinearizationKey {
        ksk: generate_key_switch_key(ctx, &s_sq, sk, rng),
    }
}

/// Generate rotation keys for the given offsets: for each offset `r`, a
/// switching key from `φ_{5^r}(s)` to `s`.
pub fn generate_galois_keys<R: RngCore + CryptoRng>(
    ctx: &Context,
    sk: &SecretKey,
    offsets: &[usize],
    rng: &mut R,
) -> GaloisKeys {
    let params = ctx.params();
    let ext_moduli: Vec<_> = params
        .moduli
        .iter()
        .copied()
        .chain([params.special_modulus])
        .collect();

    let mut s_coeff = sk.s.clone();
    ntt_inverse_ext(ctx, &mut s_coeff);

    let mut keys = std::collections::BTreeMap::new();
    for &offset in offsets {
        let g = ctx.embedding().galois_element(offset);
        let mut s_rot = apply_automorphism(&s_coeff, g, &ext_moduli);
        ntt_forward_ext(ctx, &mut s_rot);
        keys.insert(offset, generate_key_switch_key(ctx, &s_rot, sk, rng));
    }
    GaloisKeys { keys }
}

/// The first `chain_len` limbs of an extended-basis polynomial.
fn chain_limbs(poly: &RnsPoly, chain_len: usize) -> RnsPoly {
    let mut out = poly.clone();
    out.truncate_limbs(chain_len);
    out
}

fn ext_prime(ctx: &Context, j: usize) -> u64 {
    let params = ctx.params();
    if j < params.chain_len() {
        params.moduli[j].value
    } else {
        params.special_modulus.value
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::params::Params;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn test_ctx() -> Context {
        let params = Params::new(10, &[60, 40, 40], 60, (1u64 << 40) as f64).unwrap();
        Context::new(params).unwrap()
    }

    #[test]
    fn keyset_covers_every_fold_offset() {
        let ctx = test_ctx();
        let mut rng = StdRng::seed_from_u64(42);
        let keys = KeySet::generate(&ctx, &mut rng);

        let offsets: Vec<usize> = keys.galois.offsets().collect();
        assert_eq!(offsets, ctx.params().rotation_offsets());
        assert_eq!(
            keys.relinearization.ksk.digits.len(),
            ctx.params().chain_len()
        );
        assert_eq!(keys.public.a.limb_count(), ctx.params().chain_len());
        assert_eq!(keys.secret.s.limb_count(), ctx.params().chain_len() + 1);
    }
}
