//! Public-key encryption and (diagnostic) decryption.

use rand::{CryptoRng, RngCore};

use crate::context::Context;
use crate::entities::{Ciphertext, Plaintext, PublicKey, RnsPoly, SecretKey};
use crate::error::{Error, Result};
use crate::sampling::{sample_gaussian, sample_ternary};

/// Encrypt a plaintext under the public key:
/// `(c_0, c_1) = (b·u + e_0 + m, a·u + e_1)` with `u` ternary and the
/// errors Gaussian.
pub fn encrypt<R: RngCore + CryptoRng>(
    ctx: &Context,
    pt: &Plaintext,
    pk: &PublicKey,
    rng: &mut R,
) -> Ciphertext {
    let params = ctx.params();
    let n = params.degree();
    let level = pt.level;
    let moduli = ctx.active_moduli(level);

    let mut u = RnsPoly::from_signed_coeffs(&sample_ternary(rng, n), moduli);
    ctx.ntt_forward_all(&mut u);
    let mut e0 = RnsPoly::from_signed_coeffs(&sample_gaussian(rng, n), moduli);
    ctx.ntt_forward_all(&mut e0);
    let mut e1 = RnsPoly::from_signed_coeffs(&sample_gaussian(rng, n), moduli);
    ctx.ntt_forward_all(&mut e1);

    let mut b = pk.b.clone();
    b.truncate_limbs(level + 1);
    let mut a = pk.a.clone();
    a.truncate_limbs(level + 1);

    let c0 = b.mul(&u, moduli).add(&e0, moduli).add(&pt.poly, moduli);
    let c1 = a.mul(&u, moduli).add(&e1, moduli);

    Ciphertext {
        parts: vec![c0, c1],
        level,
        scale: pt.scale,
    }
}

/// Decrypt `Σ c_d · s^d` back to a plaintext.
///
/// Diagnostic and test use only; the request path never crosses this
/// boundary.
pub fn decrypt(ctx: &Context, ct: &Ciphertext, sk: &SecretKey) -> Result<Plaintext> {
    if ct.ring_degree() != ctx.params().degree() {
        return Err(Error::EvaluationError(format!(
            "ciphertext ring degree {} does not match parameters ({})",
            ct.ring_degree(),
            ctx.params().degree()
        )));
    }
    let level = ct.level;
    let moduli = ctx.active_moduli(level);

    let mut s1 = sk.s.clone();
    s1.truncate_limbs(level + 1);

    let mut acc = ct.parts[0].clone();
    let mut s_pow = s1.clone();
    for part in &ct.parts[1..] {
        acc = acc.add(&part.mul(&s_pow, moduli), moduli);
        s_pow = s_pow.mul(&s1, moduli);
    }

    Ok(Plaintext {
        poly: acc,
        level,
        scale: ct.scale,
    })
}
