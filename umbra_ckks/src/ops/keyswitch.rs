//! Key switching: re-encrypting a polynomial from one secret to another
//! without decrypting.
//!
//! Uses the RNS-digit decomposition with a single special prime `p`: the
//! input polynomial is split into its per-prime residues, each residue is
//! multiplied against a digit key carrying `p · T_l · s'` (with `T_l` the
//! CRT interpolation factor of prime `l`), and the accumulated result is
//! divided by `p` again. The division shrinks the switching noise by a
//! factor of `p`, which is what keeps relinearization and rotation cheap in
//! noise budget. Digit keys are generated once over the full chain and stay
//! valid at every level because `T_l ≡ δ_{jl} (mod q_j)` holds prime-wise.

use rand::{CryptoRng, RngCore};

use crate::context::Context;
use crate::entities::{KeySwitchKey, RnsPoly, SecretKey};
use crate::math::{mod_add, mod_inv, mod_mul, mod_neg, mod_sub, reduce_centered};
use crate::params::Modulus;
use crate::sampling::{sample_gaussian, sample_uniform};

/// Generate a switching key from `target` (the key being switched away
/// from, NTT domain over the extended basis) to `sk`.
pub fn generate_key_switch_key<R: RngCore + CryptoRng>(
    ctx: &Context,
    target: &RnsPoly,
    sk: &SecretKey,
    rng: &mut R,
) -> KeySwitchKey {
    let params = ctx.params();
    let n = params.degree();
    let chain_len = params.chain_len();
    let p = params.special_modulus.value;

    let mut digits = Vec::with_capacity(chain_len);
    for l in 0..chain_len {
        // Uniform a_l over the extended basis, sampled directly in the NTT
        // domain.
        let mut a = RnsPoly::zero(n, chain_len + 1);
        for (j, limb) in a.limbs.iter_mut().enumerate() {
            let q = ext_modulus(params, j);
            *limb = sample_uniform(rng, n, q);
        }

        // Fresh error, reduced into every limb, then transformed.
        let e_coeffs = sample_gaussian(rng, n);
        let mut b = RnsPoly::zero(n, chain_len + 1);
        for (j, limb) in b.limbs.iter_mut().enumerate() {
            let q = ext_modulus(params, j);
            for (slot, &c) in limb.iter_mut().zip(e_coeffs.iter()) {
                *slot = crate::math::mod_from_i64(c, q);
            }
        }
        ntt_forward_ext(ctx, &mut b);

        // b_l = -a_l·s + e_l + p·T_l·target. The CRT factor collapses
        // prime-wise: p·T_l ≡ (p mod q_l) on limb l and vanishes elsewhere,
        // including on the special limb.
        for j in 0..chain_len + 1 {
            let q = ext_modulus(params, j);
            for i in 0..n {
                let a_s = mod_mul(a.limbs[j][i], sk.s.limbs[j][i], q);
                b.limbs[j][i] = mod_sub(b.limbs[j][i], a_s, q);
            }
        }
        let q_l = params.moduli[l].value;
        let p_mod = p % q_l;
        for i in 0..n {
            let lifted = mod_mul(p_mod, target.limbs[l][i], q_l);
            b.limbs[l][i] = mod_add(b.limbs[l][i], lifted, q_l);
        }

        digits.push((b, a));
    }

    KeySwitchKey { digits }
}

/// Switch `c` (coefficient domain, `level + 1` limbs) to the key `ksk` was
/// generated for. Returns the two NTT-domain components of the switched
/// encryption, over the active chain limbs.
pub fn key_switch(
    ctx: &Context,
    c: &RnsPoly,
    ksk: &KeySwitchKey,
    level: usize,
) -> (RnsPoly, RnsPoly) {
    let params = ctx.params();
    let n = params.degree();
    let chain_len = params.chain_len();
    let p = params.special_modulus.value;
    debug_assert_eq!(c.limb_count(), level + 1);

    let mut acc0 = RnsPoly::zero(n, level + 2);
    let mut acc1 = RnsPoly::zero(n, level + 2);

    for l in 0..=level {
        // Spread the l-th residue across the active basis and the special
        // prime.
        let mut digit = RnsPoly::zero(n, level + 2);
        for j in 0..=level + 1 {
            let q = if j <= level {
                params.moduli[j].value
            } else {
                p
            };
            for i in 0..n {
                digit.limbs[j][i] = c.limbs[l][i] % q;
            }
        }
        ntt_forward_ext(ctx, &mut digit);

        let (b, a) = &ksk.digits[l];
        for j in 0..=level + 1 {
            let q = if j <= level {
                params.moduli[j].value
            } else {
                p
            };
            // Key limbs are laid out over the full chain; the special limb
            // sits past the whole chain.
            let key_limb = if j <= level { j } else { chain_len };
            for i in 0..n {
                let d = digit.limbs[j][i];
                acc0.limbs[j][i] = mod_add(acc0.limbs[j][i], mod_mul(d, b.limbs[key_limb][i], q), q);
                acc1.limbs[j][i] = mod_add(acc1.limbs[j][i], mod_mul(d, a.limbs[key_limb][i], q), q);
            }
        }
    }

    (
        mod_down_special(ctx, acc0, level),
        mod_down_special(ctx, acc1, level),
    )
}

/// Apply the Galois automorphism `X → X^g` to a coefficient-domain
/// polynomial, negacyclically: coefficient `i` lands at `i·g mod 2N`, with
/// a sign flip on wraparound past N.
pub fn apply_automorphism(poly: &RnsPoly, g: usize, moduli: &[Modulus]) -> RnsPoly {
    let n = poly.degree;
    let two_n = 2 * n;
    let mut out = RnsPoly::zero(n, poly.limb_count());
    for (l, m) in moduli.iter().enumerate().take(poly.limb_count()) {
        let q = m.value;
        for i in 0..n {
            let j = i * g % two_n;
            if j < n {
                out.limbs[l][j] = poly.limbs[l][i];
            } else {
                out.limbs[l][j - n] = mod_neg(poly.limbs[l][i], q);
            }
        }
    }
    out
}

/// Divide an extended-basis accumulator by the special prime, rounding:
/// `(x - [x]_p) / p` limb-wise. Input is NTT domain with the special limb
/// last; output drops it and stays NTT domain.
fn mod_down_special(ctx: &Context, mut acc: RnsPoly, level: usize) -> RnsPoly {
    let params = ctx.params();
    let p = params.special_modulus.value;

    ntt_inverse_ext(ctx, &mut acc);
    let special = acc.limbs.pop().expect("extended basis has a special limb");

    for (j, limb) in acc.limbs.iter_mut().enumerate() {
        let q = params.moduli[j].value;
        let p_inv = mod_inv(p % q, q);
        for (i, c) in limb.iter_mut().enumerate() {
            let r = reduce_centered(special[i], p, q);
            *c = mod_mul(mod_sub(*c, r, q), p_inv, q);
        }
        ctx.ntt(j).forward(limb);
    }
    debug_assert_eq!(acc.limb_count(), level + 1);
    acc
}

/// Extended-basis forward NTT: chain limbs with their own tables, the last
/// limb with the special-prime tables.
pub(crate) fn ntt_forward_ext(ctx: &Context, poly: &mut RnsPoly) {
    let last = poly.limb_count() - 1;
    for (l, limb) in poly.limbs.iter_mut().enumerate() {
        if l < last {
            ctx.ntt(l).forward(limb);
        } else {
            ctx.ntt_special().forward(limb);
        }
    }
}

/// Extended-basis inverse NTT; counterpart of [`ntt_forward_ext`].
pub(crate) fn ntt_inverse_ext(ctx: &Context, poly: &mut RnsPoly) {
    let last = poly.limb_count() - 1;
    for (l, limb) in poly.limbs.iter_mut().enumerate() {
        if l < last {
            ctx.ntt(l).inverse(limb);
        } else {
            ctx.ntt_special().inverse(limb);
        }
    }
}

fn ext_modulus(params: &crate::params::Params, j: usize) -> u64 {
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

    #[test]
    fn automorphism_is_a_signed_permutation() {
        let moduli = vec![Modulus { value: 97, bits: 7 }];
        // X (coefficient 1 at index 1), g = 5, N = 8: X^5.
        let mut poly = RnsPoly::zero(8, 1);
        poly.limbs[0][1] = 1;
        let out = apply_automorphism(&poly, 5, &moduli);
        assert_eq!(out.limbs[0][5], 1);

        // X^3 under g = 5: 15 mod 16 = 15 ≥ 8 → -X^7.
        let mut poly = RnsPoly::zero(8, 1);
        poly.limbs[0][3] = 1;
        let out = apply_automorphism(&poly, 5, &moduli);
        assert_eq!(out.limbs[0][7], 96);
    }

    #[test]
    fn automorphism_composes_multiplicatively() {
        let params = Params::new(10, &[40], 60, 1e9).unwrap();
        let moduli = params.moduli.clone();
        let n = params.degree();
        let two_n = 2 * n;

        let mut poly = RnsPoly::zero(n, 1);
        for i in 0..n {
            poly.limbs[0][i] = (i as u64 * 31 + 7) % moduli[0].value;
        }

        let once = apply_automorphism(&apply_automorphism(&poly, 5, &moduli), 25, &moduli);
        let combined = apply_automorphism(&poly, 125 % two_n, &moduli);
        assert_eq!(once, combined);
    }
}
