//! Homomorphic arithmetic on ciphertexts.
//!
//! Every operation takes its operands by reference and returns a fresh
//! [`Ciphertext`]; storage reuse is an internal matter and never visible to
//! callers. Keys are passed explicitly and never mutated, so all of these
//! are safe to call concurrently over shared key material.

use crate::context::Context;
use crate::entities::{Ciphertext, GaloisKeys, RelinearizationKey, RnsPoly};
use crate::error::{Error, Result};
use crate::ops::keyswitch::{apply_automorphism, key_switch};

/// Relative scale drift tolerated by [`add`] before reporting a mismatch.
pub const SCALE_DRIFT_TOLERANCE: f64 = 1.0 / (1u64 << 20) as f64;

/// Ciphertext-ciphertext multiplication.
///
/// The result has degree 2, scale `scale(a)·scale(b)`, and level
/// `min(level(a), level(b))`. Operands already at the chain floor are
/// rejected: their product could never be rescaled, so the multiplication
/// would only ever produce garbage downstream.
pub fn multiply(ctx: &Context, a: &Ciphertext, b: &Ciphertext) -> Result<Ciphertext> {
    check_same_ring(ctx, a)?;
    check_same_ring(ctx, b)?;
    if a.degree() != 1 || b.degree() != 1 {
        return Err(Error::DegreeMismatch {
            expected: 1,
            got: a.degree().max(b.degree()),
        });
    }
    if a.level == 0 || b.level == 0 {
        return Err(Error::EvaluationError(
            "multiplication at the chain floor cannot be rescaled".into(),
        ));
    }

    let level = a.level.min(b.level);
    let a = at_level(a, level);
    let b = at_level(b, level);
    let moduli = ctx.active_moduli(level);

    let d0 = a.parts[0].mul(&b.parts[0], moduli);
    let d1 = a.parts[0]
        .mul(&b.parts[1], moduli)
        .add(&a.parts[1].mul(&b.parts[0], moduli), moduli);
    let d2 = a.parts[1].mul(&b.parts[1], moduli);

    Ok(Ciphertext {
        parts: vec![d0, d1, d2],
        level,
        scale: a.scale * b.scale,
    })
}

/// Fold a degree-2 ciphertext back to degree 1 with the relinearization
/// key. Calling this on any other degree is a programming error and fails
/// fast.
pub fn relinearize(ctx: &Context, ct: &Ciphertext, rlk: &RelinearizationKey) -> Result<Ciphertext> {
    check_same_ring(ctx, ct)?;
    if ct.degree() != 2 {
        return Err(Error::DegreeMismatch {
            expected: 2,
            got: ct.degree(),
        });
    }

    let level = ct.level;
    let moduli = ctx.active_moduli(level);

    let mut c2 = ct.parts[2].clone();
    ctx.ntt_inverse_all(&mut c2);
    let (d0, d1) = key_switch(ctx, &c2, &rlk.ksk, level);

    Ok(Ciphertext {
        parts: vec![
            ct.parts[0].add(&d0, moduli),
            ct.parts[1].add(&d1, moduli),
        ],
        level,
        scale: ct.scale,
    })
}

/// Divide out the last active prime: level drops by one and the scale is
/// normalized back toward the default. Fails with [`Error::LevelExhausted`]
/// at the chain floor.
pub fn rescale(ctx: &Context, ct: &Ciphertext) -> Result<Ciphertext> {
    check_same_ring(ctx, ct)?;
    if ct.level == 0 {
        return Err(Error::LevelExhausted { level: 0 });
    }

    let level = ct.level;
    let q_last = ctx.params().moduli[level].value;
    let parts = ct
        .parts
        .iter()
        .map(|p| rescale_poly(ctx, p, level))
        .collect();

    Ok(Ciphertext {
        parts,
        level: level - 1,
        scale: ct.scale / q_last as f64,
    })
}

/// Cyclically rotate slot contents by `offset` positions.
///
/// Fails with [`Error::MissingRotationKey`] when no key was generated for
/// that exact offset; the input is left untouched in every failure case.
pub fn rotate(
    ctx: &Context,
    ct: &Ciphertext,
    offset: usize,
    keys: &GaloisKeys,
) -> Result<Ciphertext> {
    check_same_ring(ctx, ct)?;
    if ct.degree() != 1 {
        return Err(Error::DegreeMismatch {
            expected: 1,
            got: ct.degree(),
        });
    }
    let slots = ctx.params().slots();
    let offset = offset % slots;
    if offset == 0 {
        return Ok(ct.clone());
    }
    let ksk = keys
        .get(offset)
        .ok_or(Error::MissingRotationKey { offset })?;

    let level = ct.level;
    let moduli = ctx.active_moduli(level);
    let g = ctx.embedding().galois_element(offset);

    let mut c0 = ct.parts[0].clone();
    ctx.ntt_inverse_all(&mut c0);
    let mut c0 = apply_automorphism(&c0, g, moduli);
    ctx.ntt_forward_all(&mut c0);

    let mut c1 = ct.parts[1].clone();
    ctx.ntt_inverse_all(&mut c1);
    let c1 = apply_automorphism(&c1, g, moduli);
    let (d0, d1) = key_switch(ctx, &c1, ksk, level);

    Ok(Ciphertext {
        parts: vec![c0.add(&d0, moduli), d1],
        level,
        scale: ct.scale,
    })
}

/// Slot-wise addition. Levels must match; scales may drift within
/// [`SCALE_DRIFT_TOLERANCE`] and the result takes the larger one.
pub fn add(ctx: &Context, a: &Ciphertext, b: &Ciphertext) -> Result<Ciphertext> {
    check_same_ring(ctx, a)?;
    check_same_ring(ctx, b)?;
    if a.level != b.level {
        return Err(Error::EvaluationError(format!(
            "cannot add ciphertexts at levels {} and {}",
            a.level, b.level
        )));
    }
    if a.degree() != b.degree() {
        return Err(Error::EvaluationError(format!(
            "cannot add ciphertexts of degrees {} and {}",
            a.degree(),
            b.degree()
        )));
    }
    let drift = (a.scale - b.scale).abs() / a.scale.max(b.scale);
    if drift > SCALE_DRIFT_TOLERANCE {
        return Err(Error::ScaleMismatch {
            a: a.scale,
            b: b.scale,
        });
    }

    let moduli = ctx.active_moduli(a.level);
    let parts = a
        .parts
        .iter()
        .zip(b.parts.iter())
        .map(|(x, y)| x.add(y, moduli))
        .collect();

    Ok(Ciphertext {
        parts,
        level: a.level,
        scale: a.scale.max(b.scale),
    })
}

/// Reduce a ciphertext to a lower level by dropping limbs.
fn at_level(ct: &Ciphertext, level: usize) -> Ciphertext {
    debug_assert!(level <= ct.level);
    let mut out = ct.clone();
    for part in &mut out.parts {
        part.truncate_limbs(level + 1);
    }
    out.level = level;
    out
}

/// `(x − [x]_{q_k}) / q_k` limb-wise: the exact-division form of rounding
/// division by the dropped prime.
fn rescale_poly(ctx: &Context, poly: &RnsPoly, level: usize) -> RnsPoly {
    use crate::math::{mod_inv, mod_mul, mod_sub, reduce_centered};

    let q_last = ctx.params().moduli[level].value;
    let mut work = poly.clone();
    ctx.ntt_inverse_all(&mut work);
    let dropped = work.limbs.pop().expect("rescale below one limb");

    for (j, limb) in work.limbs.iter_mut().enumerate() {
        let q = ctx.params().moduli[j].value;
        let inv = mod_inv(q_last % q, q);
        for (i, c) in limb.iter_mut().enumerate() {
            let r = reduce_centered(dropped[i], q_last, q);
            *c = mod_mul(mod_sub(*c, r, q), inv, q);
        }
        ctx.ntt(j).forward(limb);
    }
    work
}

fn check_same_ring(ctx: &Context, ct: &Ciphertext) -> Result<()> {
    let expected = ctx.params().degree();
    if ct.ring_degree() != expected {
        return Err(Error::EvaluationError(format!(
            "ciphertext ring degree {} does not match parameters ({expected})",
            ct.ring_degree()
        )));
    }
    if ct.level > ctx.params().max_level() {
        return Err(Error::EvaluationError(format!(
            "ciphertext level {} exceeds the chain ({} primes)",
            ct.level,
            ctx.params().chain_len()
        )));
    }
    for part in &ct.parts {
        if part.limb_count() != ct.level + 1 {
            return Err(Error::EvaluationError(format!(
                "ciphertext claims level {} but carries {} limbs",
                ct.level,
                part.limb_count()
            )));
        }
    }
    Ok(())
}
