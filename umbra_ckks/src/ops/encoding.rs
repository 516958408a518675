//! Vector ↔ plaintext conversion through the canonical embedding.

use num::Complex;

use crate::context::Context;
use crate::entities::{Plaintext, RnsPoly};
use crate::error::{Error, Result};

/// Encode a real vector into a plaintext at `level` and `scale`.
///
/// Vectors shorter than the slot count are zero-padded; longer vectors are
/// rejected rather than silently truncated, since a truncated embedding
/// would quietly compute a similarity over the wrong prefix.
pub fn encode(ctx: &Context, values: &[f64], level: usize, scale: f64) -> Result<Plaintext> {
    let slots = ctx.params().slots();
    if values.len() > slots {
        return Err(Error::InvalidVectorLength {
            len: values.len(),
            slots,
        });
    }
    if level > ctx.params().max_level() {
        return Err(Error::EvaluationError(format!(
            "encode level {level} exceeds max level {}",
            ctx.params().max_level()
        )));
    }

    let mut slots_vec = vec![Complex::new(0.0, 0.0); slots];
    for (slot, &v) in slots_vec.iter_mut().zip(values.iter()) {
        *slot = Complex::new(v * scale, 0.0);
    }
    ctx.embedding().embed_inv(&mut slots_vec);

    // Interleave: real parts fill the low half of the coefficient vector,
    // imaginary parts the high half.
    let n = ctx.params().degree();
    let mut coeffs = vec![0i64; n];
    for (i, u) in slots_vec.iter().enumerate() {
        coeffs[i] = u.re.round() as i64;
        coeffs[i + slots] = u.im.round() as i64;
    }

    let mut poly = RnsPoly::from_signed_coeffs(&coeffs, ctx.active_moduli(level));
    ctx.ntt_forward_all(&mut poly);

    Ok(Plaintext { poly, level, scale })
}

/// Decode a plaintext back into one real value per slot.
///
/// Uses the first limb only: the decoded message must stay below `q_0 / 2`
/// in absolute coefficient value, which every circuit in this crate
/// respects by a wide margin.
pub fn decode(ctx: &Context, pt: &Plaintext) -> Result<Vec<f64>> {
    if !(pt.scale.is_finite() && pt.scale > 0.0) {
        return Err(Error::EvaluationError(format!(
            "cannot decode at scale {}",
            pt.scale
        )));
    }

    let mut poly = pt.poly.clone();
    ctx.ntt_inverse_all(&mut poly);

    let q0 = ctx.params().moduli[0].value;
    let half = q0 / 2;
    let centered: Vec<f64> = poly.limbs[0]
        .iter()
        .map(|&c| {
            if c > half {
                -((q0 - c) as f64)
            } else {
                c as f64
            }
        })
        .collect();

    let slots = ctx.params().slots();
    let mut slot_vec: Vec<Complex<f64>> = (0..slots)
        .map(|i| Complex::new(centered[i], centered[i + slots]) / pt.scale)
        .collect();
    ctx.embedding().embed(&mut slot_vec);

    Ok(slot_vec.into_iter().map(|u| u.re).collect())
}
