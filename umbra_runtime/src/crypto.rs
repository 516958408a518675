//! Process-wide cryptographic state: encryption and evaluation handles over
//! shared, immutable key material.

use std::sync::Arc;

use rand::{CryptoRng, RngCore};
use umbra_ckks::ops::{encoding, encryption, evaluation};
use umbra_ckks::{Ciphertext, Context, GaloisKeys, PublicKey, RelinearizationKey, SecretKey};

use crate::error::Result;

#[derive(Clone)]
/// Encodes and encrypts vectors under a shared context.
pub struct Encryption {
    ctx: Arc<Context>,
}

impl Encryption {
    /// Create a new [`Encryption`] over `ctx`.
    pub fn new(ctx: Arc<Context>) -> Self {
        Self { ctx }
    }

    /// The shared context.
    pub fn context(&self) -> &Arc<Context> {
        &self.ctx
    }

    /// Encode `values` at the top level and default scale, then encrypt.
    pub fn encrypt_vector<R: RngCore + CryptoRng>(
        &self,
        values: &[f64],
        pk: &PublicKey,
        rng: &mut R,
    ) -> Result<Ciphertext> {
        let params = self.ctx.params();
        let pt = encoding::encode(&self.ctx, values, params.max_level(), params.scale)?;
        Ok(encryption::encrypt(&self.ctx, &pt, pk, rng))
    }

    /// Decrypt and decode back to one value per slot. Diagnostic use only;
    /// nothing on the request path holds a secret key.
    pub fn decrypt_vector(&self, ct: &Ciphertext, sk: &SecretKey) -> Result<Vec<f64>> {
        let pt = encryption::decrypt(&self.ctx, ct, sk)?;
        Ok(encoding::decode(&self.ctx, &pt)?)
    }
}

#[derive(Clone)]
/// Performs homomorphic evaluation with the process-wide evaluation keys.
///
/// # Remarks
/// The keys are captured behind `Arc` and never mutated, so one
/// [`Evaluation`] may serve any number of concurrent requests. Scratch
/// state is allocated per call.
pub struct Evaluation {
    ctx: Arc<Context>,
    relin: Arc<RelinearizationKey>,
    galois: Arc<GaloisKeys>,
}

impl Evaluation {
    /// Create a new [`Evaluation`] from the shared context and keys.
    pub fn new(ctx: Arc<Context>, relin: Arc<RelinearizationKey>, galois: Arc<GaloisKeys>) -> Self {
        Self { ctx, relin, galois }
    }

    /// The shared context.
    pub fn context(&self) -> &Arc<Context> {
        &self.ctx
    }

    /// The encrypted inner product of two packed vectors.
    ///
    /// Multiply, relinearize, and rescale produce the slot-wise products at
    /// one level down; the rotate-and-add fold then sums them in
    /// ⌈log₂ slots⌉ steps, leaving Σ uᵢ·vᵢ in every slot. A naive
    /// rotate-by-one sweep would cost O(slots) rotations; doubling offsets
    /// keep it logarithmic, and only the multiply consumes a level.
    pub fn dot_product(&self, query: &Ciphertext, entry: &Ciphertext) -> Result<Ciphertext> {
        let product = evaluation::multiply(&self.ctx, query, entry)?;
        let product = evaluation::relinearize(&self.ctx, &product, &self.relin)?;
        let mut product = evaluation::rescale(&self.ctx, &product)?;

        let slots = self.ctx.params().slots();
        let mut offset = 1;
        while offset < slots {
            let rotated = evaluation::rotate(&self.ctx, &product, offset, &self.galois)?;
            product = evaluation::add(&self.ctx, &product, &rotated)?;
            offset <<= 1;
        }
        Ok(product)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;
    use umbra_ckks::{KeySet, Params};

    fn setup() -> (Encryption, Evaluation, KeySet, StdRng) {
        let params = Params::new(10, &[60, 40, 40], 60, (1u64 << 40) as f64).unwrap();
        let ctx = Arc::new(Context::new(params).unwrap());
        let mut rng = StdRng::seed_from_u64(5);
        let keys = KeySet::generate(&ctx, &mut rng);
        let enc = Encryption::new(ctx.clone());
        let eval = Evaluation::new(
            ctx,
            Arc::new(keys.relinearization.clone()),
            Arc::new(keys.galois.clone()),
        );
        (enc, eval, keys, rng)
    }

    #[test]
    fn dot_product_lands_in_every_slot() {
        let (enc, eval, keys, mut rng) = setup();
        let slots = enc.context().params().slots();

        let u: Vec<f64> = (0..8).map(|i| (i as f64) * 0.125).collect();
        let v: Vec<f64> = (0..8).map(|i| 1.0 - (i as f64) * 0.0625).collect();
        let expected: f64 = u.iter().zip(&v).map(|(a, b)| a * b).sum();

        let ct_u = enc.encrypt_vector(&u, &keys.public, &mut rng).unwrap();
        let ct_v = enc.encrypt_vector(&v, &keys.public, &mut rng).unwrap();

        let score = eval.dot_product(&ct_u, &ct_v).unwrap();
        let got = enc.decrypt_vector(&score, &keys.secret).unwrap();

        for i in [0, 1, slots / 2, slots - 1] {
            assert!(
                (got[i] - expected).abs() < 1e-2,
                "slot {i}: {} != {expected}",
                got[i]
            );
        }
    }

    #[test]
    fn orthogonal_one_hots_score_zero() {
        let (enc, eval, keys, mut rng) = setup();

        let mut u = vec![0.0; 16];
        u[1] = 1.0;
        let mut v = vec![0.0; 16];
        v[2] = 1.0;

        let ct_u = enc.encrypt_vector(&u, &keys.public, &mut rng).unwrap();
        let ct_v = enc.encrypt_vector(&v, &keys.public, &mut rng).unwrap();
        let score = eval.dot_product(&ct_u, &ct_v).unwrap();
        let got = enc.decrypt_vector(&score, &keys.secret).unwrap();
        assert!(got[0].abs() < 1e-2, "expected ≈ 0, got {}", got[0]);
    }

    #[test]
    fn matching_one_hots_score_their_product() {
        let (enc, eval, keys, mut rng) = setup();

        let mut u = vec![0.0; 4];
        u[0] = 1.0;
        let mut v = vec![0.0; 4];
        v[0] = 3.0;

        let ct_u = enc.encrypt_vector(&u, &keys.public, &mut rng).unwrap();
        let ct_v = enc.encrypt_vector(&v, &keys.public, &mut rng).unwrap();
        let score = eval.dot_product(&ct_u, &ct_v).unwrap();
        let got = enc.decrypt_vector(&score, &keys.secret).unwrap();
        assert!((got[0] - 3.0).abs() < 1e-2, "expected ≈ 3, got {}", got[0]);
    }
}
