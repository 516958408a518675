#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
//! Leveled CKKS homomorphic encryption over packed real vectors.
//!
//! This crate provides the scheme layer: parameter sets, key generation,
//! the canonical-embedding encoder, public-key encryption, and the
//! evaluator primitives (multiply, relinearize, rescale, rotate, add) that
//! higher layers compose into circuits. Ciphertexts pack `N/2` real values
//! into the slots of a degree-`N` ring element; rotation keys permit
//! cyclically permuting those slots without decryption, which is the basis
//! of the rotate-and-sum fold used for encrypted inner products.
//!
//! # Example
//!
//! ```rust
//! use umbra_ckks::{Context, KeySet, Params};
//! use umbra_ckks::ops::{encoding, encryption, evaluation};
//!
//! let params = Params::new(10, &[60, 40, 40], 60, (1u64 << 40) as f64).unwrap();
//! let ctx = Context::new(params).unwrap();
//! let keys = KeySet::generate(&ctx, &mut rand::thread_rng());
//!
//! let pt = encoding::encode(&ctx, &[1.0, 2.0], ctx.params().max_level(), ctx.params().scale)
//!     .unwrap();
//! let ct = encryption::encrypt(&ctx, &pt, &keys.public, &mut rand::thread_rng());
//! let doubled = evaluation::add(&ctx, &ct, &ct).unwrap();
//!
//! let got = encoding::decode(&ctx, &encryption::decrypt(&ctx, &doubled, &keys.secret).unwrap())
//!     .unwrap();
//! assert!((got[0] - 2.0).abs() < 1e-3);
//! assert!((got[1] - 4.0).abs() < 1e-3);
//! ```

mod context;
mod entities;
mod error;

/// Modular arithmetic, NTT, and the canonical-embedding transform.
pub mod math;

/// Encoding, key generation, encryption, and evaluation.
pub mod ops;
mod params;

/// Samplers for secrets, errors, and uniform masks.
pub mod sampling;

pub use context::Context;
pub use entities::{
    Ciphertext, GaloisKeys, KeySwitchKey, Plaintext, PublicKey, RelinearizationKey, RnsPoly,
    SecretKey,
};
pub use error::{Error, Result};
pub use ops::keygen::KeySet;
pub use params::{MAX_LOG_DEGREE, MIN_LOG_DEGREE, Modulus, Params, pn13_qp200};
