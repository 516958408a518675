#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
//! Encrypted embedding similarity on top of [`umbra_ckks`].
//!
//! A client encrypts a query vector under the server's public key; the
//! server holds a registry of previously encrypted reference embeddings in
//! a content-addressed blob store and, without decrypting anything,
//! computes one encrypted dot product per registry entry. This crate wires
//! the scheme into that flow: shared key-material handles
//! ([`Encryption`], [`Evaluation`]), the rotate-and-sum dot-product
//! pipeline, the wire codec, and the registry/blob-store collaborator
//! interfaces. Transports (HTTP or otherwise) live outside; everything here
//! is synchronous and side-effect free beyond randomness and logging.
//!
//! # Example
//!
//! ```rust
//! use std::sync::Arc;
//! use umbra_ckks::{Context, KeySet, Params};
//! use umbra_runtime::{
//!     codec, compute_similarity_batch, ContentId, EmbeddingRegistry, Encryption,
//!     EntryEmbedding, Evaluation, MemoryBlobStore,
//! };
//!
//! let params = Params::new(10, &[60, 40, 40], 60, (1u64 << 40) as f64).unwrap();
//! let ctx = Arc::new(Context::new(params).unwrap());
//! let keys = KeySet::generate(&ctx, &mut rand::thread_rng());
//! let enc = Encryption::new(ctx.clone());
//! let eval = Evaluation::new(
//!     ctx,
//!     Arc::new(keys.relinearization.clone()),
//!     Arc::new(keys.galois.clone()),
//! );
//!
//! // Server side: one reference embedding in the store.
//! let mut store = MemoryBlobStore::new();
//! let reference = enc
//!     .encrypt_vector(&[0.0, 1.0], &keys.public, &mut rand::thread_rng())
//!     .unwrap();
//! store.insert(
//!     ContentId("cid-ref".into()),
//!     codec::serialize_ciphertext(&reference).unwrap(),
//! );
//! let registry = EmbeddingRegistry::from_entries([(
//!     "e1".to_string(),
//!     EntryEmbedding { name: "ref".into(), cid: ContentId("cid-ref".into()) },
//! )]);
//!
//! // Client side: an encrypted query.
//! let query = enc
//!     .encrypt_vector(&[3.0, 4.0], &keys.public, &mut rand::thread_rng())
//!     .unwrap();
//! let query_bytes = codec::serialize_ciphertext(&query).unwrap();
//!
//! let results = compute_similarity_batch(&eval, &registry, &store, &query_bytes, None).unwrap();
//! assert_eq!(results.len(), 1);
//!
//! // Only the key holder learns the score (⟨query, ref⟩ = 4).
//! let score = codec::deserialize_ciphertext(&results[0].score_cipher, enc.context().params())
//!     .unwrap();
//! let clear = enc.decrypt_vector(&score, &keys.secret).unwrap();
//! assert!((clear[0] - 4.0).abs() < 1e-2);
//! ```

/// Wire codec for ciphertexts and public keys.
pub mod codec;
mod crypto;
mod error;
mod registry;
mod similarity;

/// A safe wrapper around [`bincode`] deserialization to limit input sizes
/// and prevent malicious or improperly serialized data from causing
/// panics.
pub mod safe_bincode;

pub use crypto::{Encryption, Evaluation};
pub use error::{Error, Result};
pub use registry::{
    BlobStore, ContentId, EmbeddingRegistry, EntryEmbedding, MemoryBlobStore, StoreError,
};
pub use similarity::{EncryptedSimilarityResult, compute_similarity_batch};
