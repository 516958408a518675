//! The per-request similarity batch: one encrypted dot product per registry
//! entry, everything staying encrypted end to end.

use std::time::Instant;

use rayon::prelude::*;

use crate::codec;
use crate::crypto::Evaluation;
use crate::error::{Error, Result};
use crate::registry::{BlobStore, EmbeddingRegistry, EntryEmbedding};

/// One scored registry entry. The score is a serialized ciphertext; only
/// the holder of the secret key can read it.
#[derive(Debug, Clone, PartialEq)]
pub struct EncryptedSimilarityResult {
    /// Registry id of the entry.
    pub entry_id: String,
    /// Display name of the entry.
    pub name: String,
    /// The encrypted inner product, wire-encoded.
    pub score_cipher: Vec<u8>,
}

/// Score a query ciphertext against every entry in the registry.
///
/// The query bytes are decoded first; a query that does not decode is
/// terminal for the whole request and reported as [`Error::QueryRejected`].
/// Per-entry failures (fetch, decode, evaluation) are logged and the entry
/// skipped — one bad entry never fails the batch. Entries are processed in
/// parallel; an optional `deadline` is honored cooperatively by skipping
/// entries whose work has not started when it passes.
///
/// Results come back ordered by entry id.
pub fn compute_similarity_batch<S: BlobStore + ?Sized>(
    eval: &Evaluation,
    registry: &EmbeddingRegistry,
    store: &S,
    query_bytes: &[u8],
    deadline: Option<Instant>,
) -> Result<Vec<EncryptedSimilarityResult>> {
    let params = eval.context().params();
    let query = codec::deserialize_ciphertext(query_bytes, params)
        .map_err(|e| Error::QueryRejected(e.to_string()))?;

    let entries: Vec<(&str, &EntryEmbedding)> = registry.iter().collect();
    let mut results: Vec<EncryptedSimilarityResult> = entries
        .into_par_iter()
        .filter_map(|(id, entry)| {
            if let Some(deadline) = deadline {
                if Instant::now() >= deadline {
                    log::warn!("deadline passed before entry {id} ({}), skipping", entry.name);
                    return None;
                }
            }
            match score_entry(eval, store, &query, id, entry) {
                Ok(result) => Some(result),
                Err(e) => {
                    log::warn!("skipping entry {id} ({}): {e}", entry.name);
                    None
                }
            }
        })
        .collect();

    results.sort_by(|a, b| a.entry_id.cmp(&b.entry_id));
    Ok(results)
}

fn score_entry<S: BlobStore + ?Sized>(
    eval: &Evaluation,
    store: &S,
    query: &umbra_ckks::Ciphertext,
    id: &str,
    entry: &EntryEmbedding,
) -> Result<EncryptedSimilarityResult> {
    let params = eval.context().params();
    let blob = store.fetch(&entry.cid)?;
    let entry_ct = codec::deserialize_ciphertext(&blob, params)?;
    let score = eval.dot_product(query, &entry_ct)?;
    Ok(EncryptedSimilarityResult {
        entry_id: id.to_string(),
        name: entry.name.clone(),
        score_cipher: codec::serialize_ciphertext(&score)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto::Encryption;
    use crate::registry::{ContentId, MemoryBlobStore};
    use rand::SeedableRng;
    use rand::rngs::StdRng;
    use std::sync::Arc;
    use std::time::Duration;
    use umbra_ckks::{Context, KeySet, Params};

    struct Fixture {
        enc: Encryption,
        eval: Evaluation,
        keys: KeySet,
        rng: StdRng,
    }

    fn fixture() -> Fixture {
        let params = Params::new(10, &[60, 40, 40], 60, (1u64 << 40) as f64).unwrap();
        let ctx = Arc::new(Context::new(params).unwrap());
        let mut rng = StdRng::seed_from_u64(17);
        let keys = KeySet::generate(&ctx, &mut rng);
        Fixture {
            enc: Encryption::new(ctx.clone()),
            eval: Evaluation::new(
                ctx,
                Arc::new(keys.relinearization.clone()),
                Arc::new(keys.galois.clone()),
            ),
            keys,
            rng,
        }
    }

    fn encrypted_blob(f: &mut Fixture, values: &[f64]) -> Vec<u8> {
        let ct = f
            .enc
            .encrypt_vector(values, &f.keys.public, &mut f.rng)
            .unwrap();
        codec::serialize_ciphertext(&ct).unwrap()
    }

    fn registry_of(entries: &[(&str, &str, &str)]) -> EmbeddingRegistry {
        EmbeddingRegistry::from_entries(entries.iter().map(|(id, name, cid)| {
            (
                id.to_string(),
                EntryEmbedding {
                    name: name.to_string(),
                    cid: ContentId(cid.to_string()),
                },
            )
        }))
    }

    #[test]
    fn batch_scores_every_entry() {
        let mut f = fixture();
        let mut store = MemoryBlobStore::new();
        store.insert(ContentId("c-a".into()), encrypted_blob(&mut f, &[1.0, 0.0]));
        store.insert(ContentId("c-b".into()), encrypted_blob(&mut f, &[0.0, 1.0]));

        let registry = registry_of(&[("e1", "alpha", "c-a"), ("e2", "beta", "c-b")]);
        let query = encrypted_blob(&mut f, &[2.0, 5.0]);

        let results =
            compute_similarity_batch(&f.eval, &registry, &store, &query, None).unwrap();
        assert_eq!(results.len(), 2);
        assert_eq!(results[0].entry_id, "e1");
        assert_eq!(results[1].entry_id, "e2");

        for (result, expected) in results.iter().zip([2.0, 5.0]) {
            let ct = codec::deserialize_ciphertext(
                &result.score_cipher,
                f.enc.context().params(),
            )
            .unwrap();
            let got = f.enc.decrypt_vector(&ct, &f.keys.secret).unwrap();
            assert!(
                (got[0] - expected).abs() < 1e-2,
                "{}: {} != {expected}",
                result.name,
                got[0]
            );
        }
    }

    #[test]
    fn one_corrupt_entry_does_not_fail_the_batch() {
        let mut f = fixture();
        let mut store = MemoryBlobStore::new();
        store.insert(ContentId("c-a".into()), encrypted_blob(&mut f, &[1.0]));
        store.insert(ContentId("c-bad".into()), vec![0xDE, 0xAD, 0xBE, 0xEF]);
        store.insert(ContentId("c-c".into()), encrypted_blob(&mut f, &[3.0]));

        let registry = registry_of(&[
            ("e1", "alpha", "c-a"),
            ("e2", "corrupt", "c-bad"),
            ("e3", "gamma", "c-c"),
        ]);
        let query = encrypted_blob(&mut f, &[1.0]);

        let results =
            compute_similarity_batch(&f.eval, &registry, &store, &query, None).unwrap();
        let ids: Vec<&str> = results.iter().map(|r| r.entry_id.as_str()).collect();
        assert_eq!(ids, vec!["e1", "e3"]);
    }

    #[test]
    fn missing_blob_is_skipped_not_fatal() {
        let mut f = fixture();
        let mut store = MemoryBlobStore::new();
        store.insert(ContentId("c-a".into()), encrypted_blob(&mut f, &[1.0]));

        let registry = registry_of(&[("e1", "alpha", "c-a"), ("e2", "ghost", "c-missing")]);
        let query = encrypted_blob(&mut f, &[1.0]);

        let results =
            compute_similarity_batch(&f.eval, &registry, &store, &query, None).unwrap();
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].entry_id, "e1");
    }

    #[test]
    fn undecodable_query_is_terminal() {
        let mut f = fixture();
        let mut store = MemoryBlobStore::new();
        store.insert(ContentId("c-a".into()), encrypted_blob(&mut f, &[1.0]));
        let registry = registry_of(&[("e1", "alpha", "c-a")]);

        let err = compute_similarity_batch(&f.eval, &registry, &store, &[1, 2, 3], None)
            .unwrap_err();
        assert!(matches!(err, Error::QueryRejected(_)), "{err}");
    }

    #[test]
    fn expired_deadline_skips_remaining_entries() {
        let mut f = fixture();
        let mut store = MemoryBlobStore::new();
        store.insert(ContentId("c-a".into()), encrypted_blob(&mut f, &[1.0]));
        let registry = registry_of(&[("e1", "alpha", "c-a")]);
        let query = encrypted_blob(&mut f, &[1.0]);

        let past = Instant::now() - Duration::from_secs(1);
        let results =
            compute_similarity_batch(&f.eval, &registry, &store, &query, Some(past)).unwrap();
        assert!(results.is_empty());
    }
}
