//! Scores an encrypted query against a small in-memory registry and prints
//! the decrypted scores, mimicking the server round trip end to end.
//!
//! Run with `cargo run --example encrypted_search --release`.

use std::sync::Arc;

use umbra_ckks::{Context, KeySet, pn13_qp200};
use umbra_runtime::{
    ContentId, EmbeddingRegistry, Encryption, EntryEmbedding, Evaluation, MemoryBlobStore, codec,
    compute_similarity_batch,
};

fn main() {
    env_logger::init();
    let mut rng = rand::thread_rng();

    let ctx = Arc::new(Context::new(pn13_qp200().expect("parameters")).expect("context"));
    println!(
        "CKKS ready: N = {}, {} slots, {} rotation keys",
        ctx.params().degree(),
        ctx.params().slots(),
        ctx.params().rotation_offsets().len()
    );

    let keys = KeySet::generate(&ctx, &mut rng);
    let enc = Encryption::new(ctx.clone());
    let eval = Evaluation::new(
        ctx.clone(),
        Arc::new(keys.relinearization.clone()),
        Arc::new(keys.galois.clone()),
    );

    // Three toy reference embeddings, stored encrypted and content-addressed.
    let references = [
        ("doc-sunrise", vec![0.9, 0.1, 0.0, 0.2]),
        ("doc-harbor", vec![0.1, 0.8, 0.3, 0.0]),
        ("doc-orchard", vec![0.0, 0.2, 0.9, 0.4]),
    ];
    let mut store = MemoryBlobStore::new();
    let mut entries = Vec::new();
    for (name, vector) in &references {
        let ct = enc
            .encrypt_vector(vector, &keys.public, &mut rng)
            .expect("encrypt reference");
        let cid = ContentId(format!("cid-{name}"));
        store.insert(cid.clone(), codec::serialize_ciphertext(&ct).expect("codec"));
        entries.push((
            name.to_string(),
            EntryEmbedding {
                name: name.to_string(),
                cid,
            },
        ));
    }
    let registry = EmbeddingRegistry::from_entries(entries);

    // The client ships only ciphertext.
    let query = vec![0.7, 0.6, 0.1, 0.0];
    let ct_query = enc
        .encrypt_vector(&query, &keys.public, &mut rng)
        .expect("encrypt query");
    let query_bytes = codec::serialize_ciphertext(&ct_query).expect("codec");

    let results = compute_similarity_batch(&eval, &registry, &store, &query_bytes, None)
        .expect("similarity batch");

    println!("query {query:?}");
    for result in results {
        let score_ct = codec::deserialize_ciphertext(&result.score_cipher, ctx.params())
            .expect("decode score");
        let score = enc
            .decrypt_vector(&score_ct, &keys.secret)
            .expect("decrypt score")[0];
        println!("  {:<12} score ≈ {score:.4}", result.name);
    }
}
