//! The embedding registry and the content-addressed blob store it points
//! into.
//!
//! The registry is static configuration: a manifest mapping entry ids to
//! `{name, content identifier}` records, loaded once at startup and held
//! immutable for the process lifetime. Retrieval itself is abstracted
//! behind [`BlobStore`] so the runtime never assumes a particular client
//! library or a filesystem round trip; anything that can turn a content
//! identifier into bytes plugs in.

use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// An opaque content identifier addressing one immutable blob.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ContentId(pub String);

impl fmt::Display for ContentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// One registry record: a human-readable name and where to fetch the
/// entry's encrypted embedding.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntryEmbedding {
    /// Display name of the entry.
    pub name: String,
    /// Content identifier of the serialized ciphertext blob.
    pub cid: ContentId,
}

#[derive(Debug, Deserialize)]
struct Manifest {
    entry_embeddings: BTreeMap<String, EntryEmbedding>,
}

/// The immutable name → embedding map served at request time.
#[derive(Debug, Clone, Default)]
pub struct EmbeddingRegistry {
    entries: BTreeMap<String, EntryEmbedding>,
}

impl EmbeddingRegistry {
    /// Parse a JSON manifest of the form
    /// `{"entry_embeddings": {"<id>": {"name": …, "cid": …}, …}}`.
    pub fn from_manifest_str(json: &str) -> Result<Self> {
        let manifest: Manifest =
            serde_json::from_str(json).map_err(|e| Error::Manifest(e.to_string()))?;
        Ok(Self {
            entries: manifest.entry_embeddings,
        })
    }

    /// Load a manifest from disk.
    pub fn from_manifest_file(path: impl AsRef<Path>) -> Result<Self> {
        let json = std::fs::read_to_string(path).map_err(|e| Error::Manifest(e.to_string()))?;
        Self::from_manifest_str(&json)
    }

    /// Build a registry directly from `(id, entry)` pairs.
    pub fn from_entries(entries: impl IntoIterator<Item = (String, EntryEmbedding)>) -> Self {
        Self {
            entries: entries.into_iter().collect(),
        }
    }

    /// Iterate entries in id order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &EntryEmbedding)> {
        self.entries.iter().map(|(id, e)| (id.as_str(), e))
    }

    /// Look up one entry by id.
    pub fn get(&self, id: &str) -> Option<&EntryEmbedding> {
        self.entries.get(id)
    }

    /// Number of registered entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the registry is empty.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
/// Failures reported by a [`BlobStore`].
pub enum StoreError {
    /// The store has no blob under that identifier.
    #[error("blob {0} not found")]
    NotFound(ContentId),

    /// The store was unreachable or the transfer failed.
    #[error("transport error: {0}")]
    Transport(String),
}

/// The retrieval collaborator: anything that resolves a content identifier
/// to the raw bytes of an immutable blob.
///
/// Calls may block; retrieval is the dominant latency source of a
/// similarity batch and must not be made while holding any lock.
pub trait BlobStore: Send + Sync {
    /// Fetch the blob addressed by `id`.
    fn fetch(&self, id: &ContentId) -> std::result::Result<Vec<u8>, StoreError>;
}

/// An in-memory [`BlobStore`], used by tests and examples and as the seam
/// for wiring a real content-addressed client in.
#[derive(Debug, Clone, Default)]
pub struct MemoryBlobStore {
    blobs: HashMap<ContentId, Vec<u8>>,
}

impl MemoryBlobStore {
    /// An empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Store `bytes` under `id`, replacing any previous blob.
    pub fn insert(&mut self, id: ContentId, bytes: Vec<u8>) {
        self.blobs.insert(id, bytes);
    }
}

impl BlobStore for MemoryBlobStore {
    fn fetch(&self, id: &ContentId) -> std::result::Result<Vec<u8>, StoreError> {
        self.blobs
            .get(id)
            .cloned()
            .ok_or_else(|| StoreError::NotFound(id.clone()))
    }
}
