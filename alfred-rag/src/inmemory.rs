//! In-memory vector index using cosine similarity.
//!
//! [`InMemoryIndex`] keeps embedded chunks in a `HashMap` behind a
//! `tokio::sync::RwLock`. It is the reference backend for development and
//! tests; production deployments plug a real index in behind the
//! [`VectorIndex`] trait.

use std::collections::HashMap;
use std::hash::{DefaultHasher, Hash, Hasher};

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::document::{DocChunk, Hit};
use crate::error::Result;
use crate::vectorstore::VectorIndex;

/// An in-memory [`VectorIndex`] using cosine similarity for search.
///
/// Entries are keyed by a hash of `text + source`, so re-ingesting the same
/// chunk overwrites its previous entry instead of duplicating it.
#[derive(Debug, Default)]
pub struct InMemoryIndex {
    entries: RwLock<HashMap<u64, Entry>>,
}

#[derive(Debug)]
struct Entry {
    chunk: DocChunk,
    embedding: Vec<f32>,
}

impl InMemoryIndex {
    /// Create a new empty index.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored entries.
    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    /// Whether the index holds no entries.
    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }

    /// Remove every stored entry.
    pub async fn clear(&self) {
        self.entries.write().await.clear();
    }
}

/// Stable identity for a stored chunk: same text from the same source maps
/// to the same slot.
fn entry_id(chunk: &DocChunk) -> u64 {
    let mut hasher = DefaultHasher::new();
    chunk.text.hash(&mut hasher);
    chunk.meta_str("source").unwrap_or_default().hash(&mut hasher);
    hasher.finish()
}

/// Cosine similarity of two vectors; 0.0 when either has zero magnitude.
fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    let dot: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }
    dot / (norm_a * norm_b)
}

#[async_trait]
impl VectorIndex for InMemoryIndex {
    async fn store(&self, batch: &[(DocChunk, Vec<f32>)]) -> Result<bool> {
        if batch.is_empty() {
            return Ok(false);
        }
        let mut entries = self.entries.write().await;
        for (chunk, embedding) in batch {
            entries.insert(
                entry_id(chunk),
                Entry { chunk: chunk.clone(), embedding: embedding.clone() },
            );
        }
        Ok(true)
    }

    async fn search(&self, vector: &[f32], k: usize) -> Result<Vec<Hit>> {
        if vector.is_empty() {
            return Ok(Vec::new());
        }

        let entries = self.entries.read().await;
        let mut scored: Vec<(f32, &Entry)> = entries
            .values()
            .map(|entry| (cosine_similarity(&entry.embedding, vector), entry))
            .collect();
        scored.sort_by(|a, b| b.0.partial_cmp(&a.0).unwrap_or(std::cmp::Ordering::Equal));
        scored.truncate(k);

        Ok(scored
            .into_iter()
            .map(|(similarity, entry)| Hit {
                text: entry.chunk.text.clone(),
                metadata: entry.chunk.metadata.clone(),
                distance: 1.0 - similarity,
            })
            .collect())
    }
}
