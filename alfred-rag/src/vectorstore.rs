//! Vector index trait for storing and searching embedded chunks.

use async_trait::async_trait;

use crate::document::{DocChunk, Hit};
use crate::error::Result;

/// A similarity-search backend over embedded document chunks.
///
/// The pipeline treats the index as an opaque service: it stores
/// (chunk, embedding) pairs and returns the best matches for a query
/// vector. Persistence, sharding, and index maintenance are the backend's
/// concern.
#[async_trait]
pub trait VectorIndex: Send + Sync {
    /// Store chunks with their embeddings.
    ///
    /// Returns whether anything was written; storing an empty batch is a
    /// successful no-op reported as `false`.
    async fn store(&self, entries: &[(DocChunk, Vec<f32>)]) -> Result<bool>;

    /// Return the `k` best matches for the query vector, best match first.
    ///
    /// An empty query vector yields no matches.
    async fn search(&self, vector: &[f32], k: usize) -> Result<Vec<Hit>>;
}
