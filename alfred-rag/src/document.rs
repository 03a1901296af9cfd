//! Data types for retrievable document chunks.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Chunk metadata: provenance and annotation fields keyed by name.
///
/// Values are JSON so numeric fields (page numbers, scores) survive without
/// stringification. Ingestion guarantees at least a `source` entry; this
/// crate never validates completeness and defaults absent fields at
/// formatting time instead.
pub type Metadata = HashMap<String, Value>;

/// A unit of retrievable text with provenance metadata.
///
/// Chunks are produced by ingestion and read-only within the pipeline,
/// except for the `relevance_score` annotation added during reranking.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DocChunk {
    /// The text content of the chunk.
    pub text: String,
    /// Provenance metadata: `source`, optionally `page`, `type`.
    #[serde(default)]
    pub metadata: Metadata,
}

impl DocChunk {
    /// Create a chunk from text and metadata.
    pub fn new(text: impl Into<String>, metadata: Metadata) -> Self {
        Self { text: text.into(), metadata }
    }

    /// Create a chunk with only a `source` metadata entry.
    pub fn with_source(text: impl Into<String>, source: impl Into<String>) -> Self {
        let mut metadata = Metadata::new();
        metadata.insert("source".to_string(), Value::String(source.into()));
        Self { text: text.into(), metadata }
    }

    /// A metadata field rendered as a non-empty string, if present.
    ///
    /// Strings pass through, numbers are formatted; empty strings and other
    /// value kinds count as absent.
    pub fn meta_str(&self, key: &str) -> Option<String> {
        match self.metadata.get(key)? {
            Value::String(s) if !s.is_empty() => Some(s.clone()),
            Value::Number(n) => Some(n.to_string()),
            _ => None,
        }
    }
}

/// A raw vector index match.
///
/// Ephemeral: produced by [`VectorIndex::search`](crate::VectorIndex::search)
/// and converted to a [`DocChunk`] (dropping the distance) immediately after
/// retrieval.
#[derive(Debug, Clone)]
pub struct Hit {
    /// The matched text.
    pub text: String,
    /// Metadata stored alongside the text.
    pub metadata: Metadata,
    /// Distance to the query vector; smaller is closer.
    pub distance: f32,
}

impl From<Hit> for DocChunk {
    fn from(hit: Hit) -> Self {
        DocChunk { text: hit.text, metadata: hit.metadata }
    }
}

/// A ranked chunk with its relevance score.
///
/// The score also appears in the chunk's `relevance_score` metadata field,
/// written when the reranker scored it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoredChunk {
    /// The scored chunk.
    pub chunk: DocChunk,
    /// Cross-encoder relevance; higher is more relevant, not clamped.
    pub score: f32,
}
