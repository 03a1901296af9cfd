//! Candidate deduplication across retrieval passes.

use std::collections::HashSet;

use crate::document::DocChunk;

/// Collapse retrieved chunks to the first occurrence of each exact text.
///
/// Order-preserving: a chunk keeps the position of the first query that
/// surfaced it. Only byte-identical text is merged; near-duplicates stay,
/// and metadata differences do not create a second entry.
pub fn dedup_chunks(chunks: Vec<DocChunk>) -> Vec<DocChunk> {
    let mut seen: HashSet<String> = HashSet::with_capacity(chunks.len());
    let mut unique = Vec::with_capacity(chunks.len());
    for chunk in chunks {
        if seen.insert(chunk.text.clone()) {
            unique.push(chunk);
        }
    }
    unique
}
