//! Pipeline orchestrator: expand → retrieve → dedup → rerank → gate →
//! assemble → generate.
//!
//! The [`RagPipeline`] composes an [`Embedder`], a [`VectorIndex`], a
//! [`RelevanceModel`], and the generation [`Llm`] behind a single answer
//! entry point. Retrieval-side failures degrade to smaller result sets
//! rather than erroring; the confidence gate then rejects what is left if
//! it is not good enough to answer from.

use std::sync::Arc;

use serde::Serialize;
use tracing::{error, info, warn};

use alfred_core::{Llm, Message};

use crate::config::RagConfig;
use crate::context::assemble_context;
use crate::dedup::dedup_chunks;
use crate::document::{DocChunk, ScoredChunk};
use crate::embedding::Embedder;
use crate::error::{RagError, Result};
use crate::expand::QueryExpander;
use crate::relevance::RelevanceModel;
use crate::rerank::rerank;
use crate::vectorstore::VectorIndex;

/// Returned when retrieval finds nothing relevant enough to answer from.
pub const NO_INFORMATION_RESPONSE: &str =
    "I couldn't find relevant information in the uploaded documents to answer your question.";

/// Returned when the generation call itself fails.
pub const GENERATION_FAILURE_RESPONSE: &str = "I apologize, but I encountered an error while \
                                               trying to generate a response. Please try again \
                                               later.";

/// Completions may prefix their final answer with this marker.
const ANSWER_MARKER: &str = "Answer:";

/// The persona for answer synthesis: strict, context-only, professional.
const SYNTHESIS_PERSONA: &str = "You are ALFRED, a digital butler. Your primary goal is to \
                                 provide concise and accurate answers based *Strictly* on the \
                                 provided documents and conversation history. If the information \
                                 is not available in the given context, state that you cannot \
                                 find the answer in the provided documents. Avoid making \
                                 assumptions or inventing information. Maintain a professional \
                                 and helpful tone.";

/// Policy knobs for a retrieval pass.
///
/// The gated synthesis path and the live-chat path share one retrieval
/// entry point and differ only in these flags.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetrievalOptions {
    /// Widen recall by expanding the query before searching.
    pub expand: bool,
    /// Rescore candidates with the relevance model and sort best-first.
    pub rerank: bool,
}

impl RetrievalOptions {
    /// Expansion plus reranking: the gated synthesis path.
    pub fn full() -> Self {
        Self { expand: true, rerank: true }
    }

    /// Single-query retrieval in similarity order: the live-chat path.
    pub fn direct() -> Self {
        Self { expand: false, rerank: false }
    }
}

/// A source list entry paired with its relevance score.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct SourceScore {
    /// The formatted provenance string.
    pub source: String,
    /// The paired ranked entry's score, or 0 when there is none.
    pub relevance_score: f32,
}

/// The outcome of one answered question.
#[derive(Debug, Clone, Serialize)]
pub struct Answer {
    /// The answer text, or a fixed fallback message.
    pub response: String,
    /// Deduplicated provenance strings for the context used.
    pub sources: Vec<String>,
    /// Sources paired positionally with ranked-entry scores.
    pub detailed_sources: Vec<SourceScore>,
    /// Whether the generation call failed.
    pub error: bool,
}

impl Answer {
    fn no_information() -> Self {
        Self {
            response: NO_INFORMATION_RESPONSE.to_string(),
            sources: Vec::new(),
            detailed_sources: Vec::new(),
            error: false,
        }
    }
}

/// Whether a ranked set clears the confidence gate.
///
/// A hard cutoff, not a soft penalty: an empty set, or a top score below the
/// threshold, rejects the whole retrieval so generation never sees weak
/// context.
pub fn passes_gate(ranked: &[ScoredChunk], threshold: f32) -> bool {
    ranked.first().is_some_and(|top| top.score >= threshold)
}

/// Take the text after the last `"Answer:"` marker, or the whole trimmed
/// completion when the marker is absent.
pub fn extract_answer(raw: &str) -> &str {
    match raw.rfind(ANSWER_MARKER) {
        Some(position) => raw[position + ANSWER_MARKER.len()..].trim(),
        None => raw.trim(),
    }
}

/// Pair each source positionally with the matching ranked entry's score.
///
/// Source entries beyond the ranked set's length get score 0.
pub(crate) fn pair_sources(sources: &[String], ranked: &[ScoredChunk]) -> Vec<SourceScore> {
    sources
        .iter()
        .enumerate()
        .map(|(i, source)| SourceScore {
            source: source.clone(),
            relevance_score: ranked.get(i).map(|entry| entry.score).unwrap_or(0.0),
        })
        .collect()
}

/// The retrieval-augmented answer pipeline.
///
/// Construct one via [`RagPipeline::builder()`].
pub struct RagPipeline {
    config: RagConfig,
    embedder: Arc<dyn Embedder>,
    index: Arc<dyn VectorIndex>,
    relevance: Arc<dyn RelevanceModel>,
    llm: Arc<dyn Llm>,
    expander: QueryExpander,
}

impl RagPipeline {
    /// Create a new [`RagPipelineBuilder`].
    pub fn builder() -> RagPipelineBuilder {
        RagPipelineBuilder::default()
    }

    /// Return a reference to the pipeline configuration.
    pub fn config(&self) -> &RagConfig {
        &self.config
    }

    /// Ingest pre-chunked documents: embed each chunk and store it.
    ///
    /// Returns the number of chunks stored. Unlike the query path, ingestion
    /// failures propagate — a half-indexed corpus is worse than a visible
    /// error.
    ///
    /// # Errors
    ///
    /// Returns [`RagError::Pipeline`] if embedding or storage fails.
    pub async fn ingest(&self, chunks: &[DocChunk]) -> Result<usize> {
        if chunks.is_empty() {
            info!(chunk_count = 0, "ingest called with no chunks");
            return Ok(0);
        }

        let texts: Vec<&str> = chunks.iter().map(|c| c.text.as_str()).collect();
        let embeddings = self.embedder.embed_batch(&texts).await.map_err(|e| {
            error!(error = %e, "embedding failed during ingestion");
            RagError::Pipeline(format!("ingestion embedding failed: {e}"))
        })?;

        let entries: Vec<(DocChunk, Vec<f32>)> =
            chunks.iter().cloned().zip(embeddings).collect();
        self.index.store(&entries).await.map_err(|e| {
            error!(error = %e, "store failed during ingestion");
            RagError::Pipeline(format!("ingestion store failed: {e}"))
        })?;

        info!(chunk_count = chunks.len(), "ingested chunks");
        Ok(chunks.len())
    }

    /// Retrieve chunks for one query, capped at `limit`.
    ///
    /// Embedding or search failures degrade to an empty result set: the
    /// caller's confidence gate turns "nothing retrieved" into the
    /// no-information response, which is the designed recovery for this
    /// failure class.
    async fn retrieve(&self, query: &str, limit: usize) -> Vec<DocChunk> {
        let vector = match self.embedder.embed(query).await {
            Ok(vector) => vector,
            Err(e) => {
                warn!(error = %e, "query embedding failed; treating as no results");
                return Vec::new();
            }
        };
        if vector.is_empty() {
            return Vec::new();
        }

        let hits = match self.index.search(&vector, limit).await {
            Ok(hits) => hits,
            Err(e) => {
                warn!(error = %e, "index search failed; treating as no results");
                return Vec::new();
            }
        };

        info!(result_count = hits.len(), "retrieved chunks");
        hits.into_iter().map(DocChunk::from).collect()
    }

    /// Run a retrieval pass under the given policy.
    ///
    /// With `expand` set, the query is expanded and each expanded query is
    /// retrieved sequentially at the fan-out cap; otherwise a single pass
    /// runs at the direct cap. Candidates are always deduplicated by exact
    /// text. With `rerank` set, candidates are scored and sorted best-first;
    /// otherwise they keep retrieval order with score 0.
    ///
    /// Never fails: every failure class degrades to fewer (possibly zero)
    /// results.
    pub async fn search(&self, query: &str, options: RetrievalOptions) -> Vec<ScoredChunk> {
        let (queries, limit) = if options.expand {
            (self.expander.expand(query).await, self.config.fanout_limit)
        } else {
            (vec![query.to_string()], self.config.direct_limit)
        };

        let mut flattened = Vec::new();
        for expanded in &queries {
            flattened.extend(self.retrieve(expanded, limit).await);
        }

        let unique = dedup_chunks(flattened);
        info!(candidate_count = unique.len(), query_count = queries.len(), "merged candidates");

        if !options.rerank {
            return unique.into_iter().map(|chunk| ScoredChunk { chunk, score: 0.0 }).collect();
        }

        match rerank(self.relevance.as_ref(), query, unique).await {
            Ok(ranked) => ranked,
            Err(e) => {
                warn!(error = %e, "reranking failed; treating as no results");
                Vec::new()
            }
        }
    }

    /// Answer a question from the indexed corpus, with conversation history.
    ///
    /// Runs the full gated pipeline. On the gate's rejection the fixed
    /// no-information response is returned and `history` is left untouched.
    /// Otherwise generation runs once; success appends the (user, assistant)
    /// pair to `history`, and a generation failure appends the pair with the
    /// assistant turn flagged as an error — failed exchanges stay visible.
    pub async fn answer(&self, query: &str, history: &mut Vec<Message>) -> Answer {
        let ranked = self.search(query, RetrievalOptions::full()).await;

        if !passes_gate(&ranked, self.config.score_threshold) {
            info!(
                top_score = ranked.first().map(|r| r.score),
                "confidence gate rejected retrieval"
            );
            return Answer::no_information();
        }

        let assembled = assemble_context(&ranked, self.config.context_docs);

        let mut messages = Vec::with_capacity(history.len() + 2);
        messages.push(Message::system(SYNTHESIS_PERSONA));
        messages.extend(history.iter().cloned());
        messages.push(Message::user(format!(
            "Based on the following context, answer the question:\nContext:\n{}\n\nQuestion: \
             {query}",
            assembled.text
        )));

        match self.llm.generate(&messages).await {
            Ok(raw) => {
                let response = extract_answer(&raw).to_string();
                history.push(Message::user(query));
                history.push(Message::assistant(&response));
                Answer {
                    response,
                    detailed_sources: pair_sources(&assembled.sources, &ranked),
                    sources: assembled.sources,
                    error: false,
                }
            }
            Err(e) => {
                error!(error = %e, "answer generation failed");
                history.push(Message::user(query));
                history.push(Message::assistant_error(GENERATION_FAILURE_RESPONSE));
                Answer {
                    response: GENERATION_FAILURE_RESPONSE.to_string(),
                    detailed_sources: assembled
                        .sources
                        .iter()
                        .map(|source| SourceScore {
                            source: source.clone(),
                            relevance_score: 0.0,
                        })
                        .collect(),
                    sources: assembled.sources,
                    error: true,
                }
            }
        }
    }
}

/// Builder for constructing a [`RagPipeline`].
///
/// All fields except `config` are required; `config` falls back to
/// [`RagConfig::default()`].
#[derive(Default)]
pub struct RagPipelineBuilder {
    config: Option<RagConfig>,
    embedder: Option<Arc<dyn Embedder>>,
    index: Option<Arc<dyn VectorIndex>>,
    relevance: Option<Arc<dyn RelevanceModel>>,
    llm: Option<Arc<dyn Llm>>,
}

impl RagPipelineBuilder {
    /// Set the pipeline configuration.
    pub fn config(mut self, config: RagConfig) -> Self {
        self.config = Some(config);
        self
    }

    /// Set the embedding provider.
    pub fn embedder(mut self, embedder: Arc<dyn Embedder>) -> Self {
        self.embedder = Some(embedder);
        self
    }

    /// Set the vector index backend.
    pub fn index(mut self, index: Arc<dyn VectorIndex>) -> Self {
        self.index = Some(index);
        self
    }

    /// Set the relevance model used for reranking.
    pub fn relevance(mut self, relevance: Arc<dyn RelevanceModel>) -> Self {
        self.relevance = Some(relevance);
        self
    }

    /// Set the model used for expansion and answer generation.
    pub fn llm(mut self, llm: Arc<dyn Llm>) -> Self {
        self.llm = Some(llm);
        self
    }

    /// Build the [`RagPipeline`], validating that all required fields are set.
    ///
    /// # Errors
    ///
    /// Returns [`RagError::Config`] if any required field is missing.
    pub fn build(self) -> Result<RagPipeline> {
        let config = self.config.unwrap_or_default();
        let embedder =
            self.embedder.ok_or_else(|| RagError::Config("embedder is required".to_string()))?;
        let index = self.index.ok_or_else(|| RagError::Config("index is required".to_string()))?;
        let relevance =
            self.relevance.ok_or_else(|| RagError::Config("relevance is required".to_string()))?;
        let llm = self.llm.ok_or_else(|| RagError::Config("llm is required".to_string()))?;

        let expander = QueryExpander::new(Arc::clone(&llm), config.expansion_queries);

        Ok(RagPipeline { config, embedder, index, relevance, llm, expander })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extract_answer_takes_text_after_last_marker() {
        assert_eq!(extract_answer("Reasoning...\nAnswer: Paris"), "Paris");
        assert_eq!(extract_answer("Answer: no. Answer: yes"), "yes");
    }

    #[test]
    fn extract_answer_passes_through_unmarked_text() {
        assert_eq!(extract_answer("  Paris \n"), "Paris");
    }

    #[test]
    fn gate_rejects_empty_and_below_threshold() {
        assert!(!passes_gate(&[], 0.5));
        let low = vec![ScoredChunk { chunk: DocChunk::with_source("t", "s"), score: 0.49 }];
        assert!(!passes_gate(&low, 0.5));
        let high = vec![ScoredChunk { chunk: DocChunk::with_source("t", "s"), score: 0.5 }];
        assert!(passes_gate(&high, 0.5));
    }

    #[test]
    fn pair_sources_zero_fills_past_ranked_len() {
        let ranked = vec![ScoredChunk { chunk: DocChunk::with_source("t", "a"), score: 0.9 }];
        let sources = vec!["a".to_string(), "b".to_string()];
        let detailed = pair_sources(&sources, &ranked);
        assert!((detailed[0].relevance_score - 0.9).abs() < 1e-6);
        assert_eq!(detailed[1].relevance_score, 0.0);
    }

    #[test]
    fn builder_requires_collaborators() {
        assert!(matches!(RagPipeline::builder().build(), Err(RagError::Config(_))));
    }
}
