//! # alfred-rag
//!
//! The retrieval-augmented answer pipeline for the Alfred document
//! assistant: query expansion, multi-query retrieval, deduplication,
//! cross-encoder reranking, confidence gating, context assembly, and
//! answer synthesis with source attribution.
//!
//! The pipeline composes three external collaborators behind traits:
//! an [`Embedder`], a [`VectorIndex`], and a [`RelevanceModel`], plus the
//! [`Llm`](alfred_core::Llm) used for expansion and generation.
//!
//! # Example
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use alfred_rag::{InMemoryIndex, RagConfig, RagPipeline};
//!
//! let pipeline = RagPipeline::builder()
//!     .config(RagConfig::default())
//!     .embedder(Arc::new(my_embedder))
//!     .index(Arc::new(InMemoryIndex::new()))
//!     .relevance(Arc::new(my_reranker))
//!     .llm(my_model)
//!     .build()?;
//!
//! pipeline.ingest(&chunks).await?;
//! let mut history = Vec::new();
//! let answer = pipeline.answer("What is the warranty period?", &mut history).await;
//! ```

pub mod config;
pub mod context;
pub mod dedup;
pub mod document;
pub mod embedding;
pub mod error;
pub mod expand;
pub mod inmemory;
pub mod nim;
pub mod pipeline;
pub mod relevance;
pub mod rerank;
pub mod vectorstore;

pub use config::{RagConfig, RagConfigBuilder};
pub use context::{AssembledContext, assemble_context, source_label};
pub use dedup::dedup_chunks;
pub use document::{DocChunk, Hit, Metadata, ScoredChunk};
pub use embedding::Embedder;
pub use error::{RagError, Result};
pub use expand::QueryExpander;
pub use inmemory::InMemoryIndex;
pub use nim::{NimEmbedder, NimReranker};
pub use pipeline::{
    Answer, GENERATION_FAILURE_RESPONSE, NO_INFORMATION_RESPONSE, RagPipeline, RagPipelineBuilder,
    RetrievalOptions, SourceScore, extract_answer, passes_gate,
};
pub use relevance::RelevanceModel;
pub use rerank::rerank;
pub use vectorstore::VectorIndex;
