//! The assistant: per-turn orchestration over pipeline and memory.

use std::sync::Arc;

use serde::Serialize;
use tracing::{error, info, warn};
use uuid::Uuid;

use alfred_core::{Llm, Message};
use alfred_memory::{ProfileExtractor, ProfileStore, SessionStore};
use alfred_rag::{
    GENERATION_FAILURE_RESPONSE, NO_INFORMATION_RESPONSE, RagPipeline, RetrievalOptions,
    ScoredChunk, SourceScore, assemble_context, extract_answer, passes_gate,
};

use crate::error::{ChatError, Result};
use crate::turn::TurnState;

/// The live-chat persona; profile and retrieved context get appended.
const CHAT_SYSTEM_MESSAGE: &str =
    "You are a helpful assistant with memory that provides information about the user.";

/// Per-assistant policy for how each turn retrieves and gates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChatConfig {
    /// How the turn retrieves context for the user's question.
    pub retrieval: RetrievalOptions,
    /// Whether to reject low-confidence retrieval instead of generating.
    pub gate: bool,
}

impl Default for ChatConfig {
    /// The gated synthesis policy: expansion, reranking, confidence gate.
    fn default() -> Self {
        Self { retrieval: RetrievalOptions::full(), gate: true }
    }
}

impl ChatConfig {
    /// Ungated single-query retrieval: raw similarity matches are injected
    /// into the prompt and generation always runs.
    pub fn direct() -> Self {
        Self { retrieval: RetrievalOptions::direct(), gate: false }
    }
}

/// The caller-facing outcome of one [`Assistant::ask`] call.
#[derive(Debug, Clone, Serialize)]
pub struct AskResponse {
    /// The assistant's reply, or a fixed fallback message.
    pub response: String,
    /// The session this exchange belongs to; pass it back to continue.
    pub session_id: String,
    /// Sources paired with relevance scores; empty for ungated retrieval.
    pub detailed_sources: Vec<SourceScore>,
}

struct GenerateOutcome {
    response: String,
    detailed_sources: Vec<SourceScore>,
}

/// The conversational assistant.
///
/// Composes the retrieval pipeline, the generation model, and the two
/// memory tiers. Construct one via [`Assistant::builder()`].
pub struct Assistant {
    llm: Arc<dyn Llm>,
    pipeline: Arc<RagPipeline>,
    profiles: Arc<dyn ProfileStore>,
    extractor: Arc<dyn ProfileExtractor>,
    sessions: SessionStore,
    config: ChatConfig,
}

impl Assistant {
    /// Create a new [`AssistantBuilder`].
    pub fn builder() -> AssistantBuilder {
        AssistantBuilder::default()
    }

    /// Access the session store (inspection and explicit clearing).
    pub fn sessions(&self) -> &SessionStore {
        &self.sessions
    }

    /// Answer one question within a session.
    ///
    /// When `session_id` is `None` a fresh id is minted and echoed back in
    /// the response so the caller can resume the conversation. The user
    /// identity for long-term memory is the session id.
    ///
    /// Runs the turn machine to completion: generation always records
    /// exactly one (user, assistant) pair in the session checkpoint —
    /// fallback and failure replies included — and memory write-back runs
    /// unconditionally afterwards.
    pub async fn ask(&self, query: &str, session_id: Option<String>) -> Result<AskResponse> {
        let session_id = session_id.unwrap_or_else(|| Uuid::new_v4().to_string());
        let user_id = session_id.clone();

        let mut response = String::new();
        let mut detailed_sources = Vec::new();
        let mut state = TurnState::Generate;
        while state != TurnState::Done {
            match state {
                TurnState::Generate => {
                    let outcome = self.generate(&session_id, &user_id, query).await?;
                    response = outcome.response;
                    detailed_sources = outcome.detailed_sources;
                }
                TurnState::WriteMemory => self.write_memory(&session_id, &user_id).await,
                TurnState::Done => break,
            }
            state = state.next();
        }

        Ok(AskResponse { response, session_id, detailed_sources })
    }

    /// The Generate state: retrieve, inject memory, produce the reply, and
    /// record the exchange.
    async fn generate(
        &self,
        session_id: &str,
        user_id: &str,
        query: &str,
    ) -> Result<GenerateOutcome> {
        let profile = self.profiles.get(user_id).await?.unwrap_or_default();
        let ranked = self.pipeline.search(query, self.config.retrieval).await;
        let threshold = self.pipeline.config().score_threshold;
        let gated_out = self.config.gate && !passes_gate(&ranked, threshold);

        let history = self.sessions.checkpoint(session_id).await.messages;

        let (reply, failed, detailed_sources) = if gated_out {
            info!(
                session_id,
                top_score = ranked.first().map(|r| r.score),
                "confidence gate rejected retrieval"
            );
            (NO_INFORMATION_RESPONSE.to_string(), false, Vec::new())
        } else {
            let (context_block, detailed_sources) = self.context_block(&ranked);

            let mut system = String::from(CHAT_SYSTEM_MESSAGE);
            system.push_str("\n\nWhat you remember about the user:\n");
            system.push_str(&profile.format_block());
            system.push_str(&context_block);

            let mut messages = Vec::with_capacity(history.len() + 2);
            messages.push(Message::system(system));
            messages.extend(history.iter().cloned());
            messages.push(Message::user(query));

            match self.llm.generate(&messages).await {
                Ok(raw) => (extract_answer(&raw).to_string(), false, detailed_sources),
                Err(e) => {
                    error!(session_id, error = %e, "generation failed");
                    let zeroed = detailed_sources
                        .into_iter()
                        .map(|s| SourceScore { relevance_score: 0.0, ..s })
                        .collect();
                    (GENERATION_FAILURE_RESPONSE.to_string(), true, zeroed)
                }
            }
        };

        // Failed exchanges are recorded too; callers render them distinctly.
        let assistant_turn = if failed {
            Message::assistant_error(&reply)
        } else {
            Message::assistant(&reply)
        };
        self.sessions.append(session_id, &[Message::user(query), assistant_turn]).await;

        Ok(GenerateOutcome { response: reply, detailed_sources })
    }

    /// Format retrieved context for the system message.
    ///
    /// Reranked retrieval uses the bounded, labelled context window and
    /// yields scored sources; ungated retrieval injects the raw matches as
    /// a plain list and attributes nothing.
    fn context_block(&self, ranked: &[ScoredChunk]) -> (String, Vec<SourceScore>) {
        if ranked.is_empty() {
            return (String::new(), Vec::new());
        }

        if self.config.retrieval.rerank {
            let assembled = assemble_context(ranked, self.pipeline.config().context_docs);
            let detailed = assembled
                .sources
                .iter()
                .enumerate()
                .map(|(i, source)| SourceScore {
                    source: source.clone(),
                    relevance_score: ranked.get(i).map(|r| r.score).unwrap_or(0.0),
                })
                .collect();
            (format!("\n\nContext:\n{}", assembled.text), detailed)
        } else {
            let mut block = String::from("\n\nRelevant Documents:\n");
            for entry in ranked {
                block.push_str("- ");
                block.push_str(&entry.chunk.text);
                block.push('\n');
            }
            (block, Vec::new())
        }
    }

    /// The WriteMemory state: re-extract the profile and replace it
    /// wholesale. Failures are observed, never surfaced — the turn's answer
    /// already stands.
    async fn write_memory(&self, session_id: &str, user_id: &str) {
        let existing = match self.profiles.get(user_id).await {
            Ok(profile) => profile.unwrap_or_default(),
            Err(e) => {
                warn!(user_id, error = %e, "profile read failed; skipping memory write");
                return;
            }
        };

        let history = self.sessions.checkpoint(session_id).await.messages;
        match self.extractor.extract(&existing, &history).await {
            Ok(profile) => {
                if let Err(e) = self.profiles.put(user_id, profile).await {
                    warn!(user_id, error = %e, "profile write failed");
                }
            }
            Err(e) => {
                warn!(user_id, error = %e, "profile extraction failed; keeping existing memory");
            }
        }
    }
}

/// Builder for constructing an [`Assistant`].
#[derive(Default)]
pub struct AssistantBuilder {
    llm: Option<Arc<dyn Llm>>,
    pipeline: Option<Arc<RagPipeline>>,
    profiles: Option<Arc<dyn ProfileStore>>,
    extractor: Option<Arc<dyn ProfileExtractor>>,
    config: Option<ChatConfig>,
}

impl AssistantBuilder {
    /// Set the generation model.
    pub fn llm(mut self, llm: Arc<dyn Llm>) -> Self {
        self.llm = Some(llm);
        self
    }

    /// Set the retrieval pipeline.
    pub fn pipeline(mut self, pipeline: Arc<RagPipeline>) -> Self {
        self.pipeline = Some(pipeline);
        self
    }

    /// Set the long-term profile store.
    pub fn profiles(mut self, profiles: Arc<dyn ProfileStore>) -> Self {
        self.profiles = Some(profiles);
        self
    }

    /// Set the structured profile extractor.
    pub fn extractor(mut self, extractor: Arc<dyn ProfileExtractor>) -> Self {
        self.extractor = Some(extractor);
        self
    }

    /// Set the per-turn retrieval and gating policy.
    pub fn config(mut self, config: ChatConfig) -> Self {
        self.config = Some(config);
        self
    }

    /// Build the [`Assistant`], validating that all required fields are set.
    ///
    /// # Errors
    ///
    /// Returns [`ChatError::Config`] if any required field is missing.
    pub fn build(self) -> Result<Assistant> {
        let llm = self.llm.ok_or_else(|| ChatError::Config("llm is required".to_string()))?;
        let pipeline =
            self.pipeline.ok_or_else(|| ChatError::Config("pipeline is required".to_string()))?;
        let profiles =
            self.profiles.ok_or_else(|| ChatError::Config("profiles is required".to_string()))?;
        let extractor =
            self.extractor.ok_or_else(|| ChatError::Config("extractor is required".to_string()))?;

        Ok(Assistant {
            llm,
            pipeline,
            profiles,
            extractor,
            sessions: SessionStore::new(),
            config: self.config.unwrap_or_default(),
        })
    }
}
