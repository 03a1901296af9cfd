//! Turn-machine tests: session round-trips, memory write-back, and the
//! failure paths.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use alfred_chat::{Assistant, ChatConfig};
use alfred_core::{Llm, Message, Role};
use alfred_memory::{
    InMemoryProfileStore, MemoryError, ProfileExtractor, ProfileStore, UserProfile,
};
use alfred_model::MockLlm;
use alfred_rag::{
    DocChunk, Embedder, GENERATION_FAILURE_RESPONSE, InMemoryIndex, NO_INFORMATION_RESPONSE,
    RagConfig, RagPipeline, RelevanceModel,
};

struct UniformEmbedder;

#[async_trait]
impl Embedder for UniformEmbedder {
    async fn embed(&self, text: &str) -> alfred_rag::Result<Vec<f32>> {
        if text.is_empty() { Ok(Vec::new()) } else { Ok(vec![1.0]) }
    }

    fn dimensions(&self) -> usize {
        1
    }
}

/// Scores every passage with the same fixed value.
struct FlatScores(f32);

#[async_trait]
impl RelevanceModel for FlatScores {
    async fn score(&self, _query: &str, passages: &[&str]) -> alfred_rag::Result<Vec<f32>> {
        Ok(vec![self.0; passages.len()])
    }
}

/// Replays scripted extraction results; exhausted scripts fail.
struct ScriptedExtractor {
    script: Mutex<VecDeque<Result<UserProfile, String>>>,
}

impl ScriptedExtractor {
    fn new<I>(script: I) -> Self
    where
        I: IntoIterator<Item = Result<UserProfile, String>>,
    {
        Self { script: Mutex::new(script.into_iter().collect()) }
    }

    fn failing() -> Self {
        Self::new([])
    }
}

#[async_trait]
impl ProfileExtractor for ScriptedExtractor {
    async fn extract(
        &self,
        _existing: &UserProfile,
        _messages: &[Message],
    ) -> alfred_memory::Result<UserProfile> {
        let entry = self.script.lock().unwrap().pop_front();
        match entry {
            Some(Ok(profile)) => Ok(profile),
            Some(Err(message)) => Err(MemoryError::Extraction(message)),
            None => Err(MemoryError::Extraction("script exhausted".to_string())),
        }
    }
}

/// Records the messages of the latest generate call.
struct CapturingLlm {
    reply: String,
    last: Mutex<Vec<Message>>,
}

impl CapturingLlm {
    fn new(reply: impl Into<String>) -> Self {
        Self { reply: reply.into(), last: Mutex::new(Vec::new()) }
    }
}

#[async_trait]
impl Llm for CapturingLlm {
    fn name(&self) -> &str {
        "capturing"
    }

    async fn generate(&self, messages: &[Message]) -> alfred_core::Result<String> {
        *self.last.lock().unwrap() = messages.to_vec();
        Ok(self.reply.clone())
    }
}

async fn pipeline_with_corpus(llm: Arc<dyn Llm>, score: f32, chunks: &[DocChunk]) -> RagPipeline {
    let pipeline = RagPipeline::builder()
        .config(RagConfig::default())
        .embedder(Arc::new(UniformEmbedder))
        .index(Arc::new(InMemoryIndex::new()))
        .relevance(Arc::new(FlatScores(score)))
        .llm(llm)
        .build()
        .unwrap();
    pipeline.ingest(chunks).await.unwrap();
    pipeline
}

fn assistant(
    llm: Arc<dyn Llm>,
    pipeline: RagPipeline,
    profiles: Arc<dyn ProfileStore>,
    extractor: Arc<dyn ProfileExtractor>,
    config: ChatConfig,
) -> Assistant {
    Assistant::builder()
        .llm(llm)
        .pipeline(Arc::new(pipeline))
        .profiles(profiles)
        .extractor(extractor)
        .config(config)
        .build()
        .unwrap()
}

#[tokio::test]
async fn round_trip_mints_and_reuses_session_id() {
    let llm: Arc<dyn Llm> = Arc::new(MockLlm::repeating("Answer: Sure"));
    let pipeline =
        pipeline_with_corpus(Arc::clone(&llm), 0.9, &[DocChunk::with_source("facts", "f.pdf")])
            .await;
    let assistant = assistant(
        llm,
        pipeline,
        Arc::new(InMemoryProfileStore::new()),
        Arc::new(ScriptedExtractor::failing()),
        ChatConfig::direct(),
    );

    let first = assistant.ask("What is the capital?", None).await.unwrap();
    assert!(!first.session_id.is_empty());
    assert_eq!(first.response, "Sure");

    let checkpoint = assistant.sessions().checkpoint(&first.session_id).await;
    assert_eq!(checkpoint.messages.len(), 2);
    assert_eq!(checkpoint.messages[0].role, Role::User);
    assert_eq!(checkpoint.messages[1].role, Role::Assistant);

    let second =
        assistant.ask("And its population?", Some(first.session_id.clone())).await.unwrap();
    assert_eq!(second.session_id, first.session_id);

    let checkpoint = assistant.sessions().checkpoint(&first.session_id).await;
    assert_eq!(checkpoint.messages.len(), 4);
}

#[tokio::test]
async fn memory_write_back_replaces_profile_wholesale() {
    let llm: Arc<dyn Llm> = Arc::new(MockLlm::repeating("noted"));
    let pipeline =
        pipeline_with_corpus(Arc::clone(&llm), 0.9, &[DocChunk::with_source("facts", "f.pdf")])
            .await;

    let first_extraction = UserProfile {
        name: "Ada".into(),
        location: "London".into(),
        interests: vec!["chess".into()],
    };
    let second_extraction =
        UserProfile { name: "Ada Lovelace".into(), ..Default::default() };

    let profiles = Arc::new(InMemoryProfileStore::new());
    let assistant = assistant(
        llm,
        pipeline,
        Arc::clone(&profiles) as Arc<dyn ProfileStore>,
        Arc::new(ScriptedExtractor::new([
            Ok(first_extraction.clone()),
            Ok(second_extraction.clone()),
        ])),
        ChatConfig::direct(),
    );

    let reply = assistant.ask("I'm Ada from London, I like chess", None).await.unwrap();
    let session_id = reply.session_id;
    assert_eq!(profiles.get(&session_id).await.unwrap(), Some(first_extraction));

    assistant.ask("Actually call me Ada Lovelace", Some(session_id.clone())).await.unwrap();
    // The second extraction wins exactly; the first's fields are not merged in.
    assert_eq!(profiles.get(&session_id).await.unwrap(), Some(second_extraction));
}

#[tokio::test]
async fn extraction_failure_leaves_profile_untouched() {
    let llm: Arc<dyn Llm> = Arc::new(MockLlm::repeating("of course"));
    let pipeline =
        pipeline_with_corpus(Arc::clone(&llm), 0.9, &[DocChunk::with_source("facts", "f.pdf")])
            .await;

    let profiles = Arc::new(InMemoryProfileStore::new());
    let stored = UserProfile { name: "Ada".into(), ..Default::default() };

    let assistant = assistant(
        llm,
        pipeline,
        Arc::clone(&profiles) as Arc<dyn ProfileStore>,
        Arc::new(ScriptedExtractor::failing()),
        ChatConfig::direct(),
    );

    let reply = assistant.ask("hello", None).await.unwrap();
    profiles.put(&reply.session_id, stored.clone()).await.unwrap();

    // A failed extraction is observed, not surfaced; the answer stands and
    // the stored profile survives.
    let next = assistant.ask("hello again", Some(reply.session_id.clone())).await.unwrap();
    assert_eq!(next.response, "of course");
    assert_eq!(profiles.get(&reply.session_id).await.unwrap(), Some(stored));
}

#[tokio::test]
async fn gated_turn_answers_no_information_and_still_records_exchange() {
    let llm = Arc::new(MockLlm::new([r#"{"queries": ["a", "b", "c"]}"#]));
    // Corpus scores below the 0.5 threshold.
    let pipeline = pipeline_with_corpus(
        Arc::clone(&llm) as Arc<dyn Llm>,
        0.2,
        &[DocChunk::with_source("weak match", "w.pdf")],
    )
    .await;

    let assistant = assistant(
        Arc::clone(&llm) as Arc<dyn Llm>,
        pipeline,
        Arc::new(InMemoryProfileStore::new()),
        Arc::new(ScriptedExtractor::failing()),
        ChatConfig::default(),
    );

    let reply = assistant.ask("unrelated question", None).await.unwrap();
    assert_eq!(reply.response, NO_INFORMATION_RESPONSE);
    assert!(reply.detailed_sources.is_empty());
    assert_eq!(llm.call_count(), 1, "only the expansion call may reach the model");

    let checkpoint = assistant.sessions().checkpoint(&reply.session_id).await;
    assert_eq!(checkpoint.messages.len(), 2);
    assert_eq!(checkpoint.messages[1].content, NO_INFORMATION_RESPONSE);
    assert!(!checkpoint.messages[1].error);
}

#[tokio::test]
async fn generation_failure_is_recorded_as_error_turn() {
    let llm: Arc<dyn Llm> = Arc::new(MockLlm::failing("model down"));
    let pipeline =
        pipeline_with_corpus(Arc::clone(&llm), 0.9, &[DocChunk::with_source("facts", "f.pdf")])
            .await;

    let assistant = assistant(
        llm,
        pipeline,
        Arc::new(InMemoryProfileStore::new()),
        Arc::new(ScriptedExtractor::failing()),
        ChatConfig::direct(),
    );

    let reply = assistant.ask("anything", None).await.unwrap();
    assert_eq!(reply.response, GENERATION_FAILURE_RESPONSE);

    let checkpoint = assistant.sessions().checkpoint(&reply.session_id).await;
    assert_eq!(checkpoint.messages.len(), 2);
    assert!(checkpoint.messages[1].error);
}

#[tokio::test]
async fn generate_injects_profile_and_retrieved_context() {
    let llm = Arc::new(CapturingLlm::new("noted"));
    let pipeline = pipeline_with_corpus(
        Arc::clone(&llm) as Arc<dyn Llm>,
        0.9,
        &[DocChunk::with_source("the warranty lasts two years", "w.pdf")],
    )
    .await;

    let profiles = Arc::new(InMemoryProfileStore::new());
    let assistant = assistant(
        Arc::clone(&llm) as Arc<dyn Llm>,
        pipeline,
        Arc::clone(&profiles) as Arc<dyn ProfileStore>,
        Arc::new(ScriptedExtractor::failing()),
        ChatConfig::direct(),
    );

    let first = assistant.ask("hello", None).await.unwrap();
    profiles
        .put(
            &first.session_id,
            UserProfile { name: "Ada".into(), ..Default::default() },
        )
        .await
        .unwrap();

    assistant.ask("what about the warranty?", Some(first.session_id)).await.unwrap();

    let messages = llm.last.lock().unwrap().clone();
    let system = &messages[0];
    assert_eq!(system.role, Role::System);
    assert!(system.content.contains("Name: Ada"));
    assert!(system.content.contains("the warranty lasts two years"));
    // Prior history plus the new user turn follow the system message.
    assert_eq!(messages.len(), 4);
    assert_eq!(messages[3].content, "what about the warranty?");
}
