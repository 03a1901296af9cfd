//! Structured extraction of user profiles from conversation history.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::debug;

use alfred_core::{Llm, Message, strip_code_fence};

use crate::error::{MemoryError, Result};
use crate::profile::UserProfile;

/// Builds or updates a [`UserProfile`] from a conversation.
///
/// Extraction failure is an explicit `Err`, never a default profile:
/// callers leave the stored record untouched when extraction fails, and the
/// turn's answer is unaffected.
#[async_trait]
pub trait ProfileExtractor: Send + Sync {
    /// Extract a fresh profile from the full message history, given the
    /// currently stored profile for context.
    async fn extract(
        &self,
        existing: &UserProfile,
        messages: &[Message],
    ) -> Result<UserProfile>;
}

/// A [`ProfileExtractor`] that asks a chat model for schema-shaped JSON.
pub struct LlmProfileExtractor {
    llm: Arc<dyn Llm>,
}

impl LlmProfileExtractor {
    /// Create an extractor backed by the given model.
    pub fn new(llm: Arc<dyn Llm>) -> Self {
        Self { llm }
    }

    fn instruction(existing: &UserProfile) -> String {
        format!(
            "Create or update a user profile memory based on the user's chat history. This \
             will be saved for long-term memory. If there is an existing memory, simply update \
             it. Here is the existing memory (it may be empty):\n{}\n\nRespond with only a JSON \
             object of the form {{\"name\": string, \"location\": string, \"interests\": \
             [string]}}.",
            existing.format_block(),
        )
    }
}

#[async_trait]
impl ProfileExtractor for LlmProfileExtractor {
    async fn extract(
        &self,
        existing: &UserProfile,
        messages: &[Message],
    ) -> Result<UserProfile> {
        let mut prompt = Vec::with_capacity(messages.len() + 1);
        prompt.push(Message::system(Self::instruction(existing)));
        prompt.extend(messages.iter().cloned());

        let raw = self.llm.generate(&prompt).await?;
        debug!(reply_len = raw.len(), "profile extraction reply");

        serde_json::from_str(strip_code_fence(&raw))
            .map_err(|e| MemoryError::Extraction(format!("malformed profile JSON: {e}")))
    }
}
