//! The chat-completion seam consumed by the rest of the workspace.

use async_trait::async_trait;

use crate::error::Result;
use crate::message::Message;

/// A chat completion model.
///
/// One request, one completion. Calls block from the caller's point of view:
/// no streaming, no client-side timeout, no retry. Backends that fail return
/// [`CoreError::Model`](crate::CoreError::Model); recovery policy belongs to
/// the caller.
#[async_trait]
pub trait Llm: Send + Sync {
    /// The backend or model name, used in logs and error messages.
    fn name(&self) -> &str;

    /// Generate a single completion for the given message sequence.
    async fn generate(&self, messages: &[Message]) -> Result<String>;
}
