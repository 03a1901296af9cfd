//! # alfred-chat
//!
//! Conversational turn orchestration for the Alfred document assistant.
//!
//! An [`Assistant`] wraps the retrieval pipeline with the two-tier memory
//! model: each [`ask`](Assistant::ask) runs a linear per-turn state machine —
//! [`Generate`](TurnState::Generate) produces the reply with the user's
//! long-term profile and retrieved context injected, then
//! [`WriteMemory`](TurnState::WriteMemory) re-extracts the profile from the
//! updated history before the turn completes.
//!
//! # Example
//!
//! ```rust,ignore
//! use alfred_chat::Assistant;
//!
//! let assistant = Assistant::builder()
//!     .pipeline(pipeline)
//!     .llm(model)
//!     .profiles(Arc::new(InMemoryProfileStore::new()))
//!     .extractor(Arc::new(LlmProfileExtractor::new(model)))
//!     .build()?;
//!
//! let reply = assistant.ask("What does the warranty cover?", None).await?;
//! println!("{} (session {})", reply.response, reply.session_id);
//! ```

pub mod assistant;
pub mod error;
pub mod turn;

pub use assistant::{AskResponse, Assistant, AssistantBuilder, ChatConfig};
pub use error::{ChatError, Result};
pub use turn::TurnState;
