//! # alfred-core
//!
//! Shared building blocks for the Alfred document assistant: conversation
//! message types, the [`Llm`] chat-completion trait implemented by model
//! backends, and helpers for cleaning up raw model output.
//!
//! Every other crate in the workspace builds on these types; none of them
//! talk to a concrete model directly.

pub mod error;
pub mod llm;
pub mod message;
pub mod output;

pub use error::{CoreError, Result};
pub use llm::Llm;
pub use message::{Message, Role};
pub use output::strip_code_fence;
