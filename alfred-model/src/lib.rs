//! # alfred-model
//!
//! Chat model backends for the Alfred document assistant.
//!
//! Provides [`NimChatModel`], a client for NVIDIA's OpenAI-compatible chat
//! completions endpoint (and any other endpoint speaking the same protocol),
//! and [`MockLlm`], a scripted model for tests.
//!
//! # Example
//!
//! ```rust,ignore
//! use alfred_core::{Llm, Message};
//! use alfred_model::NimChatModel;
//!
//! let model = NimChatModel::from_env()?;
//! let reply = model.generate(&[Message::user("Hello")]).await?;
//! ```

pub mod mock;
pub mod nim;

pub use mock::MockLlm;
pub use nim::NimChatModel;
