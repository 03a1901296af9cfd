//! Error types for the `alfred-chat` crate.

use thiserror::Error;

/// Errors that can occur during turn orchestration.
#[derive(Debug, Error)]
pub enum ChatError {
    /// A configuration validation error.
    #[error("Configuration error: {0}")]
    Config(String),

    /// An error propagated from the memory layer.
    #[error(transparent)]
    Memory(#[from] alfred_memory::MemoryError),
}

/// A convenience result type for chat operations.
pub type Result<T> = std::result::Result<T, ChatError>;
