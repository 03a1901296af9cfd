//! Error types for the `alfred-memory` crate.

use thiserror::Error;

/// Errors that can occur in memory operations.
#[derive(Debug, Error)]
pub enum MemoryError {
    /// Structured extraction did not yield a usable profile.
    #[error("Extraction error: {0}")]
    Extraction(String),

    /// A profile store backend failed.
    #[error("Store error: {0}")]
    Store(String),

    /// An error propagated from a model backend.
    #[error(transparent)]
    Model(#[from] alfred_core::CoreError),
}

/// A convenience result type for memory operations.
pub type Result<T> = std::result::Result<T, MemoryError>;
