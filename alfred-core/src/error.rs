//! Error types for the `alfred-core` crate.

use thiserror::Error;

/// Errors produced by model backends.
#[derive(Debug, Error)]
pub enum CoreError {
    /// A model invocation failed.
    #[error("Model error ({provider}): {message}")]
    Model {
        /// The model backend that produced the error.
        provider: String,
        /// A description of the failure.
        message: String,
    },
}

/// A convenience result type for core operations.
pub type Result<T> = std::result::Result<T, CoreError>;
