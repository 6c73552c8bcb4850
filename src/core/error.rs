//! Error types for the vocabulary trainer core.
//!
//! Every error here is recoverable at the session or request boundary;
//! nothing is fatal to the process. Image generation degradation is not
//! represented at all: the fallback chain absorbs it.

use thiserror::Error;

/// Unified error type for core operations.
#[derive(Debug, Error)]
pub enum CoreError {
    /// No due items and no free-practice pool; the session cannot start.
    #[error("No items are eligible for review")]
    NoEligibleItems,

    /// The answer verification backend failed. Callers must treat this as
    /// "verification unavailable", never as "answer wrong"; the session
    /// layer applies its own (fail-closed) policy.
    #[error("Answer verification is unavailable")]
    VerificationUnavailable,

    /// A text generation operation failed hard (malformed response,
    /// backend error). Surfaced to the caller; no retry, no fallback.
    #[error("Generation failed: {0}")]
    GenerationFailed(String),

    /// Provider credential misconfiguration, reported with enough detail
    /// to point the learner at the settings screen.
    #[error("Provider not configured: {0}")]
    Misconfigured(String),

    /// Persistence write failure.
    #[error("Storage error: {0}")]
    Storage(String),

    /// JSON serialization/deserialization error.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// IO error for file operations.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl CoreError {
    /// Create a generation error with the given message.
    pub fn generation(msg: impl Into<String>) -> Self {
        Self::GenerationFailed(msg.into())
    }

    /// Create a misconfiguration error with the given message.
    pub fn misconfigured(msg: impl Into<String>) -> Self {
        Self::Misconfigured(msg.into())
    }

    /// Create a storage error with the given message.
    pub fn storage(msg: impl Into<String>) -> Self {
        Self::Storage(msg.into())
    }
}

/// Result type alias for core operations.
pub type Result<T> = std::result::Result<T, CoreError>;
