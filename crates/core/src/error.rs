//! Error types for the Docent domain.
//!
//! Uses `thiserror` for ergonomic error definitions.
//! Each bounded context has its own error enum; orchestration-level
//! errors (`TaskError`) compose these in `docent-pipeline`.

use thiserror::Error;

use crate::document::SourceKind;

/// Failure of the single outbound generation call.
#[derive(Debug, Clone, Error)]
pub enum ProviderError {
    #[error("API request failed: {message} (status: {status_code})")]
    ApiError { status_code: u16, message: String },

    #[error("Rate limited by provider, retry after {retry_after_secs}s")]
    RateLimited { retry_after_secs: u64 },

    #[error("Authentication failed: {0}")]
    AuthenticationFailed(String),

    #[error("Model not found: {0}")]
    ModelNotFound(String),

    #[error("Provider not configured: {0}")]
    NotConfigured(String),

    #[error("Request timed out: {0}")]
    Timeout(String),

    #[error("Network error: {0}")]
    Network(String),

    /// The call succeeded but produced no candidate, no content part, or only whitespace.
    #[error("Provider returned no usable content: {0}")]
    EmptyResponse(String),
}

/// The uploaded bytes could not be turned into addressable text.
#[derive(Debug, Clone, Error)]
pub enum ExtractionError {
    #[error("Failed to parse {kind} document: {reason}")]
    Corrupt { kind: SourceKind, reason: String },

    #[error("No extractable text in {kind} document")]
    Empty { kind: SourceKind },
}

#[derive(Debug, Clone, Error)]
pub enum StoreError {
    #[error("Storage error: {0}")]
    Storage(String),
}

/// A question list that does not satisfy the challenge shape.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ChallengeSetError {
    #[error("expected {expected} questions, got {actual}")]
    WrongCount { expected: usize, actual: usize },

    #[error("question {index} is blank")]
    BlankQuestion { index: usize },
}
