//! Error types shared across the adaptutor crates.
//!
//! `ProviderError` and `StoreError` are defined here so the engine can
//! downcast the `anyhow::Error` returned by trait implementations and
//! classify failures (retry, conflict, fallback) without string matching.

use thiserror::Error;

/// Errors that can occur when interacting with a text-generation provider.
#[derive(Debug, Error)]
pub enum ProviderError {
    /// The API returned a 429 rate limit response.
    #[error("rate limited, retry after {retry_after_ms}ms")]
    RateLimited { retry_after_ms: u64 },

    /// Authentication failed (invalid API key).
    #[error("authentication failed: {0}")]
    AuthenticationFailed(String),

    /// The requested model was not found.
    #[error("model not found: {0}")]
    ModelNotFound(String),

    /// The API returned an error response.
    #[error("API error (HTTP {status}): {message}")]
    ApiError { status: u16, message: String },

    /// The request timed out.
    #[error("request timed out after {0}s")]
    Timeout(u64),

    /// A network error occurred.
    #[error("network error: {0}")]
    NetworkError(String),

    /// No provider is configured for this deployment.
    #[error("provider not configured: {0}")]
    NotConfigured(String),
}

impl ProviderError {
    /// Returns `true` if this error is permanent and should not be retried.
    pub fn is_permanent(&self) -> bool {
        matches!(
            self,
            ProviderError::AuthenticationFailed(_)
                | ProviderError::ModelNotFound(_)
                | ProviderError::NotConfigured(_)
        )
    }

    /// Returns the retry-after delay in milliseconds, if applicable.
    pub fn retry_after_ms(&self) -> Option<u64> {
        match self {
            ProviderError::RateLimited { retry_after_ms } => Some(*retry_after_ms),
            _ => None,
        }
    }
}

/// Errors reported by a `ProgressStore`.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The stored record changed since it was read.
    #[error("version conflict for {key}: expected {expected}, found {found}")]
    Conflict {
        key: String,
        expected: u64,
        found: u64,
    },

    /// Reading or writing the backing storage failed.
    #[error("storage I/O failed for {key}: {source}")]
    Io {
        key: String,
        #[source]
        source: std::io::Error,
    },

    /// A stored record could not be (de)serialized.
    #[error("corrupt record for {key}: {source}")]
    Corrupt {
        key: String,
        #[source]
        source: serde_json::Error,
    },
}

/// Request-scoped failures surfaced by the assessment engine.
///
/// None of these are fatal to the process; each carries enough detail for
/// the caller to decide whether to retry.
#[derive(Debug, Error)]
pub enum AssessmentError {
    /// The generation call failed outright (network, timeout, quota).
    #[error("generation capability unavailable: {0}")]
    GenerationCapabilityUnavailable(String),

    /// The generation call responded, but not with the expected schema.
    #[error("malformed generation output: {0}")]
    MalformedGenerationOutput(String),

    /// The caller supplied missing or invalid arguments.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// The progress store could not be read or written.
    #[error("progress record persistence failed: {0}")]
    RecordPersistenceFailure(String),
}

impl AssessmentError {
    pub fn invalid(message: impl Into<String>) -> Self {
        AssessmentError::InvalidInput(message.into())
    }
}

/// Result alias for engine operations.
pub type AssessmentResult<T> = Result<T, AssessmentError>;
