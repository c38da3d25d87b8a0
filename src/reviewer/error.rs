use thiserror::Error;

#[derive(Debug, Error)]
/// Errors from the semantic reviewer backend. The gateway never lets these escape; they become
/// [`ReviewOutcome::Degraded`](super::ReviewOutcome::Degraded).
pub enum ReviewerError {
    /// Transport failure.
    #[error("reviewer request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// Non-success HTTP status.
    #[error("reviewer returned status {status}: {body}")]
    Status { status: u16, body: String },

    /// Call exceeded the gateway timeout.
    #[error("reviewer call timed out after {after_ms}ms")]
    Timeout { after_ms: u64 },

    /// Response could not be interpreted as a verdict.
    #[error("malformed reviewer response: {reason}")]
    Malformed { reason: String },

    /// Backend-reported failure.
    #[error("reviewer backend error: {reason}")]
    Backend { reason: String },

    /// Invalid gateway or backend configuration.
    #[error("configuration error: {reason}")]
    Config { reason: String },
}

/// Convenience result type for reviewer operations.
pub type ReviewerResult<T> = Result<T, ReviewerError>;
