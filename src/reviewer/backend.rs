use std::future::Future;

use super::error::ReviewerResult;

/// Remote semantic reviewer. Implementations return the raw model message content; decoding into
/// an [`EvidenceRecord`](crate::evidence::EvidenceRecord) happens in the gateway.
pub trait ReviewBackend: Send + Sync {
    /// Reviews a bounded textual context (detection labels plus recognized text).
    fn review_text(&self, context: &str) -> impl Future<Output = ReviewerResult<String>> + Send;

    /// Reviews raw frame bytes.
    fn review_visual(&self, image: &[u8]) -> impl Future<Output = ReviewerResult<String>> + Send;

    /// `false` when the backend lacks what it needs to call out (e.g. credentials).
    fn is_configured(&self) -> bool {
        true
    }
}
