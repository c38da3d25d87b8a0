//! L2 semantic reviewer gateway.
//!
//! Wraps a remote vision/language model behind a content-addressed verdict cache, a per-key
//! cooldown, a sliding-window rate limiter and a call timeout. The backend is a
//! [`ReviewBackend`]; [`OpenAiCompatBackend`] talks to any OpenAI-compatible chat-completions
//! endpoint.
//!
//! Failures never escape [`ReviewerGateway`]: they surface as [`ReviewOutcome::Degraded`] with a
//! neutral [`EvidenceRecord`](crate::evidence::EvidenceRecord).

pub mod backend;
pub mod cache;
pub mod error;
pub mod gateway;
pub mod limiter;
#[cfg(any(test, feature = "mock"))]
pub mod mock;
pub mod openai;
pub mod parse;
pub mod types;


pub use backend::ReviewBackend;
pub use cache::{CacheEntry, CacheLookup, VerdictCache};
pub use error::{ReviewerError, ReviewerResult};
pub use gateway::{DEFAULT_REVIEWER_TIMEOUT_MS, GatewayConfig, ReviewerGateway};
pub use limiter::RateLimiter;
#[cfg(any(test, feature = "mock"))]
pub use mock::{MockReply, MockReviewBackend};
pub use openai::{BackendConfig, OpenAiCompatBackend};
pub use parse::parse_verdict;
pub use types::{DegradeReason, ReviewKind, ReviewOutcome, ReviewPayload};
