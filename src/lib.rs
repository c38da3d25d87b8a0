//! Riskgate library crate (used by the binary and integration tests).
//!
//! Tiered evidence fusion for image moderation: cheap local signals clear most frames, suspicious
//! ones escalate to a cached, rate-limited semantic reviewer, and policy thresholds turn the
//! fused evidence into a pass/warn/block verdict.
//!
//! # Public API Surface
//!
//! ## Decision Pipeline
//! - [`FusionEngine`], [`FinalDecision`], [`EngineConfig`] - L3 fusion and policy judgement
//! - [`RuleExtractor`] - Deterministic text rules
//! - [`ReviewerGateway`], [`ReviewOutcome`] - Cached access to the semantic reviewer
//! - [`PolicyStore`], [`PolicyRule`], [`Action`] - Category thresholds
//!
//! ## Collaborators
//! - [`Detector`], [`HttpDetector`] - L1 object/text detection
//! - [`ReviewBackend`], [`OpenAiCompatBackend`] - Remote reviewer
//!
//! ## Test/Mock Support
//! Mock implementations are available behind `#[cfg(any(test, feature = "mock"))]`.

pub mod clock;
pub mod config;
pub mod constants;
pub mod detector;
pub mod engine;
pub mod evidence;
pub mod extractor;
pub mod hashing;
pub mod policy;
pub mod reviewer;

#[cfg(any(test, feature = "mock"))]
pub use clock::ManualClock;
pub use clock::{Clock, SharedClock, SystemClock, system_clock};
pub use config::{Config, ConfigError};
#[cfg(any(test, feature = "mock"))]
pub use detector::MockDetector;
pub use detector::{
    Detection, Detector, DetectorError, DetectorOutput, DetectorResult, HitSummary, HttpDetector,
    TextSpan,
};
pub use engine::{
    DecisionEvidence, DecisionPath, EngineConfig, EvidenceSource, FinalDecision, FusionEngine,
    L1Trace, ReviewStatus,
};
pub use evidence::{Category, EvidenceRecord, EvidenceSpans};
pub use extractor::RuleExtractor;
pub use hashing::{Fingerprint, cache_key, fingerprint_bytes, fingerprint_text};
pub use policy::{Action, PolicyError, PolicyRule, PolicyStore};
#[cfg(any(test, feature = "mock"))]
pub use reviewer::{MockReply, MockReviewBackend};
pub use reviewer::{
    BackendConfig, DegradeReason, GatewayConfig, OpenAiCompatBackend, ReviewBackend, ReviewKind,
    ReviewOutcome, ReviewerError, ReviewerGateway,
};
